//! Meta & structured data: descriptions and machine-readable markup.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::model::PageCategory;
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::StructuredData;

/// Categories where structured data is expected, not optional.
fn expects_markup(category: PageCategory) -> bool {
    matches!(
        category,
        PageCategory::Content | PageCategory::Product | PageCategory::Category
    )
}

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no page signals supplied");
    }

    let mut missing_description: Vec<String> = Vec::new();
    let mut missing_markup: Vec<String> = Vec::new();
    let mut compliant = 0usize;

    for (item, signals) in &with_signals {
        let mut ok = true;
        if !signals.meta_description {
            missing_description.push(item.url.clone());
            ok = false;
        }
        if expects_markup(item.category) && !signals.structured_data {
            missing_markup.push(item.url.clone());
            ok = false;
        }
        if ok {
            compliant += 1;
        }
    }

    let mut issues = Vec::new();
    if !missing_markup.is_empty() {
        issues.push(Issue {
            kind: "missing_structured_data".into(),
            severity: Severity::High,
            message: format!(
                "{} pages in markup-expected categories carry no structured data",
                missing_markup.len()
            ),
            recommendation: "Add JSON-LD typed for each page's category".into(),
            affected_urls: missing_markup,
        });
    }
    if !missing_description.is_empty() {
        issues.push(Issue {
            kind: "missing_meta_description".into(),
            severity: Severity::Medium,
            message: format!("{} pages have no meta description", missing_description.len()),
            recommendation: "Write a unique meta description stating the page's answer up front".into(),
            affected_urls: missing_description,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), with_signals.len() as f64);
    metrics.insert("compliant".into(), compliant as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(compliant, with_signals.len())),
        issues,
        metrics,
    }
}
