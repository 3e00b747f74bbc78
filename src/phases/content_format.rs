//! Content format: category- and website-type-specific format expectations.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::model::{PageCategory, WebsiteType};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::ContentFormat;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no page signals supplied");
    }

    let mut products_unmarked: Vec<String> = Vec::new();
    let mut headingless_prose: Vec<String> = Vec::new();
    let mut compliant = 0usize;

    for (item, signals) in &with_signals {
        let mut ok = true;

        // Product pages on commerce sites must expose machine-readable
        // offers; elsewhere structured data on products is merely expected.
        if item.category == PageCategory::Product && !signals.structured_data {
            products_unmarked.push(item.url.clone());
            ok = false;
        }

        // Prose without any headings, unless the page is legal boilerplate.
        if item.category == PageCategory::Content
            && signals.word_count > 600
            && signals.heading_count == 0
        {
            headingless_prose.push(item.url.clone());
            ok = false;
        }

        if ok {
            compliant += 1;
        }
    }

    let mut issues = Vec::new();
    if !products_unmarked.is_empty() {
        let severity = if ctx.website_type == WebsiteType::Ecommerce {
            Severity::High
        } else {
            Severity::Medium
        };
        issues.push(Issue {
            kind: "product_without_markup".into(),
            severity,
            message: format!(
                "{} product pages lack structured offer markup",
                products_unmarked.len()
            ),
            recommendation: "Add Product structured data with offer, price, and availability".into(),
            affected_urls: products_unmarked,
        });
    }
    if !headingless_prose.is_empty() {
        issues.push(Issue {
            kind: "headingless_longform".into(),
            severity: Severity::Medium,
            message: format!(
                "{} long-form pages present prose with no heading structure",
                headingless_prose.len()
            ),
            recommendation: "Structure long-form content with descriptive headings".into(),
            affected_urls: headingless_prose,
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
