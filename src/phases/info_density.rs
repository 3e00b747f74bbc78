//! Information density: thin content and padded bloat.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::model::PageCategory;
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::InformationDensity;

const THIN_WORDS: u32 = 300;
const CRITICAL_THIN_WORDS: u32 = 120;
const BLOAT_WORDS: u32 = 3000;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let scorable: Vec<_> = ctx
        .inventory
        .iter()
        .filter(|item| {
            // Pagination and media pages are structural, not prose.
            !matches!(item.category, PageCategory::Pagination | PageCategory::Media)
        })
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if scorable.is_empty() {
        return PhaseResult::unavailable(KEY, "no page signals supplied");
    }

    let mut thin: Vec<String> = Vec::new();
    let mut critically_thin: Vec<String> = Vec::new();
    let mut bloated: Vec<String> = Vec::new();
    let mut healthy = 0usize;

    for (item, signals) in &scorable {
        if signals.word_count < CRITICAL_THIN_WORDS {
            critically_thin.push(item.url.clone());
        } else if signals.word_count < THIN_WORDS {
            thin.push(item.url.clone());
        } else if signals.word_count > BLOAT_WORDS && signals.heading_count < 6 {
            bloated.push(item.url.clone());
        } else {
            healthy += 1;
        }
    }

    let mut issues = Vec::new();
    if !critically_thin.is_empty() {
        issues.push(Issue {
            kind: "critically_thin_content".into(),
            severity: Severity::High,
            message: format!(
                "{} pages offer almost no extractable information",
                critically_thin.len()
            ),
            recommendation: "Expand these pages with substantive coverage or merge them into stronger pages".into(),
            affected_urls: critically_thin,
        });
    }
    if !thin.is_empty() {
        issues.push(Issue {
            kind: "thin_content".into(),
            severity: Severity::Medium,
            message: format!("{} pages fall below the thin-content threshold", thin.len()),
            recommendation: "Deepen coverage with attributes, comparisons, and examples".into(),
            affected_urls: thin,
        });
    }
    if !bloated.is_empty() {
        issues.push(Issue {
            kind: "padded_content".into(),
            severity: Severity::Low,
            message: format!("{} long pages dilute their information density", bloated.len()),
            recommendation: "Cut filler and restructure around headed sections".into(),
            affected_urls: bloated,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), scorable.len() as f64);
    metrics.insert("healthy".into(), healthy as f64);
    metrics.insert(
        "mean_word_count".into(),
        scorable.iter().map(|(_, s)| s.word_count as f64).sum::<f64>() / scorable.len() as f64,
    );

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(healthy, scorable.len())),
        issues,
        metrics,
    }
}
