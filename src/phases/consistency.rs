//! Cross-page consistency: duplicated titles and near-identical pages.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::CrossPageConsistency;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no page signals supplied");
    }

    // Group by normalized title. BTreeMap keeps group iteration stable.
    let mut by_title: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (item, signals) in &with_signals {
        if let Some(title) = signals.title.as_deref() {
            by_title
                .entry(title.trim().to_lowercase())
                .or_default()
                .push(item.url.as_str());
        }
    }

    let mut duplicated = 0usize;
    let mut issues = Vec::new();
    for (title, urls) in &by_title {
        if urls.len() < 2 {
            continue;
        }
        duplicated += urls.len();
        let severity = if urls.len() >= 3 {
            Severity::High
        } else {
            Severity::Medium
        };
        issues.push(Issue {
            kind: "duplicate_title".into(),
            severity,
            message: format!("{} pages share the title \"{title}\"", urls.len()),
            recommendation: "Give each page a distinct, entity-led title".into(),
            affected_urls: urls.iter().map(|u| u.to_string()).collect(),
        });
    }

    // Near-identical pages on the same topic: same word and heading counts
    // is a strong duplicate signal without needing the content itself.
    let mut by_shape: BTreeMap<(u32, u32, u32), Vec<&str>> = BTreeMap::new();
    for (item, signals) in &with_signals {
        if let Some(topic) = item.topic_id {
            if signals.word_count > 0 {
                by_shape
                    .entry((topic, signals.word_count, signals.heading_count))
                    .or_default()
                    .push(item.url.as_str());
            }
        }
    }
    let mut mirrored = 0usize;
    for ((_, words, _), urls) in &by_shape {
        if urls.len() < 2 {
            continue;
        }
        mirrored += urls.len();
        issues.push(Issue {
            kind: "mirrored_pages".into(),
            severity: Severity::Medium,
            message: format!(
                "{} pages on one topic share an identical shape ({words} words)",
                urls.len()
            ),
            recommendation: "Differentiate or merge pages that mirror each other".into(),
            affected_urls: urls.iter().map(|u| u.to_string()).collect(),
        });
    }

    let consistent = with_signals.len().saturating_sub(duplicated + mirrored);
    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), with_signals.len() as f64);
    metrics.insert("duplicated_titles".into(), duplicated as f64);
    metrics.insert("mirrored".into(), mirrored as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(consistent, with_signals.len())),
        issues,
        metrics,
    }
}
