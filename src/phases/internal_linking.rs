//! Internal linking: orphaned and dead-end pages.

use super::{Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::InternalLinking;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no link signals supplied");
    }

    let mut orphans: Vec<String> = Vec::new();
    let mut dead_ends: Vec<String> = Vec::new();

    for (item, signals) in &with_signals {
        if signals.internal_links_in == 0 {
            orphans.push(item.url.clone());
        }
        if signals.internal_links_out == 0 {
            dead_ends.push(item.url.clone());
        }
    }

    let total = with_signals.len() as f32;
    // Orphans are worth double the penalty of dead ends: nothing on the
    // site can pass authority to them.
    let penalty = (orphans.len() as f32 * 2.0 + dead_ends.len() as f32) / total * 50.0;
    let score = (100.0 - penalty).max(0.0);

    let mut issues = Vec::new();
    if !orphans.is_empty() {
        issues.push(Issue {
            kind: "orphan_pages".into(),
            severity: Severity::High,
            message: format!("{} pages receive no internal links", orphans.len()),
            recommendation: "Link each orphan from its topical hub or nearest sibling page".into(),
            affected_urls: orphans,
        });
    }
    if !dead_ends.is_empty() {
        issues.push(Issue {
            kind: "dead_end_pages".into(),
            severity: Severity::Medium,
            message: format!("{} pages link out to nothing", dead_ends.len()),
            recommendation: "Add contextual outbound links so link equity keeps circulating".into(),
            affected_urls: dead_ends,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), with_signals.len() as f64);
    metrics.insert(
        "orphans".into(),
        issues
            .iter()
            .find(|i| i.kind == "orphan_pages")
            .map_or(0.0, |i| i.affected_urls.len() as f64),
    );

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(score),
        issues,
        metrics,
    }
}
