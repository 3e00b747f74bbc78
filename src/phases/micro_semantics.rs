//! Micro semantics: word-level structure proxies from page signals.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::MicroSemantics;

/// Healthy band for words per heading section.
const CHUNK_MIN: f32 = 80.0;
const CHUNK_MAX: f32 = 250.0;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no page signals supplied");
    }

    let mut walls_of_text: Vec<String> = Vec::new();
    let mut fragmented: Vec<String> = Vec::new();
    let mut untitled: Vec<String> = Vec::new();
    let mut healthy = 0usize;

    for (item, signals) in &with_signals {
        if signals.title.is_none() {
            untitled.push(item.url.clone());
        }
        if signals.word_count == 0 {
            continue;
        }
        let chunk = signals.word_count as f32 / (signals.heading_count.max(1)) as f32;
        if chunk > CHUNK_MAX && signals.word_count > 500 {
            walls_of_text.push(item.url.clone());
        } else if chunk < CHUNK_MIN && signals.heading_count > 3 {
            fragmented.push(item.url.clone());
        } else if signals.title.is_some() {
            healthy += 1;
        }
    }

    let mut issues = Vec::new();
    if !walls_of_text.is_empty() {
        issues.push(Issue {
            kind: "unstructured_text".into(),
            severity: Severity::Medium,
            message: format!(
                "{} pages bury long passages under too few headings",
                walls_of_text.len()
            ),
            recommendation: "Break long sections into heading-led chunks answering one question each".into(),
            affected_urls: walls_of_text,
        });
    }
    if !fragmented.is_empty() {
        issues.push(Issue {
            kind: "over_fragmented".into(),
            severity: Severity::Low,
            message: format!("{} pages scatter thin fragments across many headings", fragmented.len()),
            recommendation: "Consolidate related fragments under fewer, fuller sections".into(),
            affected_urls: fragmented,
        });
    }
    if !untitled.is_empty() {
        issues.push(Issue {
            kind: "missing_title".into(),
            severity: Severity::High,
            message: format!("{} pages have no title", untitled.len()),
            recommendation: "Write an entity-led title for every page".into(),
            affected_urls: untitled,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("pages_with_signals".into(), with_signals.len() as f64);
    metrics.insert("healthy_chunking".into(), healthy as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(healthy, with_signals.len())),
        issues,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use crate::model::{PageSignals, TopicArena};

    #[test]
    fn test_unavailable_without_signals() {
        let inventory = vec![page(1, "https://site.com/a")];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert!(!result.score.is_available());
    }

    #[test]
    fn test_wall_of_text_flagged() {
        let inventory = vec![page_with_signals(
            1,
            "https://site.com/wall",
            PageSignals {
                title: Some("Guide".into()),
                word_count: 2400,
                heading_count: 2,
                ..Default::default()
            },
        )];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert!(result.issues.iter().any(|i| i.kind == "unstructured_text"));
    }

    #[test]
    fn test_healthy_page_scores_full() {
        let inventory = vec![page_with_signals(
            1,
            "https://site.com/ok",
            PageSignals {
                title: Some("Espresso Guide".into()),
                word_count: 1200,
                heading_count: 8,
                ..Default::default()
            },
        )];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert_eq!(result.score.value(), Some(100.0));
    }
}
