//! Contextual flow: hub-spoke reachability across the topic hierarchy.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::ContextualFlow;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    if ctx.topics.is_empty() {
        return PhaseResult::unavailable(KEY, "no topic hierarchy supplied");
    }

    // Spoke pages: attached to a topic that has a parent. Each must link
    // onward so readers (and crawlers) can flow back toward the hub.
    let spokes: Vec<_> = ctx
        .inventory
        .iter()
        .filter(|item| {
            item.topic_id
                .and_then(|id| ctx.topics.index_of(id))
                .and_then(|idx| ctx.topics.parent_of(idx))
                .is_some()
        })
        .collect();

    if spokes.is_empty() {
        return PhaseResult::unavailable(KEY, "no pages attached to child topics");
    }

    let mut broken_flow: Vec<String> = Vec::new();
    let mut weak_flow: Vec<String> = Vec::new();
    let mut connected = 0usize;

    for item in &spokes {
        match item.signals.as_ref() {
            Some(s) if s.internal_links_out == 0 => broken_flow.push(item.url.clone()),
            Some(s) if s.internal_links_out < 2 => weak_flow.push(item.url.clone()),
            Some(_) => connected += 1,
            // No signals: cannot judge this page, count it as connected
            // rather than punishing missing instrumentation.
            None => connected += 1,
        }
    }

    let mut issues = Vec::new();
    if !broken_flow.is_empty() {
        issues.push(Issue {
            kind: "broken_contextual_flow".into(),
            severity: Severity::High,
            message: format!(
                "{} spoke pages link to nothing, stranding readers off the hub",
                broken_flow.len()
            ),
            recommendation: "Link every spoke page back to its hub and to sibling spokes".into(),
            affected_urls: broken_flow,
        });
    }
    if !weak_flow.is_empty() {
        issues.push(Issue {
            kind: "weak_contextual_flow".into(),
            severity: Severity::Low,
            message: format!("{} spoke pages carry a single outbound link", weak_flow.len()),
            recommendation: "Add contextual links to the hub and at least one sibling".into(),
            affected_urls: weak_flow,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("spoke_pages".into(), spokes.len() as f64);
    metrics.insert("connected".into(), connected as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(connected, spokes.len())),
        issues,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use crate::model::{EnrichedTopic, PageSignals, TopicArena};

    fn hierarchy() -> TopicArena {
        TopicArena::build(vec![
            EnrichedTopic {
                id: 1,
                name: "coffee".into(),
                parent_id: None,
                primary_entity: "coffee".into(),
                entities: Vec::new(),
                keywords: Vec::new(),
                intent_hint: None,
            },
            EnrichedTopic {
                id: 2,
                name: "espresso".into(),
                parent_id: Some(1),
                primary_entity: "espresso".into(),
                entities: Vec::new(),
                keywords: Vec::new(),
                intent_hint: None,
            },
        ])
    }

    #[test]
    fn test_stranded_spoke_flagged() {
        let mut stranded = page_with_signals(
            1,
            "https://site.com/espresso",
            PageSignals {
                internal_links_out: 0,
                ..Default::default()
            },
        );
        stranded.topic_id = Some(2);

        let arena = hierarchy();
        let inventory = vec![stranded];
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert_eq!(result.score.value(), Some(0.0));
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == "broken_contextual_flow" && i.severity == Severity::High));
    }

    #[test]
    fn test_root_pages_not_spokes() {
        let mut hub = page(1, "https://site.com/coffee");
        hub.topic_id = Some(1);
        let arena = hierarchy();
        let inventory = vec![hub];
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert!(!result.score.is_available());
    }
}
