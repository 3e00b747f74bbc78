//! Semantic distance: drift of pages away from the topical core.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::SemanticDistance;

/// Hop distances from the root topic beyond which a page is drifting.
const DRIFT_HOPS: usize = 3;
const SEVERE_DRIFT_HOPS: usize = 5;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    if ctx.topics.is_empty() {
        return PhaseResult::unavailable(KEY, "no topic hierarchy supplied");
    }

    let attached: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| {
            item.topic_id
                .and_then(|id| ctx.topics.index_of(id))
                .map(|idx| (item, ctx.topics.distance_to_root(idx)))
        })
        .collect();

    if attached.is_empty() {
        return PhaseResult::unavailable(KEY, "no pages attached to topics");
    }

    let mut drifting: Vec<String> = Vec::new();
    let mut far_adrift: Vec<String> = Vec::new();
    let mut near_core = 0usize;

    for (item, hops) in &attached {
        if *hops > SEVERE_DRIFT_HOPS {
            far_adrift.push(item.url.clone());
        } else if *hops > DRIFT_HOPS {
            drifting.push(item.url.clone());
        } else {
            near_core += 1;
        }
    }

    let mut issues = Vec::new();
    if !far_adrift.is_empty() {
        issues.push(Issue {
            kind: "severe_topical_drift".into(),
            severity: Severity::High,
            message: format!(
                "{} pages sit more than {SEVERE_DRIFT_HOPS} hops from the topical core",
                far_adrift.len()
            ),
            recommendation: "Re-anchor these pages under a closer topic or prune the branch".into(),
            affected_urls: far_adrift,
        });
    }
    if !drifting.is_empty() {
        issues.push(Issue {
            kind: "topical_drift".into(),
            severity: Severity::Medium,
            message: format!("{} pages are drifting from the topical core", drifting.len()),
            recommendation: "Flatten the branch or strengthen the bridge topics above these pages".into(),
            affected_urls: drifting,
        });
    }

    let mean_hops =
        attached.iter().map(|(_, h)| *h as f64).sum::<f64>() / attached.len() as f64;
    let mut metrics = BTreeMap::new();
    metrics.insert("pages_attached".into(), attached.len() as f64);
    metrics.insert("mean_hops".into(), mean_hops);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(near_core, attached.len())),
        issues,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use crate::model::{EnrichedTopic, TopicArena};

    fn chain(depth: u32) -> TopicArena {
        let topics = (0..=depth)
            .map(|i| EnrichedTopic {
                id: i,
                name: format!("level-{i}"),
                parent_id: if i == 0 { None } else { Some(i - 1) },
                primary_entity: format!("entity-{i}"),
                entities: Vec::new(),
                keywords: Vec::new(),
                intent_hint: None,
            })
            .collect();
        TopicArena::build(topics)
    }

    #[test]
    fn test_deep_page_drifts() {
        let arena = chain(6);
        let mut deep = page(1, "https://site.com/deep");
        deep.topic_id = Some(6);
        let mut shallow = page(2, "https://site.com/shallow");
        shallow.topic_id = Some(1);

        let inventory = vec![deep, shallow];
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert_eq!(result.score.value(), Some(50.0));
        let severe = result
            .issues
            .iter()
            .find(|i| i.kind == "severe_topical_drift")
            .unwrap();
        assert_eq!(severe.affected_urls, vec!["https://site.com/deep"]);
    }

    #[test]
    fn test_unavailable_without_attachment() {
        let arena = chain(2);
        let inventory = vec![page(1, "https://site.com/free")];
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert!(!result.score.is_available());
    }
}
