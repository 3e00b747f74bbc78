//! Strategic foundation: alignment of pages with the central entity,
//! source context, and central search intent.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::StrategicFoundation;

/// Mean of the per-page CE/SC/CSI alignment scores a page carries.
fn page_alignment(item: &crate::model::InventoryItem) -> Option<f32> {
    let parts: Vec<f32> = [
        item.scores.entity_alignment,
        item.scores.source_context_alignment,
        item.scores.intent_alignment,
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().sum::<f32>() / parts.len() as f32)
}

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let aligned: Vec<(&str, f32)> = ctx
        .inventory
        .iter()
        .filter_map(|item| page_alignment(item).map(|a| (item.url.as_str(), a)))
        .collect();

    if aligned.is_empty() {
        return PhaseResult::unavailable(KEY, "no alignment scores on any page");
    }

    let mean = aligned.iter().map(|(_, a)| a).sum::<f32>() / aligned.len() as f32;

    let mut weak: Vec<String> = Vec::new();
    let mut critical: Vec<String> = Vec::new();
    for (url, a) in &aligned {
        if *a < 20.0 {
            critical.push((*url).to_string());
        } else if *a < 40.0 {
            weak.push((*url).to_string());
        }
    }

    let mut issues = Vec::new();
    if !critical.is_empty() {
        issues.push(Issue {
            kind: "strategic_misalignment".into(),
            severity: Severity::High,
            message: format!(
                "{} pages are severely misaligned with the central entity and search intent",
                critical.len()
            ),
            recommendation: "Rewrite these pages around the central entity or prune them from the map".into(),
            affected_urls: critical,
        });
    }
    if !weak.is_empty() {
        issues.push(Issue {
            kind: "weak_alignment".into(),
            severity: Severity::Medium,
            message: format!("{} pages show weak strategic alignment", weak.len()),
            recommendation: "Tighten each page's framing to the central entity and source context".into(),
            affected_urls: weak,
        });
    }

    let healthy = aligned.iter().filter(|(_, a)| *a >= 40.0).count();
    let mut metrics = BTreeMap::new();
    metrics.insert("mean_alignment".into(), mean as f64);
    metrics.insert("pages_with_alignment".into(), aligned.len() as f64);

    PhaseResult {
        key: KEY,
        // Blend the mean alignment with the share of healthy pages so a few
        // strongly aligned pages cannot mask a weak corpus.
        score: PhaseScore::Scored(
            (mean + compliance_score(healthy, aligned.len())) / 2.0,
        ),
        issues,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use crate::model::TopicArena;

    #[test]
    fn test_unavailable_without_alignment_scores() {
        let inventory = vec![page(1, "https://site.com/a")];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert!(!result.score.is_available());
    }

    #[test]
    fn test_misaligned_pages_flagged() {
        let mut strong = page(1, "https://site.com/strong");
        strong.scores.entity_alignment = Some(90.0);
        strong.scores.intent_alignment = Some(80.0);

        let mut weak = page(2, "https://site.com/weak");
        weak.scores.entity_alignment = Some(10.0);
        weak.scores.intent_alignment = Some(15.0);

        let inventory = vec![strong, weak];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));

        assert!(result.score.is_available());
        let high: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.severity == Severity::High)
            .collect();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].affected_urls, vec!["https://site.com/weak"]);
    }
}
