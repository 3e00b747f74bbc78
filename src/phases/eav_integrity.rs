//! EAV integrity: coverage of the semantic triple store over topic entities.

use super::{Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::model::AttributeCategory;
use crate::weights::PhaseKey;
use std::collections::{BTreeMap, HashMap};

const KEY: PhaseKey = PhaseKey::EavIntegrity;

/// Minimum share of unique+rare attributes an entity needs to stand out
/// from generic coverage of its class.
const DISTINCTIVE_SHARE: f32 = 0.25;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    if ctx.triples.is_empty() {
        return PhaseResult::unavailable(KEY, "no semantic triples supplied");
    }
    if ctx.topics.is_empty() {
        return PhaseResult::unavailable(KEY, "no topics supplied");
    }

    // Index triples by subject once.
    let mut by_subject: HashMap<&str, Vec<&crate::model::SemanticTriple>> = HashMap::new();
    for t in ctx.triples {
        by_subject.entry(t.subject.as_str()).or_default().push(t);
    }

    let mut missing_root: Vec<String> = Vec::new();
    let mut generic_only: Vec<String> = Vec::new();
    let mut covered = 0usize;
    let mut entities = 0usize;

    for topic in ctx.topics.iter() {
        entities += 1;
        let entity = topic.primary_entity.as_str();
        let Some(facts) = by_subject.get(entity) else {
            missing_root.push(entity.to_string());
            continue;
        };

        let has_root = facts
            .iter()
            .any(|t| t.predicate.category == AttributeCategory::Root);
        if !has_root {
            missing_root.push(entity.to_string());
            continue;
        }

        let distinctive = facts
            .iter()
            .filter(|t| {
                matches!(
                    t.predicate.category,
                    AttributeCategory::Unique | AttributeCategory::Rare
                )
            })
            .count();
        if (distinctive as f32 / facts.len() as f32) < DISTINCTIVE_SHARE {
            generic_only.push(entity.to_string());
        } else {
            covered += 1;
        }
    }

    let missing_count = missing_root.len();

    let mut issues = Vec::new();
    if !missing_root.is_empty() {
        issues.push(Issue {
            kind: "missing_root_attributes".into(),
            severity: Severity::High,
            message: format!(
                "{} entities have no root attribute in the triple store",
                missing_root.len()
            ),
            recommendation: "Add the defining (root) attributes for each entity before expanding coverage".into(),
            affected_urls: missing_root,
        });
    }
    if !generic_only.is_empty() {
        issues.push(Issue {
            kind: "generic_attribute_profile".into(),
            severity: Severity::Medium,
            message: format!(
                "{} entities carry only common attributes shared across their class",
                generic_only.len()
            ),
            recommendation: "Document unique and rare attributes to differentiate these entities".into(),
            affected_urls: generic_only,
        });
    }

    // Half credit for entities that have roots but lack distinctive facts.
    let partial = entities - covered - missing_count;
    let score = if entities == 0 {
        100.0
    } else {
        (covered as f32 + partial as f32 * 0.5) / entities as f32 * 100.0
    };

    let mut metrics = BTreeMap::new();
    metrics.insert("entities".into(), entities as f64);
    metrics.insert("fully_covered".into(), covered as f64);
    metrics.insert("triples".into(), ctx.triples.len() as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(score),
        issues,
        metrics,
    }
}
