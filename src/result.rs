//! The immutable audit result snapshot.

use crate::aggregate::CompositeScores;
use crate::model::{InventoryItem, RecommendedAction};
use crate::overlap::{CannibalizationRisk, ContentMergeSuggestion, SuggestedAction};
use crate::phases::{cost_of_retrieval, PhaseResult};
use crate::roadmap::Roadmap;
use crate::weights::WeightsCheck;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-page writeback for the inventory collaborator to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageUpdate {
    pub id: u64,
    pub url: String,
    pub audit_score: f32,
    pub recommended_action: RecommendedAction,
}

/// Complete result of one audit run. Created fresh per run; callers treat
/// it as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAuditResult {
    pub scores: CompositeScores,
    pub pages_audited: usize,
    pub issues_found: usize,
    pub recommendations_generated: usize,
    /// Weight-sum warning state; a sum other than 100 never fails the run.
    pub weights_check: WeightsCheck,
    /// One entry per phase, in canonical phase order.
    pub phase_details: Vec<PhaseResult>,
    pub merge_suggestions: Vec<ContentMergeSuggestion>,
    pub cannibalization_risks: Vec<CannibalizationRisk>,
    pub page_updates: Vec<PageUpdate>,
    pub roadmap: Roadmap,
}

/// Derive per-page score and recommended action.
///
/// Action precedence: merge and redirect sources come straight from the
/// detector; issue-driven actions follow; pages nothing flagged stay
/// `Keep`.
pub fn compute_page_updates(
    inventory: &[InventoryItem],
    phase_results: &[PhaseResult],
    suggestions: &[ContentMergeSuggestion],
    overall: Option<f32>,
) -> Vec<PageUpdate> {
    let mut merge_sources: HashSet<&str> = HashSet::new();
    let mut redirect_sources: HashSet<&str> = HashSet::new();
    for s in suggestions {
        match s.suggested_action {
            SuggestedAction::Merge => {
                merge_sources.insert(s.source_url.as_str());
            }
            SuggestedAction::Redirect => {
                redirect_sources.insert(s.source_url.as_str());
            }
            SuggestedAction::Differentiate => {}
        }
    }

    // url -> worst issue kind classes seen for it
    let mut flagged: HashMap<&str, &str> = HashMap::new();
    for result in phase_results {
        for issue in &result.issues {
            for url in &issue.affected_urls {
                // First flag wins; phases emit in canonical order.
                flagged.entry(url.as_str()).or_insert(issue.kind.as_str());
            }
        }
    }

    inventory
        .iter()
        .map(|item| {
            let action = if merge_sources.contains(item.url.as_str()) {
                RecommendedAction::Merge
            } else if redirect_sources.contains(item.url.as_str()) {
                RecommendedAction::Redirect
            } else {
                match flagged.get(item.url.as_str()).copied() {
                    Some("critically_thin_content") if !item.traffic.has_traffic() => {
                        RecommendedAction::Prune
                    }
                    Some("critically_thin_content") => RecommendedAction::Rewrite,
                    Some("query_string_canonical") => RecommendedAction::Canonicalize,
                    Some(_) => RecommendedAction::Optimize,
                    None => RecommendedAction::Keep,
                }
            };

            let audit_score = page_audit_score(item, overall);

            PageUpdate {
                id: item.id,
                url: item.url.clone(),
                audit_score,
                recommended_action: action,
            }
        })
        .collect()
}

/// Per-page audit score: retrieval cost and strategic alignment where
/// available, otherwise the site-wide score.
fn page_audit_score(item: &InventoryItem, overall: Option<f32>) -> f32 {
    let mut parts: Vec<f32> = Vec::new();

    if let Some(signals) = &item.signals {
        if signals.load_time_ms > 0 {
            parts.push(cost_of_retrieval::page_score(
                signals.load_time_ms,
                signals.page_weight_kb,
            ));
        }
    }
    let alignment: Vec<f32> = [
        item.scores.entity_alignment,
        item.scores.source_context_alignment,
        item.scores.intent_alignment,
    ]
    .into_iter()
    .flatten()
    .collect();
    if !alignment.is_empty() {
        parts.push(alignment.iter().sum::<f32>() / alignment.len() as f32);
    }

    if parts.is_empty() {
        return overall.unwrap_or(0.0);
    }
    parts.iter().sum::<f32>() / parts.len() as f32
}
