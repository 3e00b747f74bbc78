//! Weighted aggregation of phase scores into composite scores.

use crate::phases::PhaseResult;
use crate::weights::{AuditWeights, PhaseKey, ALL_PHASES};
use serde::{Deserialize, Serialize};

/// Phases contributing to the technical composite.
pub const TECHNICAL_PHASES: [PhaseKey; 4] = [
    PhaseKey::HtmlTechnical,
    PhaseKey::StructuredData,
    PhaseKey::CostOfRetrieval,
    PhaseKey::UrlArchitecture,
];

/// Phases contributing to the semantic composite.
pub const SEMANTIC_PHASES: [PhaseKey; 5] = [
    PhaseKey::StrategicFoundation,
    PhaseKey::EavIntegrity,
    PhaseKey::MicroSemantics,
    PhaseKey::SemanticDistance,
    PhaseKey::InformationDensity,
];

/// Phases contributing to the structural composite.
pub const STRUCTURAL_PHASES: [PhaseKey; 4] = [
    PhaseKey::ContextualFlow,
    PhaseKey::InternalLinking,
    PhaseKey::ContentFormat,
    PhaseKey::CrossPageConsistency,
];

/// Composite scores. `None` means the covering weight mass was zero —
/// undefined, never reported as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScores {
    pub overall: Option<f32>,
    pub technical: Option<f32>,
    pub semantic: Option<f32>,
    pub structural: Option<f32>,
}

/// Weighted mean over the available phases in `subset`.
///
/// Unavailable phases are excluded and the remaining weights implicitly
/// renormalize — a site is never punished for lacking optional inputs.
/// The ratio form makes the result invariant under positive scaling of
/// the whole weight map.
pub fn composite(
    results: &[PhaseResult],
    weights: &AuditWeights,
    subset: &[PhaseKey],
) -> Option<f32> {
    let mut weighted_sum = 0.0f64;
    let mut weight_mass = 0.0f64;

    for result in results {
        if !subset.contains(&result.key) {
            continue;
        }
        if let Some(score) = result.score.value() {
            let w = weights.get(result.key) as f64;
            weighted_sum += score as f64 * w;
            weight_mass += w;
        }
    }

    if weight_mass == 0.0 {
        return None;
    }
    Some((weighted_sum / weight_mass) as f32)
}

/// All four composites in one pass.
pub fn composite_scores(results: &[PhaseResult], weights: &AuditWeights) -> CompositeScores {
    CompositeScores {
        overall: composite(results, weights, &ALL_PHASES),
        technical: composite(results, weights, &TECHNICAL_PHASES),
        semantic: composite(results, weights, &SEMANTIC_PHASES),
        structural: composite(results, weights, &STRUCTURAL_PHASES),
    }
}

/// Unweighted mean of available phase scores in the technical + structural
/// groups; feeds the user-experience estimate.
pub fn user_experience_score(results: &[PhaseResult]) -> Option<f32> {
    let scores: Vec<f32> = results
        .iter()
        .filter(|r| {
            TECHNICAL_PHASES.contains(&r.key) || STRUCTURAL_PHASES.contains(&r.key)
        })
        .filter_map(|r| r.score.value())
        .collect();

    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f32>() / scores.len() as f32)
}
