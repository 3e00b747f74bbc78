//! Phase runner framework and the thirteen scored phases.
//!
//! Each phase is a pure function of [`PhaseContext`]: no shared mutable
//! state, so phases run concurrently and retry independently. A phase whose
//! required input is absent returns an unavailable score — a first-class
//! state, not an error.

pub mod consistency;
pub mod content_format;
pub mod contextual_flow;
pub mod cost_of_retrieval;
pub mod eav_integrity;
pub mod html_technical;
pub mod info_density;
pub mod internal_linking;
pub mod micro_semantics;
pub mod semantic_distance;
pub mod strategic;
pub mod structured_data;
pub mod url_architecture;

use crate::model::{InventoryItem, SemanticTriple, TopicArena, WebsiteType};
use crate::weights::PhaseKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Issue severity, derived from how far a measured metric falls below a
/// phase-specific threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single finding produced by a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
    /// Ordered; may be large. Truncation for display is the caller's
    /// concern.
    pub affected_urls: Vec<String>,
}

/// Phase outcome: a 0–100 score, or unavailable with the reason recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PhaseScore {
    Scored(f32),
    Unavailable(String),
}

impl PhaseScore {
    pub fn value(&self) -> Option<f32> {
        match self {
            PhaseScore::Scored(v) => Some(*v),
            PhaseScore::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PhaseScore::Scored(_))
    }
}

/// Result of one phase run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub key: PhaseKey,
    pub score: PhaseScore,
    pub issues: Vec<Issue>,
    /// Raw metrics for the per-phase detail block.
    pub metrics: BTreeMap<String, f64>,
}

impl PhaseResult {
    pub fn unavailable(key: PhaseKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            score: PhaseScore::Unavailable(reason.into()),
            issues: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }
}

/// Read-only inputs shared by every phase.
#[derive(Clone, Copy)]
pub struct PhaseContext<'a> {
    pub inventory: &'a [InventoryItem],
    pub topics: &'a TopicArena,
    pub triples: &'a [SemanticTriple],
    pub website_type: WebsiteType,
}

/// Dispatch a phase by key.
pub fn run_phase(key: PhaseKey, ctx: &PhaseContext<'_>) -> PhaseResult {
    match key {
        PhaseKey::StrategicFoundation => strategic::run(ctx),
        PhaseKey::EavIntegrity => eav_integrity::run(ctx),
        PhaseKey::MicroSemantics => micro_semantics::run(ctx),
        PhaseKey::InformationDensity => info_density::run(ctx),
        PhaseKey::ContextualFlow => contextual_flow::run(ctx),
        PhaseKey::InternalLinking => internal_linking::run(ctx),
        PhaseKey::SemanticDistance => semantic_distance::run(ctx),
        PhaseKey::ContentFormat => content_format::run(ctx),
        PhaseKey::HtmlTechnical => html_technical::run(ctx),
        PhaseKey::StructuredData => structured_data::run(ctx),
        PhaseKey::CostOfRetrieval => cost_of_retrieval::run(ctx),
        PhaseKey::UrlArchitecture => url_architecture::run(ctx),
        PhaseKey::CrossPageConsistency => consistency::run(ctx),
    }
}

/// Share of compliant pages as a 0–100 score.
pub(crate) fn compliance_score(compliant: usize, total: usize) -> f32 {
    if total == 0 {
        return 100.0;
    }
    compliant as f32 / total as f32 * 100.0
}
