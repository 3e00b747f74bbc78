//! Normalized page records as supplied by the inventory collaborator.

use serde::{Deserialize, Serialize};

/// Coarse page category assigned at import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCategory {
    Content,
    Product,
    Category,
    Legal,
    Pagination,
    Media,
    Uncategorized,
}

/// Remediation action the engine recommends for a page.
///
/// Pruning is a recommendation, never an action — the engine does not
/// delete inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Keep,
    Optimize,
    Rewrite,
    Merge,
    Redirect,
    Prune,
    Canonicalize,
    CreateNew,
}

/// Live search traffic for a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficMetrics {
    pub clicks: u64,
    pub impressions: u64,
    /// Average search position, 0.0 when unranked.
    pub position: f32,
}

impl TrafficMetrics {
    pub fn has_traffic(&self) -> bool {
        self.clicks > 0
    }
}

/// Scores carried over from previous runs or upstream analysis, each 0–100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorScores {
    pub audit: Option<f32>,
    pub cost_of_retrieval: Option<f32>,
    /// Alignment with the central entity.
    pub entity_alignment: Option<f32>,
    /// Alignment with the source context.
    pub source_context_alignment: Option<f32>,
    /// Alignment with the central search intent.
    pub intent_alignment: Option<f32>,
}

/// Technical signals captured for a page at import time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSignals {
    pub title: Option<String>,
    pub meta_description: bool,
    pub structured_data: bool,
    pub word_count: u32,
    pub heading_count: u32,
    pub internal_links_in: u32,
    pub internal_links_out: u32,
    pub load_time_ms: u32,
    pub page_weight_kb: u32,
    pub html_errors: u32,
}

/// A single audited page.
///
/// Read-only for the duration of a run; the engine returns per-page
/// writebacks in the result instead of mutating these in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub url: String,
    pub category: PageCategory,
    /// Topic this page belongs to, if classified.
    pub topic_id: Option<u32>,
    #[serde(default)]
    pub traffic: TrafficMetrics,
    #[serde(default)]
    pub scores: PriorScores,
    #[serde(default)]
    pub signals: Option<PageSignals>,
    #[serde(default)]
    pub recommended_action: Option<RecommendedAction>,
}

impl InventoryItem {
    /// Minimal item for callers that only have an id and url.
    pub fn new(id: u64, url: impl Into<String>, category: PageCategory) -> Self {
        Self {
            id,
            url: url.into(),
            category,
            topic_id: None,
            traffic: TrafficMetrics::default(),
            scores: PriorScores::default(),
            signals: None,
            recommended_action: None,
        }
    }
}
