//! Content overlap and cannibalization detection.

pub mod cannibalization;
pub mod detector;
pub mod signature;

pub use cannibalization::{detect_cannibalization, CannibalizationRisk};
pub use detector::{detect_overlap, DetectorConfig};
pub use signature::{build_signatures, ContentSignature};

use serde::{Deserialize, Serialize};

/// What to do about a pair of overlapping pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Merge,
    Differentiate,
    Redirect,
}

/// A pair of pages whose topical signatures overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMergeSuggestion {
    pub source_url: String,
    pub target_url: String,
    /// Raw similarity ratio. Upstream estimation error can push this past
    /// 100; it is stored as computed. Clamping is a display concern —
    /// see [`ContentMergeSuggestion::display_overlap`].
    pub overlap_percentage: f32,
    pub reason: String,
    pub suggested_action: SuggestedAction,
}

impl ContentMergeSuggestion {
    /// Overlap clamped to [0, 100] for rendering (e.g. indicator width).
    pub fn display_overlap(&self) -> f32 {
        self.overlap_percentage.clamp(0.0, 100.0)
    }
}
