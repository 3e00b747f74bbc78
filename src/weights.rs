//! Phase weight map and its validation.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// The thirteen scored audit phases, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKey {
    StrategicFoundation,
    EavIntegrity,
    MicroSemantics,
    InformationDensity,
    ContextualFlow,
    InternalLinking,
    SemanticDistance,
    ContentFormat,
    HtmlTechnical,
    StructuredData,
    CostOfRetrieval,
    UrlArchitecture,
    CrossPageConsistency,
}

pub const PHASE_COUNT: usize = 13;

/// All phases in canonical order. Phase dispatch, result assembly, and
/// weight serialization all follow this order.
pub const ALL_PHASES: [PhaseKey; PHASE_COUNT] = [
    PhaseKey::StrategicFoundation,
    PhaseKey::EavIntegrity,
    PhaseKey::MicroSemantics,
    PhaseKey::InformationDensity,
    PhaseKey::ContextualFlow,
    PhaseKey::InternalLinking,
    PhaseKey::SemanticDistance,
    PhaseKey::ContentFormat,
    PhaseKey::HtmlTechnical,
    PhaseKey::StructuredData,
    PhaseKey::CostOfRetrieval,
    PhaseKey::UrlArchitecture,
    PhaseKey::CrossPageConsistency,
];

impl PhaseKey {
    pub fn index(self) -> usize {
        ALL_PHASES.iter().position(|&k| k == self).unwrap_or(0)
    }

    /// Stable snake_case name, used as the serialized map key.
    pub fn name(self) -> &'static str {
        match self {
            PhaseKey::StrategicFoundation => "strategic_foundation",
            PhaseKey::EavIntegrity => "eav_integrity",
            PhaseKey::MicroSemantics => "micro_semantics",
            PhaseKey::InformationDensity => "information_density",
            PhaseKey::ContextualFlow => "contextual_flow",
            PhaseKey::InternalLinking => "internal_linking",
            PhaseKey::SemanticDistance => "semantic_distance",
            PhaseKey::ContentFormat => "content_format",
            PhaseKey::HtmlTechnical => "html_technical",
            PhaseKey::StructuredData => "structured_data",
            PhaseKey::CostOfRetrieval => "cost_of_retrieval",
            PhaseKey::UrlArchitecture => "url_architecture",
            PhaseKey::CrossPageConsistency => "cross_page_consistency",
        }
    }

    /// Human-readable label for progress display.
    pub fn label(self) -> &'static str {
        match self {
            PhaseKey::StrategicFoundation => "Strategic Foundation",
            PhaseKey::EavIntegrity => "EAV Integrity",
            PhaseKey::MicroSemantics => "Micro Semantics",
            PhaseKey::InformationDensity => "Information Density",
            PhaseKey::ContextualFlow => "Contextual Flow",
            PhaseKey::InternalLinking => "Internal Linking",
            PhaseKey::SemanticDistance => "Semantic Distance",
            PhaseKey::ContentFormat => "Content Format",
            PhaseKey::HtmlTechnical => "HTML Technical",
            PhaseKey::StructuredData => "Meta & Structured Data",
            PhaseKey::CostOfRetrieval => "Cost of Retrieval",
            PhaseKey::UrlArchitecture => "URL Architecture",
            PhaseKey::CrossPageConsistency => "Cross-Page Consistency",
        }
    }
}

/// Whether a weight map's sum matches the 100-point convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBalance {
    Balanced,
    OverAllocated,
    UnderAllocated,
}

/// Result of checking a weight map. A sum other than 100 is a warning for
/// the caller's UI, never an error: the aggregation formula is ratio-based
/// and scale-invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsCheck {
    pub sum: u32,
    pub balance: WeightBalance,
}

/// Per-phase weights, each 0–50, keyed by [`PhaseKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditWeights {
    values: [u8; PHASE_COUNT],
}

impl AuditWeights {
    /// Maximum accepted weight for a single phase.
    pub const MAX_WEIGHT: u8 = 50;

    pub fn get(&self, key: PhaseKey) -> u8 {
        self.values[key.index()]
    }

    pub fn set(&mut self, key: PhaseKey, value: u8) {
        self.values[key.index()] = value;
    }

    pub fn sum(&self) -> u32 {
        self.values.iter().map(|&v| v as u32).sum()
    }

    /// Check the 100-point convention.
    pub fn check(&self) -> WeightsCheck {
        let sum = self.sum();
        let balance = match sum {
            100 => WeightBalance::Balanced,
            s if s > 100 => WeightBalance::OverAllocated,
            _ => WeightBalance::UnderAllocated,
        };
        WeightsCheck { sum, balance }
    }

    /// First weight outside the accepted range, if any.
    pub fn first_invalid(&self) -> Option<(PhaseKey, u8)> {
        ALL_PHASES
            .iter()
            .map(|&k| (k, self.get(k)))
            .find(|&(_, v)| v > Self::MAX_WEIGHT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseKey, u8)> + '_ {
        ALL_PHASES.iter().map(move |&k| (k, self.get(k)))
    }
}

impl Default for AuditWeights {
    /// The canonical default map. Sums to exactly 100; resetting to
    /// defaults always yields this exact map.
    fn default() -> Self {
        let mut w = Self {
            values: [0; PHASE_COUNT],
        };
        w.set(PhaseKey::StrategicFoundation, 10);
        w.set(PhaseKey::EavIntegrity, 8);
        w.set(PhaseKey::MicroSemantics, 7);
        w.set(PhaseKey::InformationDensity, 8);
        w.set(PhaseKey::ContextualFlow, 7);
        w.set(PhaseKey::InternalLinking, 10);
        w.set(PhaseKey::SemanticDistance, 7);
        w.set(PhaseKey::ContentFormat, 6);
        w.set(PhaseKey::HtmlTechnical, 8);
        w.set(PhaseKey::StructuredData, 8);
        w.set(PhaseKey::CostOfRetrieval, 9);
        w.set(PhaseKey::UrlArchitecture, 6);
        w.set(PhaseKey::CrossPageConsistency, 6);
        w
    }
}

impl Serialize for AuditWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(PHASE_COUNT))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.name(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AuditWeights {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, u8> = BTreeMap::deserialize(deserializer)?;
        let mut weights = AuditWeights {
            values: [0; PHASE_COUNT],
        };
        for key in ALL_PHASES {
            if let Some(&v) = raw.get(key.name()) {
                weights.set(key, v);
            }
        }
        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sums_to_100() {
        let w = AuditWeights::default();
        assert_eq!(w.sum(), 100);
        assert_eq!(w.check().balance, WeightBalance::Balanced);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let a = AuditWeights::default();
        let b = AuditWeights::default();
        assert_eq!(a, b);
    }

    #[test]
    fn test_over_allocated_warning() {
        let mut w = AuditWeights::default();
        assert_eq!(w.get(PhaseKey::StrategicFoundation), 10);
        w.set(PhaseKey::StrategicFoundation, 50);
        let check = w.check();
        assert_eq!(check.sum, 140);
        assert_eq!(check.balance, WeightBalance::OverAllocated);
    }

    #[test]
    fn test_under_allocated_warning() {
        let mut w = AuditWeights::default();
        w.set(PhaseKey::InternalLinking, 0);
        assert_eq!(w.check().balance, WeightBalance::UnderAllocated);
    }

    #[test]
    fn test_serde_roundtrip_preserves_values() {
        let mut w = AuditWeights::default();
        w.set(PhaseKey::CostOfRetrieval, 12);
        let json = serde_json::to_string(&w).unwrap();
        let back: AuditWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_serialized_shape() {
        use assert_json_diff::assert_json_include;
        let value = serde_json::to_value(AuditWeights::default()).unwrap();
        assert_json_include!(
            actual: value,
            expected: serde_json::json!({
                "strategic_foundation": 10,
                "cost_of_retrieval": 9,
                "cross_page_consistency": 6
            })
        );
    }

    #[test]
    fn test_first_invalid() {
        let mut w = AuditWeights::default();
        assert!(w.first_invalid().is_none());
        w.set(PhaseKey::ContentFormat, 51);
        assert_eq!(w.first_invalid(), Some((PhaseKey::ContentFormat, 51)));
    }
}
