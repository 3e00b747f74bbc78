//! Cannibalization: groups of pages competing for the same query space.

use super::signature::ContentSignature;
use crate::phases::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum shared keywords for a group to register as a risk.
const KEYWORD_FLOOR: usize = 2;

/// A group of pages diluting each other's ranking potential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannibalizationRisk {
    /// At least two URLs, in item-id order.
    pub urls: Vec<String>,
    pub shared_entity: String,
    pub shared_keywords: BTreeSet<String>,
    pub severity: Severity,
    pub recommendation: String,
}

/// Severity of a keyword collision.
///
/// High: enough shared keywords that the pages demonstrably split clicks.
/// Medium: the overlap exists but one page already holds the traffic.
/// Low: everything else, including collisions below the keyword floor.
pub fn classify_severity(shared_keywords: usize, pages_with_traffic: usize) -> Severity {
    if shared_keywords >= 3 && pages_with_traffic >= 2 {
        Severity::High
    } else if shared_keywords >= KEYWORD_FLOOR && pages_with_traffic == 1 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Group pages sharing an entity and at least [`KEYWORD_FLOOR`] keywords.
pub fn detect_cannibalization(signatures: &[ContentSignature]) -> Vec<CannibalizationRisk> {
    // BTreeMap: groups emit in entity order.
    let mut by_entity: BTreeMap<&str, Vec<&ContentSignature>> = BTreeMap::new();
    for sig in signatures {
        by_entity.entry(sig.primary_entity.as_str()).or_default().push(sig);
    }

    let mut risks = Vec::new();
    for (entity, members) in by_entity {
        if members.len() < 2 {
            continue;
        }

        // Keywords contested by at least two pages in the group.
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for sig in &members {
            for kw in &sig.keywords {
                *counts.entry(kw.as_str()).or_default() += 1;
            }
        }
        let shared: BTreeSet<String> = counts
            .iter()
            .filter(|(_, &n)| n >= 2)
            .map(|(kw, _)| kw.to_string())
            .collect();

        if shared.len() < KEYWORD_FLOOR {
            continue;
        }

        // Only pages actually contesting the shared keywords join the risk.
        let contenders: Vec<&&ContentSignature> = members
            .iter()
            .filter(|sig| sig.keywords.iter().any(|k| shared.contains(k)))
            .collect();
        if contenders.len() < 2 {
            continue;
        }

        let pages_with_traffic = contenders.iter().filter(|s| s.clicks > 0).count();
        let severity = classify_severity(shared.len(), pages_with_traffic);

        let recommendation = match severity {
            Severity::High => format!(
                "Consolidate the pages splitting clicks for \"{entity}\" or sharply differentiate their target queries"
            ),
            Severity::Medium => format!(
                "Keep the winning page for \"{entity}\" canonical and repoint the others at adjacent queries"
            ),
            Severity::Low => format!(
                "Monitor keyword targeting around \"{entity}\" as these pages gain traffic"
            ),
        };

        risks.push(CannibalizationRisk {
            urls: contenders.iter().map(|s| s.url.clone()).collect(),
            shared_entity: entity.to_string(),
            shared_keywords: shared,
            severity,
            recommendation,
        });
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchIntent;

    fn sig(id: u64, url: &str, entity: &str, keywords: &[&str], clicks: u64) -> ContentSignature {
        ContentSignature {
            item_id: id,
            url: url.to_string(),
            primary_entity: entity.to_string(),
            entities: std::iter::once(entity.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            intent: SearchIntent::Informational,
            clicks,
        }
    }

    #[test]
    fn test_three_keywords_two_traffic_pages_is_high() {
        let sigs = vec![
            sig(1, "https://s.com/a", "espresso", &["best espresso", "espresso at home", "espresso guide"], 120),
            sig(2, "https://s.com/b", "espresso", &["best espresso", "espresso at home", "espresso guide"], 45),
        ];
        let risks = detect_cannibalization(&sigs);
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].severity, Severity::High);
        assert_eq!(risks[0].shared_keywords.len(), 3);
        assert_eq!(risks[0].urls.len(), 2);
    }

    #[test]
    fn test_single_keyword_severity_is_low() {
        assert_eq!(classify_severity(1, 2), Severity::Low);
    }

    #[test]
    fn test_concentrated_traffic_is_medium() {
        let sigs = vec![
            sig(1, "https://s.com/a", "espresso", &["best espresso", "espresso guide"], 500),
            sig(2, "https://s.com/b", "espresso", &["best espresso", "espresso guide"], 0),
        ];
        let risks = detect_cannibalization(&sigs);
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].severity, Severity::Medium);
    }

    #[test]
    fn test_below_keyword_floor_no_risk() {
        let sigs = vec![
            sig(1, "https://s.com/a", "espresso", &["best espresso"], 10),
            sig(2, "https://s.com/b", "espresso", &["best espresso"], 20),
        ];
        assert!(detect_cannibalization(&sigs).is_empty());
    }

    #[test]
    fn test_different_entities_never_group() {
        let sigs = vec![
            sig(1, "https://s.com/a", "espresso", &["grind size", "brew ratio"], 10),
            sig(2, "https://s.com/b", "pour over", &["grind size", "brew ratio"], 20),
        ];
        assert!(detect_cannibalization(&sigs).is_empty());
    }
}
