//! Estimated impact rollup for the roadmap.

use super::{Level, Priority, PriorityGroup};
use crate::aggregate::{user_experience_score, SEMANTIC_PHASES, TECHNICAL_PHASES};
use crate::model::InventoryItem;
use crate::phases::{PhaseResult, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Traffic thresholds for the potential estimate.
const MEANINGFUL_CLICKS: u64 = 100;
const SOME_CLICKS: u64 = 10;

/// Projected payoff of completing the roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedImpact {
    pub traffic_potential: Level,
    /// Share of semantic issues resolved by the high+medium tasks.
    pub authority_improvement_pct: f32,
    /// Share of technical issues resolved by the high+medium tasks.
    pub indexation_improvement_pct: f32,
    /// Mean of available technical and structural phase scores.
    pub user_experience_score: Option<f32>,
}

/// Share (in percent) of a phase group's issues that are high or medium
/// severity — the ones the prioritized roadmap resolves.
fn resolved_share(
    phase_results: &[PhaseResult],
    group: &[crate::weights::PhaseKey],
) -> f32 {
    let mut total = 0usize;
    let mut resolved = 0usize;
    for result in phase_results {
        if !group.contains(&result.key) {
            continue;
        }
        for issue in &result.issues {
            total += 1;
            if issue.severity >= Severity::Medium {
                resolved += 1;
            }
        }
    }
    if total == 0 {
        return 0.0;
    }
    resolved as f32 / total as f32 * 100.0
}

pub fn estimate_impact(
    phase_results: &[PhaseResult],
    priorities: &[PriorityGroup],
    inventory: &[InventoryItem],
) -> EstimatedImpact {
    let clicks_by_url: HashMap<&str, u64> = inventory
        .iter()
        .map(|item| (item.url.as_str(), item.traffic.clicks))
        .collect();

    // Does any high-priority task touch a page that already earns traffic?
    let mut traffic_potential = Level::Low;
    for group in priorities {
        if group.priority != Priority::High {
            continue;
        }
        for task in &group.tasks {
            for url in &task.affected_urls {
                let clicks = clicks_by_url.get(url.as_str()).copied().unwrap_or(0);
                if clicks >= MEANINGFUL_CLICKS {
                    traffic_potential = Level::High;
                } else if clicks >= SOME_CLICKS && traffic_potential == Level::Low {
                    traffic_potential = Level::Medium;
                }
            }
        }
    }

    EstimatedImpact {
        traffic_potential,
        authority_improvement_pct: resolved_share(phase_results, &SEMANTIC_PHASES),
        indexation_improvement_pct: resolved_share(phase_results, &TECHNICAL_PHASES),
        user_experience_score: user_experience_score(phase_results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageCategory;
    use crate::phases::{Issue, PhaseScore};
    use crate::roadmap::{RoadmapTask, TaskKind};
    use crate::weights::PhaseKey;
    use std::collections::BTreeMap;

    fn high_group(url: &str) -> PriorityGroup {
        PriorityGroup {
            priority: Priority::High,
            category: "Technical Fixes".into(),
            tasks: vec![RoadmapTask {
                id: "task-0000".into(),
                kind: TaskKind::Fix,
                title: "Fix".into(),
                description: String::new(),
                impact: Level::High,
                effort: Level::Low,
                affected_urls: vec![url.to_string()],
                priority: Priority::High,
            }],
        }
    }

    #[test]
    fn test_traffic_potential_tiers() {
        let mut popular = InventoryItem::new(1, "https://s.com/popular", PageCategory::Content);
        popular.traffic.clicks = 500;
        let inventory = vec![popular];

        let impact = estimate_impact(&[], &[high_group("https://s.com/popular")], &inventory);
        assert_eq!(impact.traffic_potential, Level::High);

        let impact = estimate_impact(&[], &[high_group("https://s.com/unknown")], &inventory);
        assert_eq!(impact.traffic_potential, Level::Low);
    }

    #[test]
    fn test_resolved_share() {
        let result = PhaseResult {
            key: PhaseKey::HtmlTechnical,
            score: PhaseScore::Scored(40.0),
            issues: vec![
                Issue {
                    kind: "a".into(),
                    severity: Severity::High,
                    message: String::new(),
                    recommendation: String::new(),
                    affected_urls: Vec::new(),
                },
                Issue {
                    kind: "b".into(),
                    severity: Severity::Low,
                    message: String::new(),
                    recommendation: String::new(),
                    affected_urls: Vec::new(),
                },
            ],
            metrics: BTreeMap::new(),
        };
        let impact = estimate_impact(&[result], &[], &[]);
        assert_eq!(impact.indexation_improvement_pct, 50.0);
        assert_eq!(impact.authority_improvement_pct, 0.0);
    }
}
