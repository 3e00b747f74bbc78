//! Map findings onto prioritized roadmap tasks.

use super::impact::estimate_impact;
use super::{Level, Priority, PriorityGroup, Roadmap, RoadmapSummary, RoadmapTask, TaskKind};
use crate::aggregate::{SEMANTIC_PHASES, TECHNICAL_PHASES};
use crate::model::InventoryItem;
use crate::overlap::{CannibalizationRisk, ContentMergeSuggestion, SuggestedAction};
use crate::phases::{Issue, PhaseResult, Severity};
use std::collections::BTreeMap;

/// Derive a task's priority.
///
/// High if the source severity is high, or the payoff is high for at most
/// medium effort. Medium severity or medium impact keeps a task visible;
/// everything else drops to low.
pub fn derive_priority(severity: Option<Severity>, impact: Level, effort: Level) -> Priority {
    if severity == Some(Severity::High) || (impact == Level::High && effort <= Level::Medium) {
        Priority::High
    } else if severity == Some(Severity::Medium) || impact == Level::Medium {
        Priority::Medium
    } else {
        Priority::Low
    }
}

fn severity_level(severity: Severity) -> Level {
    match severity {
        Severity::High => Level::High,
        Severity::Medium => Level::Medium,
        Severity::Low => Level::Low,
    }
}

/// Effort scales with how many pages a fix touches.
fn effort_for(urls: usize) -> Level {
    if urls > 20 {
        Level::High
    } else if urls > 5 {
        Level::Medium
    } else {
        Level::Low
    }
}

fn issue_category(result: &PhaseResult) -> &'static str {
    if TECHNICAL_PHASES.contains(&result.key) {
        "Technical Fixes"
    } else if SEMANTIC_PHASES.contains(&result.key) {
        "Content Quality"
    } else {
        "Structural Gaps"
    }
}

fn issue_title(issue: &Issue) -> String {
    // "orphan_pages" -> "Orphan pages"
    let mut words = issue.kind.replace('_', " ");
    if let Some(first) = words.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    words
}

/// Build the full roadmap from every finding of the run.
pub fn build_roadmap(
    phase_results: &[PhaseResult],
    suggestions: &[ContentMergeSuggestion],
    risks: &[CannibalizationRisk],
    inventory: &[InventoryItem],
) -> Roadmap {
    let mut tasks: Vec<(String, RoadmapTask)> = Vec::new();
    let mut next_id = 0usize;
    fn task_id(n: &mut usize) -> String {
        let id = format!("task-{:04}", *n);
        *n += 1;
        id
    }

    for result in phase_results {
        let category = issue_category(result);
        for issue in &result.issues {
            let impact = severity_level(issue.severity);
            let effort = effort_for(issue.affected_urls.len());
            tasks.push((
                category.to_string(),
                RoadmapTask {
                    id: task_id(&mut next_id),
                    kind: TaskKind::Fix,
                    title: issue_title(issue),
                    description: format!("{} {}", issue.message, issue.recommendation),
                    impact,
                    effort,
                    affected_urls: issue.affected_urls.clone(),
                    priority: derive_priority(Some(issue.severity), impact, effort),
                },
            ));
        }
    }

    for suggestion in suggestions {
        let (kind, category, impact, effort) = match suggestion.suggested_action {
            SuggestedAction::Merge => (TaskKind::Merge, "Merge Candidates", Level::High, Level::Medium),
            SuggestedAction::Redirect => {
                (TaskKind::Redirect, "Merge Candidates", Level::Medium, Level::Low)
            }
            SuggestedAction::Differentiate => {
                (TaskKind::Other, "Merge Candidates", Level::Medium, Level::Medium)
            }
        };
        tasks.push((
            category.to_string(),
            RoadmapTask {
                id: task_id(&mut next_id),
                kind,
                title: match suggestion.suggested_action {
                    SuggestedAction::Merge => "Merge overlapping pages".to_string(),
                    SuggestedAction::Redirect => "Redirect low-traffic duplicate".to_string(),
                    SuggestedAction::Differentiate => "Differentiate overlapping pages".to_string(),
                },
                description: suggestion.reason.clone(),
                impact,
                effort,
                affected_urls: vec![suggestion.source_url.clone(), suggestion.target_url.clone()],
                priority: derive_priority(None, impact, effort),
            },
        ));
    }

    for risk in risks {
        let impact = severity_level(risk.severity);
        let effort = effort_for(risk.urls.len());
        tasks.push((
            "Cannibalization".to_string(),
            RoadmapTask {
                id: task_id(&mut next_id),
                kind: TaskKind::Other,
                title: format!("Resolve keyword collision on \"{}\"", risk.shared_entity),
                description: risk.recommendation.clone(),
                impact,
                effort,
                affected_urls: risk.urls.clone(),
                priority: derive_priority(Some(risk.severity), impact, effort),
            },
        ));
    }

    // Group by (priority, category); BTreeMap orders categories, priorities
    // are emitted high → low.
    let mut groups: BTreeMap<(std::cmp::Reverse<Priority>, String), Vec<RoadmapTask>> =
        BTreeMap::new();
    let mut summary = RoadmapSummary {
        total_tasks: tasks.len(),
        ..Default::default()
    };
    for (category, task) in tasks {
        match task.priority {
            Priority::High => summary.high_priority += 1,
            Priority::Medium => summary.medium_priority += 1,
            Priority::Low => summary.low_priority += 1,
        }
        groups
            .entry((std::cmp::Reverse(task.priority), category))
            .or_default()
            .push(task);
    }

    let priorities: Vec<PriorityGroup> = groups
        .into_iter()
        .map(|((priority, category), mut tasks)| {
            tasks.sort_by(|a, b| a.id.cmp(&b.id));
            PriorityGroup {
                priority: priority.0,
                category,
                tasks,
            }
        })
        .collect();

    let estimated_impact = estimate_impact(phase_results, &priorities, inventory);

    Roadmap {
        priorities,
        summary,
        estimated_impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::PhaseScore;
    use crate::weights::PhaseKey;
    use std::collections::BTreeMap as Map;

    fn result_with_issue(key: PhaseKey, severity: Severity, urls: &[&str]) -> PhaseResult {
        PhaseResult {
            key,
            score: PhaseScore::Scored(50.0),
            issues: vec![Issue {
                kind: "orphan_pages".into(),
                severity,
                message: "pages receive no internal links".into(),
                recommendation: "link them".into(),
                affected_urls: urls.iter().map(|u| u.to_string()).collect(),
            }],
            metrics: Map::new(),
        }
    }

    #[test]
    fn test_priority_derivation() {
        assert_eq!(
            derive_priority(Some(Severity::High), Level::Low, Level::High),
            Priority::High
        );
        assert_eq!(
            derive_priority(None, Level::High, Level::Medium),
            Priority::High
        );
        // High impact but high effort does not jump the queue.
        assert_eq!(
            derive_priority(None, Level::High, Level::High),
            Priority::Medium
        );
        assert_eq!(
            derive_priority(Some(Severity::Medium), Level::Low, Level::Low),
            Priority::Medium
        );
        assert_eq!(derive_priority(None, Level::Low, Level::Low), Priority::Low);
    }

    #[test]
    fn test_groups_ordered_high_first() {
        let results = vec![
            result_with_issue(PhaseKey::InternalLinking, Severity::High, &["https://a"]),
            result_with_issue(PhaseKey::HtmlTechnical, Severity::Low, &["https://b"]),
        ];
        let roadmap = build_roadmap(&results, &[], &[], &[]);

        assert_eq!(roadmap.summary.total_tasks, 2);
        assert_eq!(roadmap.summary.high_priority, 1);
        assert_eq!(roadmap.priorities[0].priority, Priority::High);
        assert_eq!(roadmap.priorities[0].category, "Structural Gaps");
    }

    #[test]
    fn test_merge_suggestion_becomes_high_priority_merge_task() {
        let suggestion = ContentMergeSuggestion {
            source_url: "https://s.com/a".into(),
            target_url: "https://s.com/b".into(),
            overlap_percentage: 72.0,
            reason: "most terms shared".into(),
            suggested_action: SuggestedAction::Merge,
        };
        let roadmap = build_roadmap(&[], &[suggestion], &[], &[]);

        let group = &roadmap.priorities[0];
        assert_eq!(group.priority, Priority::High);
        assert_eq!(group.category, "Merge Candidates");
        assert_eq!(group.tasks[0].kind, TaskKind::Merge);
        // Source/target order is preserved in the task.
        assert_eq!(
            group.tasks[0].affected_urls,
            vec!["https://s.com/a", "https://s.com/b"]
        );
    }

    #[test]
    fn test_every_finding_maps_to_exactly_one_task() {
        let results = vec![result_with_issue(
            PhaseKey::InternalLinking,
            Severity::Medium,
            &["https://a"],
        )];
        let risk = CannibalizationRisk {
            urls: vec!["https://a".into(), "https://b".into()],
            shared_entity: "espresso".into(),
            shared_keywords: ["best espresso".to_string()].into_iter().collect(),
            severity: Severity::Low,
            recommendation: "monitor".into(),
        };
        let roadmap = build_roadmap(&results, &[], &[risk], &[]);
        assert_eq!(roadmap.summary.total_tasks, 2);
    }
}
