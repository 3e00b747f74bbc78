//! Remediation roadmap: prioritized tasks synthesized from every finding.

pub mod builder;
pub mod impact;

pub use builder::build_roadmap;
pub use impact::EstimatedImpact;

use serde::{Deserialize, Serialize};

/// What kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Fix,
    Create,
    Merge,
    Delete,
    Redirect,
    Other,
}

/// Coarse magnitude scale shared by impact and effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Task priority, derived from severity, impact, and effort — never stored
/// independently of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A discrete recommended remediation action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapTask {
    pub id: String,
    pub kind: TaskKind,
    pub title: String,
    pub description: String,
    pub impact: Level,
    pub effort: Level,
    pub affected_urls: Vec<String>,
    pub priority: Priority,
}

/// Tasks sharing a priority and category, in id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityGroup {
    pub priority: Priority,
    pub category: String,
    pub tasks: Vec<RoadmapTask>,
}

/// Roadmap-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapSummary {
    pub total_tasks: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
}

/// The full prioritized roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    /// Groups ordered high → low priority, then by category name.
    pub priorities: Vec<PriorityGroup>,
    pub summary: RoadmapSummary,
    pub estimated_impact: EstimatedImpact,
}
