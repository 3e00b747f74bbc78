//! Input data model: inventory records, topic hierarchy, semantic triples.

pub mod eav;
pub mod inventory;
pub mod topic;

pub use eav::{AttributeCategory, Predicate, SemanticTriple};
pub use inventory::{
    InventoryItem, PageCategory, PageSignals, PriorScores, RecommendedAction, TrafficMetrics,
};
pub use topic::{EnrichedTopic, SearchIntent, TopicArena, WebsiteType};
