//! Topic hierarchy and the arena built from it.

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Website type, informing phase-specific rule variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteType {
    Ecommerce,
    Publisher,
    Corporate,
    Directory,
    Generic,
}

/// Search intent classification for a page or topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIntent {
    Informational,
    Navigational,
    Transactional,
    Commercial,
}

/// A topic node as supplied by the topical-map collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTopic {
    pub id: u32,
    pub name: String,
    pub parent_id: Option<u32>,
    /// The entity this topic is primarily about.
    pub primary_entity: String,
    /// Secondary entities covered by the topic.
    #[serde(default)]
    pub entities: Vec<String>,
    /// Primary keywords targeted by pages under this topic.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub intent_hint: Option<SearchIntent>,
}

/// Topic hierarchy built once per run into an index-based arena.
///
/// Parent/child relationships are resolved at build time so traversals
/// never fall back to linear scans over the flat topic list.
#[derive(Debug, Default)]
pub struct TopicArena {
    topics: Vec<EnrichedTopic>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    by_id: FnvHashMap<u32, usize>,
}

impl TopicArena {
    /// Build the arena from a flat topic list.
    ///
    /// Topics whose parent_id does not resolve are treated as roots. Order
    /// of the input list is preserved, so identical inputs build identical
    /// arenas.
    pub fn build(topics: Vec<EnrichedTopic>) -> Self {
        let by_id: FnvHashMap<u32, usize> =
            topics.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        let parent: Vec<Option<usize>> = topics
            .iter()
            .map(|t| t.parent_id.and_then(|pid| by_id.get(&pid).copied()))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); topics.len()];
        for (idx, p) in parent.iter().enumerate() {
            if let Some(p) = p {
                children[*p].push(idx);
            }
        }

        Self {
            topics,
            parent,
            children,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&EnrichedTopic> {
        self.topics.get(idx)
    }

    /// Resolve a topic by its external id.
    pub fn by_id(&self, id: u32) -> Option<&EnrichedTopic> {
        self.by_id.get(&id).map(|&i| &self.topics[i])
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    pub fn parent_of(&self, idx: usize) -> Option<usize> {
        self.parent.get(idx).copied().flatten()
    }

    /// Hop count from a topic up to its root. Cycle-safe: traversal stops
    /// after visiting every topic once.
    pub fn distance_to_root(&self, idx: usize) -> usize {
        let mut hops = 0;
        let mut cur = idx;
        let limit = self.topics.len();
        while let Some(p) = self.parent_of(cur) {
            hops += 1;
            cur = p;
            if hops > limit {
                break;
            }
        }
        hops
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrichedTopic> {
        self.topics.iter()
    }
}
