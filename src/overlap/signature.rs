//! Per-page content signatures: the input to overlap detection.

use crate::classify::{classify_with_retry, IntentClassifier, RetryPolicy};
use crate::model::{InventoryItem, SearchIntent, SemanticTriple, TopicArena};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Topical signature of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSignature {
    pub item_id: u64,
    pub url: String,
    /// Blocking key: the normalized primary entity of the page's topic.
    pub primary_entity: String,
    pub entities: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
    pub intent: SearchIntent,
    pub clicks: u64,
}

impl ContentSignature {
    /// Salient terms: entities plus keywords.
    pub fn terms(&self) -> BTreeSet<&str> {
        self.entities
            .iter()
            .map(|s| s.as_str())
            .chain(self.keywords.iter().map(|s| s.as_str()))
            .collect()
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Build a signature per topic-attached page.
///
/// Entity terms come from the page's topic (primary plus secondary
/// entities) and from triple subjects naming those entities. Intent comes
/// from the topic hint when present; otherwise the classifier capability
/// decides, with bounded retries degrading to the built-in heuristic.
/// Pages without a topic produce no signature.
pub async fn build_signatures(
    inventory: &[InventoryItem],
    topics: &TopicArena,
    triples: &[SemanticTriple],
    classifier: &dyn IntentClassifier,
    retry: RetryPolicy,
) -> Vec<ContentSignature> {
    // Subjects present in the triple store, for entity confirmation terms.
    let mut subject_objects: HashMap<String, Vec<&str>> = HashMap::new();
    for t in triples {
        subject_objects
            .entry(normalize(&t.subject))
            .or_default()
            .push(t.object.as_str());
    }

    let mut signatures = Vec::new();
    for item in inventory {
        let Some(topic) = item.topic_id.and_then(|id| topics.by_id(id)) else {
            continue;
        };

        let primary_entity = normalize(&topic.primary_entity);
        let mut entities: BTreeSet<String> = BTreeSet::new();
        entities.insert(primary_entity.clone());
        entities.extend(topic.entities.iter().map(|e| normalize(e)));

        // Attribute values of covered entities sharpen the signature:
        // two pages about the same entity facet share its objects.
        for entity in entities.clone() {
            if let Some(objects) = subject_objects.get(&entity) {
                entities.extend(objects.iter().map(|o| normalize(o)));
            }
        }

        let keywords: BTreeSet<String> =
            topic.keywords.iter().map(|k| normalize(k)).collect();

        let title = item.signals.as_ref().and_then(|s| s.title.as_deref());
        let intent = match topic.intent_hint {
            Some(hint) => hint,
            None => {
                classify_with_retry(classifier, retry, &item.url, title, item.category).await
            }
        };

        signatures.push(ContentSignature {
            item_id: item.id,
            url: item.url.clone(),
            primary_entity,
            entities,
            keywords,
            intent,
            clicks: item.traffic.clicks,
        });
    }

    // Inventory order may be arbitrary; detection iterates signatures in
    // id order for deterministic output.
    signatures.sort_by_key(|s| s.item_id);
    signatures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::HeuristicClassifier;
    use crate::model::{AttributeCategory, EnrichedTopic, PageCategory};

    fn topic(id: u32, entity: &str, keywords: &[&str]) -> EnrichedTopic {
        EnrichedTopic {
            id,
            name: entity.to_string(),
            parent_id: None,
            primary_entity: entity.to_string(),
            entities: Vec::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            intent_hint: None,
        }
    }

    #[tokio::test]
    async fn test_signature_terms_from_topic_and_triples() {
        let arena = TopicArena::build(vec![topic(1, "Espresso", &["espresso shot", "crema"])]);
        let triples = vec![SemanticTriple::new(
            "espresso",
            "brew_pressure",
            AttributeCategory::Root,
            "9 bar",
        )];
        let mut item = InventoryItem::new(4, "https://site.com/espresso", PageCategory::Content);
        item.topic_id = Some(1);

        let signatures = build_signatures(
            &[item],
            &arena,
            &triples,
            &HeuristicClassifier,
            RetryPolicy::default(),
        )
        .await;

        assert_eq!(signatures.len(), 1);
        let sig = &signatures[0];
        assert_eq!(sig.primary_entity, "espresso");
        assert!(sig.entities.contains("9 bar"));
        assert!(sig.keywords.contains("crema"));
        assert_eq!(sig.intent, SearchIntent::Informational);
    }

    #[tokio::test]
    async fn test_pages_without_topic_skipped() {
        let arena = TopicArena::build(vec![topic(1, "espresso", &[])]);
        let item = InventoryItem::new(1, "https://site.com/untopiced", PageCategory::Content);
        let signatures = build_signatures(
            &[item],
            &arena,
            &[],
            &HeuristicClassifier,
            RetryPolicy::default(),
        )
        .await;
        assert!(signatures.is_empty());
    }
}
