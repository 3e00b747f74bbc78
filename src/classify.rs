//! Search-intent classification capability.
//!
//! The engine calls an [`IntentClassifier`] wherever a signature needs an
//! intent and the topic carries no hint. Callers may plug in a model-backed
//! implementation; the built-in heuristic is the deterministic default and
//! the fallback when an external implementation keeps failing.

use crate::model::{PageCategory, SearchIntent};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// External classification capability.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(
        &self,
        url: &str,
        title: Option<&str>,
        category: PageCategory,
    ) -> Result<SearchIntent>;
}

/// Deterministic URL/category rules. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn classify_sync(
        url: &str,
        title: Option<&str>,
        category: PageCategory,
    ) -> SearchIntent {
        let path = url.to_lowercase();
        let title = title.map(|t| t.to_lowercase()).unwrap_or_default();

        if matches!(category, PageCategory::Product | PageCategory::Category) {
            return SearchIntent::Transactional;
        }
        if path.contains("/buy")
            || path.contains("/pricing")
            || path.contains("/shop")
            || title.contains("price")
        {
            return SearchIntent::Transactional;
        }
        if path.contains("/best-")
            || path.contains("/review")
            || path.contains("-vs-")
            || title.contains("best ")
            || title.contains(" vs ")
        {
            return SearchIntent::Commercial;
        }
        if path.contains("/about") || path.contains("/contact") || path.contains("/login") {
            return SearchIntent::Navigational;
        }
        SearchIntent::Informational
    }
}

#[async_trait]
impl IntentClassifier for HeuristicClassifier {
    async fn classify(
        &self,
        url: &str,
        title: Option<&str>,
        category: PageCategory,
    ) -> Result<SearchIntent> {
        Ok(Self::classify_sync(url, title, category))
    }
}

/// Bounded retry policy for capability calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
        }
    }
}

/// Call the classifier with bounded exponential backoff.
///
/// Exhausting retries degrades to the heuristic answer rather than failing
/// the run.
pub async fn classify_with_retry(
    classifier: &dyn IntentClassifier,
    policy: RetryPolicy,
    url: &str,
    title: Option<&str>,
    category: PageCategory,
) -> SearchIntent {
    let mut delay = Duration::from_millis(policy.base_delay_ms);

    for attempt in 1..=policy.max_attempts {
        match classifier.classify(url, title, category).await {
            Ok(intent) => return intent,
            Err(e) if attempt < policy.max_attempts => {
                debug!("intent classification attempt {attempt} failed for {url}: {e}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                warn!("intent classification exhausted retries for {url}: {e}");
            }
        }
    }

    HeuristicClassifier::classify_sync(url, title, category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_heuristic_rules() {
        assert_eq!(
            HeuristicClassifier::classify_sync(
                "https://shop.com/p/grinder",
                None,
                PageCategory::Product
            ),
            SearchIntent::Transactional
        );
        assert_eq!(
            HeuristicClassifier::classify_sync(
                "https://site.com/best-espresso-machines",
                None,
                PageCategory::Content
            ),
            SearchIntent::Commercial
        );
        assert_eq!(
            HeuristicClassifier::classify_sync(
                "https://site.com/how-espresso-works",
                None,
                PageCategory::Content
            ),
            SearchIntent::Informational
        );
        assert_eq!(
            HeuristicClassifier::classify_sync(
                "https://site.com/about",
                None,
                PageCategory::Content
            ),
            SearchIntent::Navigational
        );
    }

    struct FlakyClassifier {
        calls: AtomicU32,
        fail_first: u32,
    }

    #[async_trait]
    impl IntentClassifier for FlakyClassifier {
        async fn classify(
            &self,
            _url: &str,
            _title: Option<&str>,
            _category: PageCategory,
        ) -> Result<SearchIntent> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                anyhow::bail!("transient upstream error");
            }
            Ok(SearchIntent::Commercial)
        }
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let flaky = FlakyClassifier {
            calls: AtomicU32::new(0),
            fail_first: 2,
        };
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
        };
        let intent =
            classify_with_retry(&flaky, policy, "https://x.com/a", None, PageCategory::Content)
                .await;
        assert_eq!(intent, SearchIntent::Commercial);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retry_degrades_to_heuristic() {
        let flaky = FlakyClassifier {
            calls: AtomicU32::new(0),
            fail_first: 99,
        };
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay_ms: 1,
        };
        let intent = tokio_test::block_on(classify_with_retry(
            &flaky,
            policy,
            "https://x.com/pricing",
            None,
            PageCategory::Content,
        ));
        // Heuristic fallback, not an error.
        assert_eq!(intent, SearchIntent::Transactional);
    }
}
