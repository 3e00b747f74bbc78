//! Pairwise overlap detection with entity blocking.
//!
//! Comparing every page against every other is O(n²); blocking by primary
//! entity keeps the pair count proportional to bucket sizes. Buckets are
//! processed in sorted key order and sharded across rayon workers;
//! cancellation is checked once per comparison unit.

use super::signature::ContentSignature;
use super::{ContentMergeSuggestion, SuggestedAction};
use fnv::FnvHashMap;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const MERGE_THRESHOLD: f32 = 60.0;
const DIFFERENTIATE_THRESHOLD: f32 = 30.0;
/// A page's traffic is negligible below this share of its counterpart's.
const NEGLIGIBLE_TRAFFIC_RATIO: f64 = 0.1;

/// Detector tuning.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Also compare across buckets whose keys share a leading token
    /// ("coffee" vs "coffee beans"). Catches near-miss entities at the
    /// cost of extra pairs.
    pub compare_adjacent: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            compare_adjacent: true,
        }
    }
}

/// One shard of comparison work.
enum Unit {
    /// All pairs within a bucket.
    Within(Vec<usize>),
    /// Cross pairs between two adjacent buckets.
    Across(Vec<usize>, Vec<usize>),
}

/// Raw similarity ratio between two signatures, in percent.
pub fn overlap_pct(a: &ContentSignature, b: &ContentSignature) -> f32 {
    let ta = a.terms();
    let tb = b.terms();
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    shared as f32 / union as f32 * 100.0
}

/// Detect overlapping pages across the corpus.
///
/// Suggestions come out sorted by (source_url, target_url), so identical
/// inputs produce identical output.
pub fn detect_overlap(
    signatures: &[ContentSignature],
    config: &DetectorConfig,
    cancel: &AtomicBool,
) -> Vec<ContentMergeSuggestion> {
    let mut buckets: FnvHashMap<&str, Vec<usize>> = FnvHashMap::default();
    for (i, sig) in signatures.iter().enumerate() {
        buckets.entry(sig.primary_entity.as_str()).or_default().push(i);
    }

    let mut keys: Vec<&str> = buckets.keys().copied().collect();
    keys.sort_unstable();

    let mut units: Vec<Unit> = Vec::new();
    for key in &keys {
        let members = &buckets[key];
        if members.len() > 1 {
            units.push(Unit::Within(members.clone()));
        }
    }
    if config.compare_adjacent {
        for (i, a) in keys.iter().enumerate() {
            let Some(head_a) = a.split_whitespace().next() else {
                continue;
            };
            for b in keys.iter().skip(i + 1) {
                let head_b = b.split_whitespace().next();
                if head_b == Some(head_a) {
                    units.push(Unit::Across(buckets[a].clone(), buckets[b].clone()));
                }
            }
        }
    }

    debug!(
        "overlap detection: {} signatures, {} buckets, {} units",
        signatures.len(),
        keys.len(),
        units.len()
    );

    let mut suggestions: Vec<ContentMergeSuggestion> = units
        .par_iter()
        .map(|unit| {
            if cancel.load(Ordering::Relaxed) {
                return Vec::new();
            }
            match unit {
                Unit::Within(members) => {
                    let mut out = Vec::new();
                    for (x, &i) in members.iter().enumerate() {
                        for &j in members.iter().skip(x + 1) {
                            if let Some(s) =
                                classify_pair(&signatures[i], &signatures[j], true)
                            {
                                out.push(s);
                            }
                        }
                    }
                    out
                }
                Unit::Across(left, right) => {
                    let mut out = Vec::new();
                    for &i in left {
                        for &j in right {
                            if let Some(s) =
                                classify_pair(&signatures[i], &signatures[j], false)
                            {
                                out.push(s);
                            }
                        }
                    }
                    out
                }
            }
        })
        .flatten()
        .collect();

    suggestions.sort_by(|a, b| {
        (a.source_url.as_str(), a.target_url.as_str())
            .cmp(&(b.source_url.as_str(), b.target_url.as_str()))
    });
    suggestions
}

/// Classify one pair by threshold tier. `same_bucket` marks a shared
/// primary entity, a precondition for the redirect tier.
fn classify_pair(
    a: &ContentSignature,
    b: &ContentSignature,
    same_bucket: bool,
) -> Option<ContentMergeSuggestion> {
    let pct = overlap_pct(a, b);

    if pct >= MERGE_THRESHOLD {
        // Merge the weaker page into the stronger one.
        let (source, target) = if a.clicks <= b.clicks { (a, b) } else { (b, a) };
        return Some(ContentMergeSuggestion {
            source_url: source.url.clone(),
            target_url: target.url.clone(),
            overlap_percentage: pct,
            reason: format!(
                "{:.0}% of salient terms around \"{}\" are shared",
                pct, target.primary_entity
            ),
            suggested_action: SuggestedAction::Merge,
        });
    }

    if pct >= DIFFERENTIATE_THRESHOLD {
        return Some(ContentMergeSuggestion {
            source_url: a.url.clone(),
            target_url: b.url.clone(),
            overlap_percentage: pct,
            reason: format!(
                "partial term overlap ({pct:.0}%) — both pages can hold distinct angles"
            ),
            suggested_action: SuggestedAction::Differentiate,
        });
    }

    // Low overlap: a redirect only makes sense when the pages target the
    // same entity with the same intent and one of them barely earns
    // traffic.
    if same_bucket && a.intent == b.intent && a.clicks > 0 && b.clicks > 0 {
        let (small, large) = if a.clicks <= b.clicks { (a, b) } else { (b, a) };
        if (small.clicks as f64) < large.clicks as f64 * NEGLIGIBLE_TRAFFIC_RATIO {
            return Some(ContentMergeSuggestion {
                source_url: small.url.clone(),
                target_url: large.url.clone(),
                overlap_percentage: pct,
                reason: format!(
                    "\"{}\" traffic is concentrated in the target page",
                    small.primary_entity
                ),
                suggested_action: SuggestedAction::Redirect,
            });
        }
    }

    None
}
