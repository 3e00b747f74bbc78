//! Audit orchestration: concurrent phase fan-out, detection, aggregation,
//! and roadmap synthesis.

use crate::aggregate::composite_scores;
use crate::classify::{HeuristicClassifier, IntentClassifier, RetryPolicy};
use crate::error::AuditError;
use crate::model::{EnrichedTopic, InventoryItem, SemanticTriple, TopicArena, WebsiteType};
use crate::overlap::{
    build_signatures, detect_cannibalization, detect_overlap, CannibalizationRisk,
    ContentMergeSuggestion, DetectorConfig,
};
use crate::phases::{run_phase, PhaseContext, PhaseResult};
use crate::progress::ProgressSender;
use crate::result::{compute_page_updates, SiteAuditResult};
use crate::roadmap::build_roadmap;
use crate::weights::{AuditWeights, ALL_PHASES, PHASE_COUNT};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Phase checks plus the overlap pass plus the calculating stage.
const TOTAL_STAGES: usize = PHASE_COUNT + 2;

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Bound on concurrently executing phases, sized to avoid overwhelming
    /// any external classification collaborator the phases call into.
    pub max_concurrent_phases: usize,
    pub detector: DetectorConfig,
    pub retry: RetryPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_concurrent_phases: 4,
            detector: DetectorConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Cooperative cancellation flag.
///
/// Phases and detector buckets check it at coarse boundaries; fine-grained
/// preemption is not required.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub(crate) fn as_atomic(&self) -> &AtomicBool {
        &self.flag
    }
}

/// Inputs for one audit run.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub inventory: Vec<InventoryItem>,
    pub topics: Vec<EnrichedTopic>,
    pub triples: Vec<SemanticTriple>,
    pub website_type: WebsiteType,
    pub weights: AuditWeights,
}

/// The audit scoring and roadmap engine.
pub struct AuditEngine {
    config: AuditConfig,
    classifier: Arc<dyn IntentClassifier>,
}

impl AuditEngine {
    /// Engine with the deterministic built-in classifier.
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            classifier: Arc::new(HeuristicClassifier),
        }
    }

    /// Engine with a caller-supplied classification capability.
    pub fn with_classifier(config: AuditConfig, classifier: Arc<dyn IntentClassifier>) -> Self {
        Self { config, classifier }
    }

    /// Run a full audit.
    ///
    /// Inputs are read-only for the duration of the run; repeated runs over
    /// identical inputs produce identical results. A cancelled run discards
    /// partial work and returns [`AuditError::Cancelled`] — never a partial
    /// result.
    pub async fn run(
        &self,
        request: AuditRequest,
        progress: ProgressSender,
        cancel: CancelHandle,
    ) -> Result<SiteAuditResult, AuditError> {
        if request.inventory.is_empty() {
            return Err(AuditError::EmptyInventory);
        }
        if let Some((phase, value)) = request.weights.first_invalid() {
            return Err(AuditError::InvalidWeights {
                phase: phase.name().to_string(),
                value: value as u32,
            });
        }

        progress.preparing();

        let weights = request.weights;
        let weights_check = weights.check();
        let website_type = request.website_type;
        let inventory = Arc::new(request.inventory);
        let arena = Arc::new(TopicArena::build(request.topics));
        let triples = Arc::new(request.triples);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_phases));
        let completed = Arc::new(AtomicUsize::new(0));
        let issues_found = Arc::new(AtomicU64::new(0));

        // Detector runs concurrently with the phases: it reads the same
        // immutable inputs and its output is not needed until the roadmap.
        let detector_handle = {
            let inventory = Arc::clone(&inventory);
            let arena = Arc::clone(&arena);
            let triples = Arc::clone(&triples);
            let classifier = Arc::clone(&self.classifier);
            let detector_config = self.config.detector.clone();
            let retry = self.config.retry;
            let cancel = cancel.clone();
            let progress = progress.clone();
            let completed = Arc::clone(&completed);
            let issues_found = Arc::clone(&issues_found);

            tokio::spawn(async move {
                progress.checking(
                    "Overlap & Cannibalization",
                    stage_percent(&completed),
                    issues_found.load(Ordering::Relaxed),
                );
                let signatures =
                    build_signatures(&inventory, &arena, &triples, classifier.as_ref(), retry)
                        .await;

                let result = tokio::task::spawn_blocking(move || {
                    let suggestions =
                        detect_overlap(&signatures, &detector_config, cancel.as_atomic());
                    let risks = detect_cannibalization(&signatures);
                    (suggestions, risks)
                })
                .await
                .unwrap_or_else(|e| {
                    warn!("overlap detection failed: {e}");
                    (Vec::new(), Vec::new())
                });

                completed.fetch_add(1, Ordering::Relaxed);
                result
            })
        };

        // Phase fan-out under the semaphore. A failing or panicking phase
        // degrades to unavailable; it never aborts the run.
        let mut phase_handles = Vec::with_capacity(PHASE_COUNT);
        for key in ALL_PHASES {
            let inventory = Arc::clone(&inventory);
            let arena = Arc::clone(&arena);
            let triples = Arc::clone(&triples);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let progress = progress.clone();
            let completed = Arc::clone(&completed);
            let issues_found = Arc::clone(&issues_found);

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return PhaseResult::unavailable(key, "scheduler shut down");
                };
                if cancel.is_cancelled() {
                    return PhaseResult::unavailable(key, "run cancelled");
                }

                progress.checking(
                    key.label(),
                    stage_percent(&completed),
                    issues_found.load(Ordering::Relaxed),
                );

                let ctx = PhaseContext {
                    inventory: &inventory,
                    topics: &arena,
                    triples: &triples,
                    website_type,
                };
                let result = run_phase(key, &ctx);
                debug!(
                    "phase {} scored {:?} with {} issues",
                    key.name(),
                    result.score.value(),
                    result.issues.len()
                );

                issues_found.fetch_add(result.issues.len() as u64, Ordering::Relaxed);
                completed.fetch_add(1, Ordering::Relaxed);
                result
            });
            phase_handles.push((key, handle));
        }

        // Barrier one: every phase completes or is skipped before
        // aggregation.
        let phase_results: Vec<PhaseResult> =
            futures::future::join_all(phase_handles.into_iter().map(|(key, handle)| async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("phase {} panicked: {e}", key.name());
                        PhaseResult::unavailable(key, "phase execution failed")
                    }
                }
            }))
            .await;

        // Barrier two: detection output must precede the roadmap.
        let (merge_suggestions, cannibalization_risks): (
            Vec<ContentMergeSuggestion>,
            Vec<CannibalizationRisk>,
        ) = match detector_handle.await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("detector task failed: {e}");
                (Vec::new(), Vec::new())
            }
        };

        if cancel.is_cancelled() {
            progress.cancelled(issues_found.load(Ordering::Relaxed));
            return Err(AuditError::Cancelled);
        }

        progress.calculating(
            (PHASE_COUNT + 1) as f32 / TOTAL_STAGES as f32 * 100.0,
            issues_found.load(Ordering::Relaxed),
        );

        let scores = composite_scores(&phase_results, &weights);
        let roadmap = build_roadmap(
            &phase_results,
            &merge_suggestions,
            &cannibalization_risks,
            &inventory,
        );
        let page_updates =
            compute_page_updates(&inventory, &phase_results, &merge_suggestions, scores.overall);

        let issues_total: usize = phase_results.iter().map(|r| r.issues.len()).sum();
        let result = SiteAuditResult {
            scores,
            pages_audited: inventory.len(),
            issues_found: issues_total,
            recommendations_generated: roadmap.summary.total_tasks,
            weights_check,
            phase_details: phase_results,
            merge_suggestions,
            cannibalization_risks,
            page_updates,
            roadmap,
        };

        progress.done(issues_total as u64);
        Ok(result)
    }
}

fn stage_percent(completed: &AtomicUsize) -> f32 {
    completed.load(Ordering::Relaxed) as f32 / TOTAL_STAGES as f32 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageCategory, PageSignals};
    use crate::progress::ProgressPhase;

    fn sample_request() -> AuditRequest {
        let mut pages = Vec::new();
        for i in 0..6u64 {
            let mut item = InventoryItem::new(
                i,
                format!("https://coffee.example/guide-{i}"),
                PageCategory::Content,
            );
            item.topic_id = Some((i % 2) as u32 + 1);
            item.traffic.clicks = i * 40;
            item.signals = Some(PageSignals {
                title: Some(format!("Espresso Guide Part {i}")),
                meta_description: i % 2 == 0,
                structured_data: i % 3 == 0,
                word_count: 250 + (i as u32) * 300,
                heading_count: 2 + i as u32,
                internal_links_in: i as u32,
                internal_links_out: 2,
                load_time_ms: 900 + (i as u32) * 700,
                page_weight_kb: 400 + (i as u32) * 200,
                html_errors: (i as u32) % 4,
            });
            item.scores.entity_alignment = Some(35.0 + i as f32 * 10.0);
            pages.push(item);
        }

        let topics = vec![
            EnrichedTopic {
                id: 1,
                name: "espresso".into(),
                parent_id: None,
                primary_entity: "espresso".into(),
                entities: vec!["crema".into(), "portafilter".into()],
                keywords: vec!["best espresso".into(), "espresso at home".into(), "espresso guide".into()],
                intent_hint: None,
            },
            EnrichedTopic {
                id: 2,
                name: "espresso beans".into(),
                parent_id: Some(1),
                primary_entity: "espresso".into(),
                entities: vec!["arabica".into()],
                keywords: vec!["best espresso".into(), "espresso guide".into()],
                intent_hint: None,
            },
        ];

        AuditRequest {
            inventory: pages,
            topics,
            triples: vec![SemanticTriple::new(
                "espresso",
                "brew_pressure",
                crate::model::AttributeCategory::Root,
                "9 bar",
            )],
            website_type: WebsiteType::Publisher,
            weights: AuditWeights::default(),
        }
    }

    #[tokio::test]
    async fn test_full_run_produces_result() {
        let engine = AuditEngine::new(AuditConfig::default());
        let (progress, mut rx) = ProgressSender::channel();
        let result = engine
            .run(sample_request(), progress, CancelHandle::new())
            .await
            .unwrap();

        assert_eq!(result.pages_audited, 6);
        assert!(result.scores.overall.is_some());
        assert_eq!(result.phase_details.len(), PHASE_COUNT);
        assert_eq!(
            result.recommendations_generated,
            result.roadmap.summary.total_tasks
        );
        assert_eq!(result.page_updates.len(), 6);

        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event);
        }
        assert_eq!(last.unwrap().phase, ProgressPhase::Done);
    }

    #[tokio::test]
    async fn test_empty_inventory_fails_fast() {
        let engine = AuditEngine::new(AuditConfig::default());
        let mut request = sample_request();
        request.inventory.clear();
        let err = engine
            .run(request, ProgressSender::disabled(), CancelHandle::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::EmptyInventory));
    }

    #[tokio::test]
    async fn test_invalid_weight_fails_fast() {
        let engine = AuditEngine::new(AuditConfig::default());
        let mut request = sample_request();
        request
            .weights
            .set(crate::weights::PhaseKey::EavIntegrity, 51);
        let err = engine
            .run(request, ProgressSender::disabled(), CancelHandle::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::InvalidWeights { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_no_result() {
        let engine = AuditEngine::new(AuditConfig::default());
        let (progress, mut rx) = ProgressSender::channel();
        let cancel = CancelHandle::new();
        cancel.cancel();

        let err = engine
            .run(sample_request(), progress, cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Cancelled));

        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event);
        }
        assert_eq!(last.unwrap().phase, ProgressPhase::Cancelled);
    }

    #[tokio::test]
    async fn test_unbalanced_weights_warn_but_run() {
        let engine = AuditEngine::new(AuditConfig::default());
        let mut request = sample_request();
        request
            .weights
            .set(crate::weights::PhaseKey::StrategicFoundation, 50);
        let result = engine
            .run(request, ProgressSender::disabled(), CancelHandle::new())
            .await
            .unwrap();
        assert_eq!(result.weights_check.sum, 140);
        assert_eq!(
            result.weights_check.balance,
            crate::weights::WeightBalance::OverAllocated
        );
        assert!(result.scores.overall.is_some());
    }

    #[tokio::test]
    async fn test_determinism_across_runs() {
        let engine = AuditEngine::new(AuditConfig::default());
        let first = engine
            .run(
                sample_request(),
                ProgressSender::disabled(),
                CancelHandle::new(),
            )
            .await
            .unwrap();
        let second = engine
            .run(
                sample_request(),
                ProgressSender::disabled(),
                CancelHandle::new(),
            )
            .await
            .unwrap();

        let a = serde_json::to_vec(&first).unwrap();
        let b = serde_json::to_vec(&second).unwrap();
        assert_eq!(a, b);
    }
}
