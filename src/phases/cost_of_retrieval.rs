//! Cost of retrieval: how expensive a page is to load and digest.

use super::{Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::CostOfRetrieval;

const SLOW_MS: u32 = 2_000;
const CRITICAL_MS: u32 = 5_000;
const HEAVY_KB: u32 = 1_500;

/// Per-page cost-of-retrieval score, 0–100 (100 = instant and light).
///
/// Load time dominates; weight contributes the remainder. The load-time
/// curve saturates at 10s the same way the mapping-time encoder normalizes.
pub fn page_score(load_time_ms: u32, page_weight_kb: u32) -> f32 {
    let time_component = 1.0 - (load_time_ms as f32 / 10_000.0).clamp(0.0, 1.0);
    let weight_component = 1.0 - (page_weight_kb as f32 / 5_000.0).clamp(0.0, 1.0);
    (time_component * 0.7 + weight_component * 0.3) * 100.0
}

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .filter(|(_, s)| s.load_time_ms > 0)
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no load-time signals supplied");
    }

    let mut critical_slow: Vec<String> = Vec::new();
    let mut slow: Vec<String> = Vec::new();
    let mut heavy: Vec<String> = Vec::new();
    let mut total = 0.0f32;

    for (item, signals) in &with_signals {
        total += page_score(signals.load_time_ms, signals.page_weight_kb);
        if signals.load_time_ms > CRITICAL_MS {
            critical_slow.push(item.url.clone());
        } else if signals.load_time_ms > SLOW_MS {
            slow.push(item.url.clone());
        }
        if signals.page_weight_kb > HEAVY_KB {
            heavy.push(item.url.clone());
        }
    }

    let mut issues = Vec::new();
    if !critical_slow.is_empty() {
        issues.push(Issue {
            kind: "critical_load_time".into(),
            severity: Severity::High,
            message: format!("{} pages take more than {CRITICAL_MS} ms to load", critical_slow.len()),
            recommendation: "Cut render-blocking resources and defer non-critical scripts".into(),
            affected_urls: critical_slow,
        });
    }
    if !slow.is_empty() {
        issues.push(Issue {
            kind: "slow_load_time".into(),
            severity: Severity::Medium,
            message: format!("{} pages load slower than {SLOW_MS} ms", slow.len()),
            recommendation: "Compress images and enable caching on these pages".into(),
            affected_urls: slow,
        });
    }
    if !heavy.is_empty() {
        issues.push(Issue {
            kind: "heavy_page_weight".into(),
            severity: Severity::Medium,
            message: format!("{} pages exceed {HEAVY_KB} kB transfer weight", heavy.len()),
            recommendation: "Trim payloads; every retained byte raises the cost of retrieval".into(),
            affected_urls: heavy,
        });
    }

    let mean = total / with_signals.len() as f32;
    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), with_signals.len() as f64);
    metrics.insert(
        "mean_load_ms".into(),
        with_signals
            .iter()
            .map(|(_, s)| s.load_time_ms as f64)
            .sum::<f64>()
            / with_signals.len() as f64,
    );

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(mean),
        issues,
        metrics,
    }
}
