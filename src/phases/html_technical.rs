//! HTML technical: validation errors, titles, heading presence.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::weights::PhaseKey;
use std::collections::BTreeMap;

const KEY: PhaseKey = PhaseKey::HtmlTechnical;

const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 70;
const ERROR_BUDGET: u32 = 5;

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let with_signals: Vec<_> = ctx
        .inventory
        .iter()
        .filter_map(|item| item.signals.as_ref().map(|s| (item, s)))
        .collect();

    if with_signals.is_empty() {
        return PhaseResult::unavailable(KEY, "no page signals supplied");
    }

    let mut error_heavy: Vec<String> = Vec::new();
    let mut bad_titles: Vec<String> = Vec::new();
    let mut headingless: Vec<String> = Vec::new();
    let mut clean = 0usize;

    for (item, signals) in &with_signals {
        let mut ok = true;

        if signals.html_errors > ERROR_BUDGET {
            error_heavy.push(item.url.clone());
            ok = false;
        }

        match signals.title.as_deref() {
            None => {
                bad_titles.push(item.url.clone());
                ok = false;
            }
            Some(t) if t.len() < TITLE_MIN || t.len() > TITLE_MAX => {
                bad_titles.push(item.url.clone());
                ok = false;
            }
            Some(_) => {}
        }

        if signals.heading_count == 0 && signals.word_count > 0 {
            headingless.push(item.url.clone());
            ok = false;
        }

        if ok {
            clean += 1;
        }
    }

    let mut issues = Vec::new();
    if !error_heavy.is_empty() {
        issues.push(Issue {
            kind: "html_validation_errors".into(),
            severity: Severity::High,
            message: format!(
                "{} pages exceed the {ERROR_BUDGET}-error validation budget",
                error_heavy.len()
            ),
            recommendation: "Fix markup errors so parsers extract content reliably".into(),
            affected_urls: error_heavy,
        });
    }
    if !bad_titles.is_empty() {
        issues.push(Issue {
            kind: "degenerate_title".into(),
            severity: Severity::Medium,
            message: format!(
                "{} pages have a missing, truncated, or overlong title",
                bad_titles.len()
            ),
            recommendation: format!("Write titles between {TITLE_MIN} and {TITLE_MAX} characters"),
            affected_urls: bad_titles,
        });
    }
    if !headingless.is_empty() {
        issues.push(Issue {
            kind: "no_headings".into(),
            severity: Severity::Medium,
            message: format!("{} pages render content without a single heading", headingless.len()),
            recommendation: "Add at least an H1 naming the page's entity".into(),
            affected_urls: headingless,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), with_signals.len() as f64);
    metrics.insert("clean".into(), clean as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(clean, with_signals.len())),
        issues,
        metrics,
    }
}
