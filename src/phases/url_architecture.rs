//! URL architecture: path depth, scheme, casing, and query hygiene.

use super::{compliance_score, Issue, PhaseContext, PhaseResult, PhaseScore, Severity};
use crate::model::PageCategory;
use crate::weights::PhaseKey;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

const KEY: PhaseKey = PhaseKey::UrlArchitecture;

const MAX_DEPTH: usize = 4;

static TRACKING_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^|&)(utm_[a-z]+|sessionid|sid|fbclid|gclid)=").unwrap());

static MESSY_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z_]|%20").unwrap());

pub fn run(ctx: &PhaseContext<'_>) -> PhaseResult {
    let mut insecure: Vec<String> = Vec::new();
    let mut too_deep: Vec<String> = Vec::new();
    let mut queried: Vec<String> = Vec::new();
    let mut messy: Vec<String> = Vec::new();
    let mut unparseable: Vec<String> = Vec::new();
    let mut clean = 0usize;

    for item in ctx.inventory {
        let Ok(parsed) = Url::parse(&item.url) else {
            unparseable.push(item.url.clone());
            continue;
        };

        let mut ok = true;

        if parsed.scheme() != "https" {
            insecure.push(item.url.clone());
            ok = false;
        }

        let depth = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).count())
            .unwrap_or(0);
        if depth > MAX_DEPTH {
            too_deep.push(item.url.clone());
            ok = false;
        }

        // Query strings on canonical content URLs fragment crawl equity.
        // Pagination legitimately uses them.
        if let Some(query) = parsed.query() {
            let tracked = TRACKING_PARAM_RE.is_match(query);
            if tracked || item.category != PageCategory::Pagination {
                queried.push(item.url.clone());
                ok = false;
            }
        }

        if MESSY_SEGMENT_RE.is_match(parsed.path()) {
            messy.push(item.url.clone());
            ok = false;
        }

        if ok {
            clean += 1;
        }
    }

    let total = ctx.inventory.len();

    let mut issues = Vec::new();
    if !insecure.is_empty() {
        issues.push(Issue {
            kind: "insecure_scheme".into(),
            severity: Severity::High,
            message: format!("{} pages are served over plain http", insecure.len()),
            recommendation: "Serve every canonical URL over https".into(),
            affected_urls: insecure,
        });
    }
    if !too_deep.is_empty() {
        issues.push(Issue {
            kind: "deep_path".into(),
            severity: Severity::Medium,
            message: format!("{} pages sit deeper than {MAX_DEPTH} path segments", too_deep.len()),
            recommendation: "Flatten the directory structure toward the topical hub".into(),
            affected_urls: too_deep,
        });
    }
    if !queried.is_empty() {
        issues.push(Issue {
            kind: "query_string_canonical".into(),
            severity: Severity::Medium,
            message: format!("{} canonical URLs carry query strings", queried.len()),
            recommendation: "Canonicalize to clean paths; strip tracking parameters".into(),
            affected_urls: queried,
        });
    }
    if !messy.is_empty() {
        issues.push(Issue {
            kind: "messy_path_segments".into(),
            severity: Severity::Low,
            message: format!(
                "{} URLs use uppercase, underscores, or encoded spaces in the path",
                messy.len()
            ),
            recommendation: "Use lowercase hyphenated slugs".into(),
            affected_urls: messy,
        });
    }
    if !unparseable.is_empty() {
        issues.push(Issue {
            kind: "unparseable_url".into(),
            severity: Severity::High,
            message: format!("{} inventory URLs do not parse", unparseable.len()),
            recommendation: "Fix or remove malformed URLs at import".into(),
            affected_urls: unparseable,
        });
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("pages_scored".into(), total as f64);
    metrics.insert("clean".into(), clean as f64);

    PhaseResult {
        key: KEY,
        score: PhaseScore::Scored(compliance_score(clean, total)),
        issues,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use crate::model::TopicArena;

    #[test]
    fn test_depth_and_scheme() {
        let inventory = vec![
            page(1, "http://site.com/insecure"),
            page(2, "https://site.com/a/b/c/d/e/deep"),
            page(3, "https://site.com/clean-page"),
        ];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));

        let insecure = result.issues.iter().find(|i| i.kind == "insecure_scheme").unwrap();
        assert_eq!(insecure.affected_urls, vec!["http://site.com/insecure"]);
        let deep = result.issues.iter().find(|i| i.kind == "deep_path").unwrap();
        assert_eq!(deep.affected_urls.len(), 1);
    }

    #[test]
    fn test_pagination_query_exempt_unless_tracked() {
        let mut pagination = page(1, "https://site.com/blog?page=2");
        pagination.category = PageCategory::Pagination;
        let mut tracked = page(2, "https://site.com/blog?utm_source=mail");
        tracked.category = PageCategory::Pagination;
        let inventory = vec![pagination, tracked];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));

        let queried = result
            .issues
            .iter()
            .find(|i| i.kind == "query_string_canonical")
            .unwrap();
        assert_eq!(queried.affected_urls, vec!["https://site.com/blog?utm_source=mail"]);
    }

    #[test]
    fn test_messy_segments() {
        let inventory = vec![page(1, "https://site.com/My_Page")];
        let arena = TopicArena::default();
        let result = run(&ctx_with(&inventory, &arena, &[]));
        assert!(result.issues.iter().any(|i| i.kind == "messy_path_segments"));
    }
}
