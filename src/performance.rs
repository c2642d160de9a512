//! Performance heuristics.
//!
//! Derived entirely from the fetcher's measurements and the markup analyzer's
//! resource counts; no additional network traffic or parse pass. The issue
//! checklist is reported alongside the numeric score but does not feed it.

use crate::config::{LARGE_HTML_BYTES, MANY_SCRIPTS_THRESHOLD};
use crate::models::{clamp_score, PerformanceFindings, ResourceCounts};

/// Scores the fetched payload on size and script weight.
///
/// Score: start at 100, subtract `min(40, ⌊bytes/400000⌋ × 5)` for payload
/// size, subtract `4` per external script beyond six, clamp to `[0, 100]`.
/// `ttfb_ms` is the fetcher's real measurement, reported as-is.
pub fn analyze_performance(
    ttfb_ms: u64,
    total_bytes: usize,
    resources: ResourceCounts,
) -> PerformanceFindings {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if total_bytes > LARGE_HTML_BYTES {
        issues.push("Large HTML payload (>800KB)".to_string());
        recommendations
            .push("Reduce HTML size by removing unused markup and inlining less.".to_string());
    }
    if resources.script > MANY_SCRIPTS_THRESHOLD {
        issues.push("Too many JS files (>10)".to_string());
        recommendations.push("Bundle or code-split wisely; remove unused scripts.".to_string());
    }

    let size_penalty = ((total_bytes / 400_000) as i64 * 5).min(40);
    let script_penalty = (resources.script as i64 - 6).max(0) * 4;
    let score = clamp_score(100 - size_penalty - script_penalty);

    PerformanceFindings {
        ttfb_ms,
        total_bytes,
        requests: resources,
        issues,
        recommendations,
        score,
    }
}
