//! Report data model.
//!
//! These types define the externally-visible JSON shape of an audit. Field
//! names (camelCase via serde) are the contract consumed by callers; the CLI
//! serializes an [`AuditReport`] 1:1 to stdout.

use std::collections::BTreeMap;

use serde::Serialize;

/// Clamps a raw score into the `[0, 100]` range.
pub(crate) fn clamp_score(raw: i64) -> u32 {
    raw.clamp(0, 100) as u32
}

/// The terminal artifact of a single audit: four per-dimension findings
/// objects plus the composite summary.
///
/// Produced once per invocation and returned to the caller; never persisted
/// and never shared across requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// The normalized URL that was audited.
    pub url: String,
    /// Status and size of the fetched payload.
    pub fetched: FetchedSummary,
    /// Per-dimension scores, each in `[0, 100]`.
    pub summary_scores: SummaryScores,
    /// Security header findings, with the TLS probe result embedded.
    pub security: SecurityFindings,
    /// Performance heuristics.
    pub performance: PerformanceFindings,
    /// SEO signals extracted from the markup.
    pub seo: SeoFindings,
    /// Headless accessibility scan results.
    pub accessibility: AccessibilityFindings,
}

/// Status and retained size of the fetched payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedSummary {
    /// HTTP status code of the final response after redirects.
    pub status: u16,
    /// Retained body length in bytes (clamped to the configured cap).
    pub content_length: usize,
}

/// The four per-dimension summary scores.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryScores {
    /// Security header score with the TLS validity bonus applied.
    pub security: u32,
    /// Performance heuristic score.
    pub performance: u32,
    /// SEO checklist score.
    pub seo: u32,
    /// Accessibility scan score.
    pub accessibility: u32,
}

/// SEO signals derived from a single parse of the fetched markup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoFindings {
    /// Text of the first `<title>` element, trimmed; empty when absent.
    pub title: String,
    /// Content of `<meta name="description">`; empty when absent.
    pub meta_description: String,
    /// Text of the first `<h1>` element, trimmed; empty when absent.
    pub h1: String,
    /// Href of `<link rel="canonical">`; empty when absent.
    pub canonical: String,
    /// Content of `<meta name="robots">`; empty when absent.
    pub robots: String,
    /// Number of `<img>` elements.
    pub images: usize,
    /// Number of `<img>` elements lacking non-empty alt text.
    pub missing_alt: usize,
    /// Number of `<a>` elements.
    pub links: usize,
    /// One entry per failed checklist rule, in rule order.
    pub issues: Vec<String>,
    /// One fix suggestion per issue, in the same order.
    pub recommendations: Vec<String>,
    /// `100 − 8 × issues`, clamped to `[0, 100]`.
    pub score: u32,
}

/// Security header checklist results plus the TLS probe outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityFindings {
    /// Response headers as observed, keys lowercased. `BTreeMap` keeps the
    /// serialized key order deterministic.
    pub headers: BTreeMap<String, String>,
    /// One entry per missing protective header, in checklist order.
    pub issues: Vec<String>,
    /// One fixed remediation per issue, in the same order.
    pub recommendations: Vec<String>,
    /// `100 − 10 × issues`, clamped to `[0, 100]`.
    pub score: u32,
    /// TLS certificate probe result, merged in by the pipeline.
    pub ssl: TlsInfo,
}

/// Certificate details from the independent TLS probe.
///
/// The probe never fails the pipeline: any internal error surfaces here as
/// `valid: false` with an `error` message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsInfo {
    /// Whether a trusted, in-validity-window certificate was presented.
    pub valid: bool,
    /// Days until certificate expiry; `None` when no probe ran or it failed.
    pub days_remaining: Option<i64>,
    /// Certificate issuer distinguished name.
    pub issuer: Option<String>,
    /// Start of the validity window, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    /// End of the validity window, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    /// Scheme of the audited URL (`https` probes run; anything else skips).
    pub protocol: String,
    /// Probe failure message, when the probe was attempted but failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TlsInfo {
    /// The no-probe result for a non-secure scheme.
    pub fn not_secure(scheme: &str) -> Self {
        Self {
            valid: false,
            days_remaining: None,
            issuer: None,
            valid_from: None,
            valid_to: None,
            protocol: scheme.to_string(),
            error: None,
        }
    }

    /// The absorbed-failure result for a probe that could not complete.
    pub fn failed(scheme: &str, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::not_secure(scheme)
        }
    }
}

/// Resource tag counts reused between the markup analyzer and the performance
/// heuristic, so the document is parsed exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceCounts {
    /// `<img>` elements.
    pub img: usize,
    /// `<script src=…>` elements.
    pub script: usize,
    /// `<link rel="stylesheet">` elements.
    pub link: usize,
}

/// Performance heuristics over the fetched payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceFindings {
    /// Measured time-to-first-byte in milliseconds (request start until
    /// response headers arrived).
    pub ttfb_ms: u64,
    /// Retained HTML byte length.
    pub total_bytes: usize,
    /// Resource tag counts from the markup analyzer.
    pub requests: ResourceCounts,
    /// Checklist issues (large payload, too many scripts).
    pub issues: Vec<String>,
    /// One fix suggestion per issue.
    pub recommendations: Vec<String>,
    /// Heuristic score in `[0, 100]`.
    pub score: u32,
}

/// One accessibility rule failure with the number of DOM nodes it affects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    /// Rule identifier (axe-style, e.g. `image-alt`).
    pub rule_id: String,
    /// Number of DOM nodes that failed the rule.
    pub affected_node_count: usize,
    /// Human-readable description of what the rule requires.
    pub help_text: String,
}

/// Raw rule-engine outcome embedded in the accessibility findings.
#[derive(Debug, Clone, Serialize)]
pub struct AxeSummary {
    /// Violated rules, in the engine's native order.
    pub violations: Vec<ViolationRecord>,
    /// Rules the engine could not conclusively evaluate.
    pub incomplete: usize,
    /// Rules that passed.
    pub passes: usize,
}

/// Headless accessibility scan results.
///
/// When the scan cannot complete (browser launch, navigation, or injection
/// failure) this carries the degraded neutral result instead: score 50, one
/// explanatory issue, one retry recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct AccessibilityFindings {
    /// Rule-engine outcome.
    pub axe: AxeSummary,
    /// `"<ruleId>: <N> node(s)"` per violated rule.
    pub issues: Vec<String>,
    /// Up to 5 `"Fix <ruleId>: <helpText>"` entries.
    pub recommendations: Vec<String>,
    /// `100 − min(90, 6 × violations)` clamped, or 50 when degraded.
    pub score: u32,
}
