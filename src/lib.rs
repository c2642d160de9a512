//! site_audit library: website health auditing.
//!
//! Audits a target URL across four dimensions (SEO, security headers/TLS,
//! performance heuristics, accessibility) and aggregates the results into a
//! single [`AuditReport`] with per-dimension scores.
//!
//! # Example
//!
//! ```no_run
//! use site_audit::{AuditConfig, Auditor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let auditor = Auditor::new(AuditConfig::default())?;
//! let report = auditor.analyze("example.com").await?;
//! println!(
//!     "seo {} security {} performance {} accessibility {}",
//!     report.summary_scores.seo,
//!     report.summary_scores.security,
//!     report.summary_scores.performance,
//!     report.summary_scores.accessibility,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Failure model
//!
//! Only two things fail an audit: a malformed URL and a failed content fetch.
//! The TLS probe and the accessibility scan absorb their own failures and
//! surface them inside the report as degraded findings, so a blocked or
//! broken sub-check reduces scores instead of erroring the request.
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod accessibility;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod markup;
mod models;
mod normalize;
mod performance;
mod security;
mod tls;

// Re-export public API
pub use config::{AuditConfig, LogFormat, LogLevel};
pub use error_handling::{AuditError, InitializationError};
pub use models::{
    AccessibilityFindings, AuditReport, AxeSummary, FetchedSummary, PerformanceFindings,
    ResourceCounts, SecurityFindings, SeoFindings, SummaryScores, TlsInfo, ViolationRecord,
};
pub use pipeline::Auditor;

// Internal pipeline module (contains the audit orchestration)
mod pipeline {
    use log::{info, warn};

    use crate::accessibility::{audit_accessibility, degraded_findings};
    use crate::config::AuditConfig;
    use crate::error_handling::{AuditError, InitializationError};
    use crate::fetch::fetch;
    use crate::initialization::init_client;
    use crate::markup::analyze_markup;
    use crate::models::{
        clamp_score, AccessibilityFindings, AuditReport, FetchedSummary, PerformanceFindings,
        SecurityFindings, SeoFindings, SummaryScores, TlsInfo,
    };
    use crate::normalize::normalize;
    use crate::performance::analyze_performance;
    use crate::security::analyze_security;
    use crate::tls::inspect_tls;

    /// The audit pipeline: one HTTP client plus the immutable configuration.
    ///
    /// Invocations share no mutable state; each call to [`Auditor::analyze`]
    /// is independent and stateless. Cheap to share behind an `Arc` in a
    /// server, or used directly in a CLI.
    pub struct Auditor {
        client: reqwest::Client,
        config: AuditConfig,
    }

    impl Auditor {
        /// Creates an auditor with the given configuration.
        ///
        /// # Errors
        ///
        /// Returns [`InitializationError::HttpClientError`] if the HTTP
        /// client cannot be constructed.
        pub fn new(config: AuditConfig) -> Result<Self, InitializationError> {
            let client = init_client(&config)?;
            Ok(Self { client, config })
        }

        /// Audits a single URL and assembles the full report.
        ///
        /// Control flow: normalize, then spawn the TLS probe and the headless
        /// accessibility scan as independent tasks (neither depends on the
        /// fetched payload), then fetch the content. The markup and security
        /// analyzers run over the one fetched payload; the aggregator joins
        /// everything at the end. Total latency is bounded by the slowest
        /// single sub-check rather than their sum.
        ///
        /// # Errors
        ///
        /// [`AuditError::InvalidUrl`] for malformed input, or
        /// [`AuditError::FetchTimeout`] / [`AuditError::NetworkError`] when
        /// the content fetch fails. A fetch failure is terminal: sibling
        /// tasks are aborted and no partial report is returned. TLS and
        /// accessibility failures never surface here; they appear only as
        /// reduced scores and extra issue entries in the report.
        pub async fn analyze(&self, raw_input: &str) -> Result<AuditReport, AuditError> {
            let url = normalize(raw_input)?;
            info!("Auditing {url}");

            // Independent network/process checks start before the fetch so
            // they overlap with it.
            let tls_task = tokio::spawn({
                let url = url.clone();
                async move { inspect_tls(&url).await }
            });
            let accessibility_task = tokio::spawn({
                let url = url.clone();
                let config = self.config.clone();
                async move { audit_accessibility(&url, &config).await }
            });

            let fetched = match fetch(&self.client, &url, &self.config).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    // Terminal for the whole request: sibling results are
                    // moot, so abort rather than await them.
                    tls_task.abort();
                    accessibility_task.abort();
                    return Err(e);
                }
            };

            let markup = analyze_markup(&fetched.html);
            let mut security = analyze_security(&fetched.headers, url.scheme());
            let performance = analyze_performance(
                fetched.ttfb_ms,
                fetched.byte_length,
                markup.resources.clone(),
            );

            security.ssl = match tls_task.await {
                Ok(info) => info,
                Err(e) => {
                    warn!("TLS probe task failed for {url}: {e}");
                    TlsInfo::failed(url.scheme(), format!("probe task failed: {e}"))
                }
            };
            let accessibility = match accessibility_task.await {
                Ok(findings) => findings,
                Err(e) => {
                    warn!("Accessibility task failed for {url}: {e}");
                    degraded_findings()
                }
            };

            let summary_scores =
                aggregate(&markup.seo, &security, &performance, &accessibility);
            info!(
                "Audit of {url} complete: seo {} security {} performance {} accessibility {}",
                summary_scores.seo,
                summary_scores.security,
                summary_scores.performance,
                summary_scores.accessibility
            );

            Ok(AuditReport {
                url: url.to_string(),
                fetched: FetchedSummary {
                    status: fetched.status,
                    content_length: fetched.byte_length,
                },
                summary_scores,
                security,
                performance,
                seo: markup.seo,
                accessibility,
            })
        }
    }

    /// Combines the per-dimension findings into the composite summary.
    ///
    /// Security gets a 10-point bonus for a valid certificate and is scaled
    /// by 0.9; the other three dimensions pass through unweighted. Inputs
    /// are already bounded to `[0, 100]`, but the result is clamped anyway.
    fn aggregate(
        seo: &SeoFindings,
        security: &SecurityFindings,
        performance: &PerformanceFindings,
        accessibility: &AccessibilityFindings,
    ) -> SummaryScores {
        let tls_bonus = if security.ssl.valid { 10 } else { 0 };
        let security_summary =
            clamp_score(((security.score + tls_bonus) as f64 * 0.9).round() as i64);

        SummaryScores {
            security: security_summary,
            performance: performance.score,
            seo: seo.score,
            accessibility: accessibility.score,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn base_findings(
            header_score_issues: usize,
            tls_valid: bool,
        ) -> (SeoFindings, SecurityFindings, PerformanceFindings, AccessibilityFindings) {
            let mut headers = HashMap::new();
            for name in crate::config::SECURITY_HEADERS
                .iter()
                .skip(header_score_issues)
            {
                headers.insert(name.to_string(), "set".to_string());
            }
            let mut security = analyze_security(&headers, "https");
            security.ssl.valid = tls_valid;

            let seo = analyze_markup("").seo;
            let performance = analyze_performance(
                0,
                0,
                crate::models::ResourceCounts {
                    img: 0,
                    script: 0,
                    link: 0,
                },
            );
            (seo, security, performance, degraded_findings())
        }

        #[test]
        fn test_aggregate_applies_tls_bonus_and_weight() {
            let (seo, security, performance, accessibility) = base_findings(0, true);
            assert_eq!(security.score, 100);
            let summary = aggregate(&seo, &security, &performance, &accessibility);
            // (100 + 10) * 0.9 = 99
            assert_eq!(summary.security, 99);
        }

        #[test]
        fn test_aggregate_without_valid_tls() {
            let (seo, security, performance, accessibility) = base_findings(0, false);
            let summary = aggregate(&seo, &security, &performance, &accessibility);
            assert_eq!(summary.security, 90);
        }

        #[test]
        fn test_aggregate_passes_other_dimensions_through() {
            let (seo, security, performance, accessibility) = base_findings(6, false);
            let summary = aggregate(&seo, &security, &performance, &accessibility);
            assert_eq!(summary.seo, seo.score);
            assert_eq!(summary.performance, performance.score);
            assert_eq!(summary.accessibility, 50);
            // 40 * 0.9 = 36
            assert_eq!(summary.security, 36);
        }

        #[test]
        fn test_invalid_input_fails_before_any_network_io() {
            let auditor = Auditor::new(AuditConfig::default()).unwrap();
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let result = runtime.block_on(auditor.analyze("not a url"));
            assert!(matches!(result, Err(AuditError::InvalidUrl(_))));
        }
    }
}
