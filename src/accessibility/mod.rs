//! Headless accessibility auditing.
//!
//! Launches an isolated browser process per call, navigates to the target,
//! evaluates an embedded accessibility rule engine in the page context, and
//! maps its outcome into findings. The process is never reused or pooled
//! across requests; isolation takes priority over throughput here.
//!
//! This is the one sub-check that absorbs every failure: third-party sites
//! may block automation, the sandbox may be unavailable, navigation may time
//! out. Any of those yields the degraded findings (score 50 plus an
//! explanatory issue) instead of an error, so the pipeline always receives a
//! well-formed findings object.

use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use log::{debug, warn};
use serde::Deserialize;
use url::Url;

use crate::config::{AuditConfig, BROWSER_SHUTDOWN_TIMEOUT};
use crate::models::{clamp_score, AccessibilityFindings, AxeSummary, ViolationRecord};

/// Accessibility rule engine evaluated in the page context. Covers the common
/// axe rule ids; returns `{ violations, incomplete, passes }` by value.
const ENGINE_JS: &str = include_str!("engine.js");

/// How many violations feed the recommendation list.
const MAX_RECOMMENDATIONS: usize = 5;

/// Raw outcome of the in-page rule engine.
#[derive(Debug, Deserialize)]
struct EngineOutcome {
    violations: Vec<EngineViolation>,
    incomplete: usize,
    passes: usize,
}

#[derive(Debug, Deserialize)]
struct EngineViolation {
    id: String,
    help: String,
    nodes: usize,
}

/// Audits `url` for accessibility violations with an isolated headless
/// browser.
///
/// Never fails: launch, navigation, injection, or timeout failures all
/// collapse into [`degraded_findings`]. Launch and the rule run are each
/// bounded by the configured deadline, teardown by a short fixed timeout.
pub async fn audit_accessibility(url: &Url, config: &AuditConfig) -> AccessibilityFindings {
    match scan(url, config).await {
        Ok(findings) => findings,
        Err(e) => {
            warn!("Accessibility scan failed for {url}: {e:#}");
            degraded_findings()
        }
    }
}

/// The neutral result substituted when the scan cannot complete.
pub fn degraded_findings() -> AccessibilityFindings {
    AccessibilityFindings {
        axe: AxeSummary {
            violations: Vec::new(),
            incomplete: 0,
            passes: 0,
        },
        issues: vec!["Accessibility scan failed (likely blocked by site or sandbox)".to_string()],
        recommendations: vec![
            "Retry with an explicit browser executable path or adjusted sandbox permissions."
                .to_string(),
        ],
        score: 50,
    }
}

/// One launch-navigate-evaluate-teardown cycle. Teardown runs on every path,
/// including timeout.
async fn scan(url: &Url, config: &AuditConfig) -> Result<AccessibilityFindings> {
    // Fresh profile directory per launch; removed when the guard drops.
    let user_data_dir = tempfile::tempdir().context("Failed to create browser profile dir")?;

    let mut builder = BrowserConfig::builder()
        .args([
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-gpu",
            "--disable-dev-shm-usage",
        ])
        .user_data_dir(user_data_dir.path());
    if let Some(path) = &config.browser_executable {
        builder = builder.chrome_executable(path.clone());
    }
    let browser_config = builder
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {e}"))?;

    // Launching can wedge on a broken executable, so it gets the same
    // deadline as the rule run.
    let (mut browser, mut handler) =
        tokio::time::timeout(config.request_timeout(), Browser::launch(browser_config))
            .await
            .map_err(|_| {
                anyhow!(
                    "Browser launch timed out after {} ms",
                    config.request_timeout_ms
                )
            })?
            .context("Failed to launch headless browser")?;
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });
    debug!("Headless browser launched for {url}");

    let outcome = tokio::time::timeout(config.request_timeout(), run_rules(&browser, url)).await;

    // Teardown on success, failure, and timeout alike. Bounded as well: an
    // unresponsive process is abandoned rather than waited on forever.
    let _ = tokio::time::timeout(BROWSER_SHUTDOWN_TIMEOUT, async {
        let _ = browser.close().await;
        let _ = browser.wait().await;
    })
    .await;
    handler_task.abort();
    drop(user_data_dir);

    let raw = match outcome {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            return Err(anyhow!(
                "Accessibility scan timed out after {} ms",
                config.request_timeout_ms
            ))
        }
    };

    Ok(findings_from(raw))
}

/// Navigates to the target, waits for DOM construction, and evaluates the
/// rule engine in-page.
async fn run_rules(browser: &Browser, url: &Url) -> Result<EngineOutcome> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("Failed to open page")?;
    page.goto(url.as_str()).await.context("Navigation failed")?;
    page.wait_for_navigation()
        .await
        .context("Page never became ready")?;

    let outcome: EngineOutcome = page
        .evaluate(ENGINE_JS)
        .await
        .context("Rule engine evaluation failed")?
        .into_value()
        .context("Rule engine returned an unexpected shape")?;

    let _ = page.close().await;
    Ok(outcome)
}

/// Maps the rule-engine outcome into findings: one issue per violated rule,
/// up to five recommendations in engine order, and the violation-count score.
fn findings_from(raw: EngineOutcome) -> AccessibilityFindings {
    let issues: Vec<String> = raw
        .violations
        .iter()
        .map(|v| format!("{}: {} node(s)", v.id, v.nodes))
        .collect();
    let recommendations: Vec<String> = raw
        .violations
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|v| format!("Fix {}: {}", v.id, v.help))
        .collect();

    let violation_count = raw.violations.len() as i64;
    let score = clamp_score(100 - (6 * violation_count).min(90));

    AccessibilityFindings {
        axe: AxeSummary {
            violations: raw
                .violations
                .into_iter()
                .map(|v| ViolationRecord {
                    rule_id: v.id,
                    affected_node_count: v.nodes,
                    help_text: v.help,
                })
                .collect(),
            incomplete: raw.incomplete,
            passes: raw.passes,
        },
        issues,
        recommendations,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use std::path::PathBuf;

    fn violation(id: &str, nodes: usize) -> EngineViolation {
        EngineViolation {
            id: id.to_string(),
            help: format!("help for {id}"),
            nodes,
        }
    }

    #[test]
    fn test_findings_from_clean_outcome() {
        let findings = findings_from(EngineOutcome {
            violations: vec![],
            incomplete: 0,
            passes: 7,
        });
        assert_eq!(findings.score, 100);
        assert!(findings.issues.is_empty());
        assert_eq!(findings.axe.passes, 7);
    }

    #[test]
    fn test_findings_from_formats_issues_and_recommendations() {
        let findings = findings_from(EngineOutcome {
            violations: vec![violation("image-alt", 3), violation("label", 1)],
            incomplete: 2,
            passes: 5,
        });
        assert_eq!(findings.issues[0], "image-alt: 3 node(s)");
        assert_eq!(findings.recommendations[1], "Fix label: help for label");
        assert_eq!(findings.score, 100 - 12);
        assert_eq!(findings.axe.violations[0].affected_node_count, 3);
        assert_eq!(findings.axe.incomplete, 2);
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        let violations = (0..8).map(|i| violation(&format!("rule-{i}"), 1)).collect();
        let findings = findings_from(EngineOutcome {
            violations,
            incomplete: 0,
            passes: 0,
        });
        assert_eq!(findings.issues.len(), 8);
        assert_eq!(findings.recommendations.len(), 5);
    }

    #[test]
    fn test_violation_penalty_caps_at_90() {
        let violations = (0..40).map(|i| violation(&format!("rule-{i}"), 1)).collect();
        let findings = findings_from(EngineOutcome {
            violations,
            incomplete: 0,
            passes: 0,
        });
        assert_eq!(findings.score, 10);
    }

    #[test]
    fn test_degraded_findings_shape() {
        let findings = degraded_findings();
        assert_eq!(findings.score, 50);
        assert_eq!(findings.issues.len(), 1);
        assert_eq!(findings.recommendations.len(), 1);
        assert!(findings.axe.violations.is_empty());
    }

    #[tokio::test]
    async fn test_launch_failure_yields_degraded_findings() {
        // A nonexistent executable makes the launch fail fast; the audit must
        // absorb that and return the degraded result, not an error.
        let config = AuditConfig {
            browser_executable: Some(PathBuf::from("/nonexistent/chrome-binary")),
            request_timeout_ms: 2_000,
            ..Default::default()
        };
        let url = normalize("https://example.com").unwrap();
        let findings = audit_accessibility(&url, &config).await;
        assert_eq!(findings.score, 50);
        assert!(!findings.issues.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wedged_browser_launch_is_bounded_by_the_deadline() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        // An executable that never prints a DevTools endpoint wedges the
        // launch; the deadline must cut it off and degrade the findings.
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("stalling-browser");
        std::fs::write(&fake, "#!/bin/sh\nsleep 60\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = AuditConfig {
            browser_executable: Some(fake),
            request_timeout_ms: 1_000,
            ..Default::default()
        };
        let url = normalize("https://example.com").unwrap();
        let started = Instant::now();
        let findings = audit_accessibility(&url, &config).await;
        assert_eq!(findings.score, 50);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
