//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::AuditConfig;

/// Timeout for the TCP connect phase, kept tighter than the global deadline
/// so unreachable hosts fail fast instead of consuming the whole budget.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Initializes the HTTP client used by the content fetcher.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent from the audit configuration
/// - Global timeout matching the configured request deadline
/// - A tighter connect timeout
/// - Redirect following enabled (reqwest default, up to 10 hops)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &AuditConfig) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.request_timeout())
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(config.user_agent.clone())
        .build()
}
