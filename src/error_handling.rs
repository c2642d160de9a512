//! Error type definitions.
//!
//! Two layers of errors exist:
//!
//! - [`AuditError`] is the public taxonomy returned by `analyze`. Only the URL
//!   normalizer and the content fetcher can fail an audit; every other
//!   sub-check absorbs its own failures and returns a degraded findings value.
//! - [`InitializationError`] covers startup failures (logger, HTTP client)
//!   before any audit runs.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors that terminate an audit request.
///
/// `InvalidUrl` is a client fault (malformed input); `FetchTimeout` and
/// `NetworkError` mean the initial content fetch failed, which is terminal for
/// the whole audit since SEO, security, and performance analysis all depend on
/// the fetched markup. No partial report is returned in any of these cases,
/// and nothing is retried.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The input could not be parsed into an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The content fetch exceeded its deadline.
    #[error("Fetch timed out after {timeout_ms} ms")]
    FetchTimeout {
        /// The deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// The content fetch failed for a reason other than the deadline.
    #[error("Network error fetching {url}: {source}")]
    NetworkError {
        /// The URL that was being fetched.
        url: String,
        /// The underlying transport error.
        source: ReqwestError,
    },
}

impl AuditError {
    /// Whether this error is the caller's fault (malformed input) rather than
    /// a fetch failure. The CLI maps this to a distinct exit code; an HTTP
    /// caller would map it to a 4xx response.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, AuditError::InvalidUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_client_fault() {
        assert!(AuditError::InvalidUrl("nope".into()).is_client_fault());
        assert!(!AuditError::FetchTimeout { timeout_ms: 20_000 }.is_client_fault());
    }

    #[test]
    fn test_timeout_message_includes_deadline() {
        let e = AuditError::FetchTimeout { timeout_ms: 250 };
        assert_eq!(e.to_string(), "Fetch timed out after 250 ms");
    }
}
