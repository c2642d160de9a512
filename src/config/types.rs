//! Configuration types.
//!
//! This module defines the audit configuration struct and the enums used for
//! command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_MAX_HTML_BYTES, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Audit configuration, threaded explicitly into every component.
///
/// Read once at process start and immutable thereafter. There is no ambient
/// global state: the pipeline is purely a function of its inputs plus this
/// struct, which keeps it deterministic under test.
///
/// # Examples
///
/// ```
/// use site_audit::AuditConfig;
///
/// let config = AuditConfig {
///     request_timeout_ms: 5_000,
///     ..Default::default()
/// };
/// assert_eq!(config.max_html_bytes, 3_500_000);
/// ```
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Hard deadline for the content fetch and the accessibility scan, in
    /// milliseconds.
    pub request_timeout_ms: u64,

    /// Maximum number of HTML body bytes retained by the fetcher.
    pub max_html_bytes: usize,

    /// Optional path override for the headless browser executable.
    pub browser_executable: Option<PathBuf>,

    /// User-Agent header value for outbound requests.
    pub user_agent: String,
}

impl AuditConfig {
    /// The request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_html_bytes: DEFAULT_MAX_HTML_BYTES,
            browser_executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
