//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `site_audit` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Serializing the audit report to stdout
//!
//! All analysis logic is implemented in the library crate.

use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;

use site_audit::initialization::init_logger_with;
use site_audit::{AuditConfig, Auditor, LogFormat, LogLevel};

/// Audit a website's SEO, security, performance, and accessibility.
#[derive(Debug, Parser)]
#[command(name = "site_audit", version, about)]
struct Cli {
    /// URL to audit (scheme optional; https is assumed)
    url: String,

    /// Request timeout in milliseconds (also: REQUEST_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum retained HTML bytes (also: MAX_HTML_BYTES)
    #[arg(long)]
    max_html_bytes: Option<usize>,

    /// Path to the headless browser executable (also: BROWSER_EXECUTABLE)
    #[arg(long)]
    browser_path: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

/// Reads and parses an environment variable, ignoring unset or malformed
/// values.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Builds the audit configuration from defaults, environment, and CLI flags,
/// in increasing order of precedence.
fn build_config(cli: &Cli) -> AuditConfig {
    let mut config = AuditConfig::default();

    if let Some(timeout_ms) = env_parse("REQUEST_TIMEOUT_MS") {
        config.request_timeout_ms = timeout_ms;
    }
    if let Some(max_bytes) = env_parse("MAX_HTML_BYTES") {
        config.max_html_bytes = max_bytes;
    }
    if let Some(path) = std::env::var_os("BROWSER_EXECUTABLE") {
        config.browser_executable = Some(PathBuf::from(path));
    }

    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    if let Some(max_bytes) = cli.max_html_bytes {
        config.max_html_bytes = max_bytes;
    }
    if let Some(path) = &cli.browser_path {
        config.browser_executable = Some(path.clone());
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = build_config(&cli);
    let auditor = Auditor::new(config).context("Failed to initialize auditor")?;

    match auditor.analyze(&cli.url).await {
        Ok(report) => {
            let json = if cli.pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            }
            .context("Failed to serialize report")?;
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            eprintln!("site_audit error: {e}");
            // Malformed input is the caller's fault; everything else is a
            // fetch failure.
            let code = if e.is_client_fault() { 2 } else { 1 };
            process::exit(code);
        }
    }
}
