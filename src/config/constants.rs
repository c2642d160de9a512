//! Configuration constants.
//!
//! All tunable limits live here. Values are read once at startup and never
//! mutated afterwards; components receive them through `AuditConfig`.

use std::time::Duration;

/// Default hard deadline for the content fetch and the accessibility scan, in
/// milliseconds. Overridable via `REQUEST_TIMEOUT_MS` or `--timeout-ms`.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// Default cap on retained HTML body bytes. Bytes past the cap are discarded
/// silently while streaming; exceeding the cap is never an error. Overridable
/// via `MAX_HTML_BYTES` or `--max-html-bytes`.
pub const DEFAULT_MAX_HTML_BYTES: usize = 3_500_000;

/// Maximum accepted URL length (2048 characters). Matches common browser and
/// server limits.
pub const MAX_URL_LENGTH: usize = 2048;

/// Timeout for the TCP connect phase of the TLS probe.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the TLS handshake phase of the TLS probe.
pub const TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for shutting the headless browser down after a scan. A wedged
/// process must not hold the audit open past its deadline.
pub const BROWSER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default User-Agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Protective response headers checked by the security inspector, in checklist
/// order. Names are lowercased for case-insensitive lookup.
pub const SECURITY_HEADERS: [&str; 6] = [
    "strict-transport-security",
    "content-security-policy",
    "x-content-type-options",
    "x-frame-options",
    "referrer-policy",
    "permissions-policy",
];

/// HTML payload size above which the performance checklist reports an issue.
pub const LARGE_HTML_BYTES: usize = 800_000;

/// External script count above which the performance checklist reports an issue.
pub const MANY_SCRIPTS_THRESHOLD: usize = 10;
