//! URL validation and normalization.

use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::AuditError;

/// Validates and normalizes raw user input into an absolute http(s) URL.
///
/// Adds an `https://` prefix when no scheme is present, then parses. Rejects
/// inputs longer than [`MAX_URL_LENGTH`], inputs that fail to parse, and
/// schemes other than `http`/`https`. No side effects.
///
/// # Errors
///
/// Returns [`AuditError::InvalidUrl`] for any input that cannot be turned into
/// an absolute http(s) URL. Callers must treat this as a client fault, not a
/// server fault.
pub fn normalize(input: &str) -> Result<Url, AuditError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AuditError::InvalidUrl("empty input".to_string()));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AuditError::InvalidUrl(format!(
            "URL exceeds maximum length ({} > {})",
            trimmed.len(),
            MAX_URL_LENGTH
        )));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| AuditError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AuditError::InvalidUrl(format!(
            "unsupported scheme: {other}"
        ))),
    }
}
