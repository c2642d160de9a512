//! TLS certificate inspection.
//!
//! Probes the host's certificate on a connection of its own, independent of
//! the content fetch, so it can run concurrently with everything else. The
//! probe never fails the pipeline: any internal error is captured into the
//! returned [`TlsInfo`] as `valid: false` plus a message.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use url::Url;

use crate::config::{TCP_CONNECT_TIMEOUT, TLS_HANDSHAKE_TIMEOUT};
use crate::models::TlsInfo;

const SECONDS_PER_DAY: i64 = 86_400;

/// Inspects the TLS certificate presented by `url`'s host.
///
/// Non-https URLs return a `valid: false` result without any network probe.
/// For https URLs this opens a TLS connection to port 443, reads the peer
/// certificate's issuer and validity window, and computes the days remaining
/// until expiry. All failures are absorbed into the result.
pub async fn inspect_tls(url: &Url) -> TlsInfo {
    if url.scheme() != "https" {
        return TlsInfo::not_secure(url.scheme());
    }
    let Some(host) = url.host_str() else {
        return TlsInfo::failed("https", "URL has no host".to_string());
    };

    match probe_certificate(host).await {
        Ok(info) => info,
        Err(e) => {
            debug!("TLS probe failed for {host}: {e:#}");
            TlsInfo::failed("https", format!("{e:#}"))
        }
    }
}

/// Connects to `host:443`, performs a handshake against the webpki roots, and
/// extracts certificate details from the peer's leaf certificate.
async fn probe_certificate(host: &str) -> Result<TlsInfo> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    // An explicit provider keeps the probe independent of any process-level
    // rustls installation, which library consumers cannot be assumed to do.
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .context("Crypto provider rejected the default protocol versions")?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name =
        ServerName::try_from(host.to_string()).context("Invalid server name")?;

    let sock = tokio::time::timeout(TCP_CONNECT_TIMEOUT, TcpStream::connect((host, 443)))
        .await
        .map_err(|_| anyhow!("TCP connection timeout for {host}:443"))?
        .with_context(|| format!("Failed to connect to {host}:443"))?;

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = tokio::time::timeout(TLS_HANDSHAKE_TIMEOUT, connector.connect(server_name, sock))
        .await
        .map_err(|_| anyhow!("TLS handshake timeout for {host}"))?
        .with_context(|| format!("TLS handshake failed for {host}"))?;

    let (_, connection) = tls_stream.get_ref();
    let certs = connection
        .peer_certificates()
        .ok_or_else(|| anyhow!("No peer certificates presented by {host}"))?;
    let leaf = certs
        .first()
        .ok_or_else(|| anyhow!("Empty certificate chain from {host}"))?;

    let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
        .map_err(|e| anyhow!("Certificate parse error: {e}"))?;

    let issuer = cert.tbs_certificate.issuer.to_string();
    let not_before = cert.validity().not_before.timestamp();
    let not_after = cert.validity().not_after.timestamp();
    let now = Utc::now().timestamp();

    Ok(TlsInfo {
        // The handshake already validated the chain against the webpki roots;
        // the window check guards against clock-skewed edge cases.
        valid: now >= not_before && now <= not_after,
        days_remaining: Some(days_remaining(not_after, now)),
        issuer: Some(issuer),
        valid_from: Some(format_timestamp(not_before)),
        valid_to: Some(format_timestamp(not_after)),
        protocol: "https".to_string(),
        error: None,
    })
}

/// Whole days from `now` until `not_after`; negative once expired.
fn days_remaining(not_after: i64, now: i64) -> i64 {
    (not_after - now) / SECONDS_PER_DAY
}

fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[tokio::test]
    async fn test_http_scheme_skips_probe() {
        let url = normalize("http://example.com").unwrap();
        let info = inspect_tls(&url).await;
        assert!(!info.valid);
        assert_eq!(info.protocol, "http");
        assert!(info.error.is_none());
        assert!(info.days_remaining.is_none());
        assert!(info.issuer.is_none());
    }

    #[tokio::test]
    async fn test_probe_failure_is_absorbed() {
        // Nothing listens on this port of localhost's name form; the probe
        // must come back as a failed TlsInfo, never an Err.
        let url = normalize("https://localhost").unwrap();
        let info = inspect_tls(&url).await;
        assert!(!info.valid);
        assert_eq!(info.protocol, "https");
        assert!(info.error.is_some());
    }

    #[test]
    fn test_days_remaining_arithmetic() {
        assert_eq!(days_remaining(90 * SECONDS_PER_DAY, 0), 90);
        assert_eq!(days_remaining(SECONDS_PER_DAY - 1, 0), 0);
        assert_eq!(days_remaining(0, 30 * SECONDS_PER_DAY), -30);
    }

    #[test]
    fn test_format_timestamp_rfc3339() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
    }
}
