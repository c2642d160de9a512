//! Bounded content fetching.
//!
//! One GET per audit, no retries. Two hard bounds apply: a deadline covering
//! the entire transfer, and a byte cap enforced while streaming the body so an
//! oversized payload is truncated rather than buffered or failed.

use std::collections::HashMap;
use std::time::Instant;

use log::debug;
use url::Url;

use crate::config::AuditConfig;
use crate::error_handling::AuditError;

/// The outcome of one bounded fetch. Owned exclusively by the pipeline
/// invocation that produced it; never cached or shared across requests.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code of the final response after redirects.
    pub status: u16,
    /// Response headers with lowercased names for case-insensitive lookup.
    pub headers: HashMap<String, String>,
    /// Retained body text. Never longer than the configured byte cap.
    pub html: String,
    /// Number of body bytes retained (bytes past the cap are not counted).
    pub byte_length: usize,
    /// Measured time-to-first-byte: request start until response headers
    /// arrived, in milliseconds.
    pub ttfb_ms: u64,
}

/// Fetches `url`, following redirects, under the configured deadline and byte
/// cap.
///
/// The deadline covers the whole transfer; on expiry the in-flight request is
/// dropped (aborting the transfer) and [`AuditError::FetchTimeout`] is
/// returned. Body bytes past `config.max_html_bytes` are discarded silently:
/// the stream stops reading at the cap and the connection is released.
///
/// # Errors
///
/// [`AuditError::FetchTimeout`] when the deadline expires,
/// [`AuditError::NetworkError`] for any other transport failure. Either is
/// terminal for the whole audit.
pub async fn fetch(
    client: &reqwest::Client,
    url: &Url,
    config: &AuditConfig,
) -> Result<FetchResult, AuditError> {
    let cap = config.max_html_bytes;
    let started = Instant::now();

    let transfer = async {
        let mut response = client.get(url.clone()).send().await?;
        let ttfb_ms = started.elapsed().as_millis() as u64;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let remaining = cap - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok::<_, reqwest::Error>((status, headers, body, ttfb_ms))
    };

    let (status, headers, mut body, ttfb_ms) =
        match tokio::time::timeout(config.request_timeout(), transfer).await {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) if e.is_timeout() => {
                return Err(AuditError::FetchTimeout {
                    timeout_ms: config.request_timeout_ms,
                })
            }
            Ok(Err(e)) => {
                return Err(AuditError::NetworkError {
                    url: url.to_string(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(AuditError::FetchTimeout {
                    timeout_ms: config.request_timeout_ms,
                })
            }
        };

    if body.len() == cap {
        truncate_partial_char(&mut body);
    }

    debug!(
        "Fetched {url}: status {status}, {} bytes retained, ttfb {ttfb_ms} ms",
        body.len()
    );

    let byte_length = body.len();
    Ok(FetchResult {
        status,
        headers,
        html: String::from_utf8_lossy(&body).into_owned(),
        byte_length,
        ttfb_ms,
    })
}

/// Drops an incomplete trailing UTF-8 sequence left when the cap splits a
/// multibyte character. Lossy conversion would otherwise replace the partial
/// prefix with U+FFFD (three bytes) and push the text past the cap.
fn truncate_partial_char(body: &mut Vec<u8>) {
    let Some(start) = body.iter().rposition(|&b| b & 0xC0 != 0x80) else {
        return;
    };
    let expected = match body[start] {
        b if b < 0x80 => 1,
        b if b & 0xE0 == 0xC0 => 2,
        b if b & 0xF0 == 0xE0 => 3,
        b if b & 0xF8 == 0xF0 => 4,
        // Invalid lead byte, not a truncation artifact.
        _ => return,
    };
    if start + expected > body.len() {
        body.truncate(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one connection with a canned response, optionally
    /// stalling forever after accepting.
    async fn serve_once(response: Option<Vec<u8>>) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                match response {
                    Some(bytes) => {
                        let _ = stream.write_all(&bytes).await;
                        let _ = stream.shutdown().await;
                    }
                    None => {
                        // Hold the connection open without responding.
                        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                    }
                }
            }
        });
        addr
    }

    fn http_response(header_lines: &str, body: &str) -> Vec<u8> {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}\r\n{}",
            body.len(),
            header_lines,
            body
        )
        .into_bytes()
    }

    fn test_config(timeout_ms: u64, cap: usize) -> AuditConfig {
        AuditConfig {
            request_timeout_ms: timeout_ms,
            max_html_bytes: cap,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_captures_status_headers_and_body() {
        let addr = serve_once(Some(http_response(
            "X-Frame-Options: DENY\r\n",
            "<html>ok</html>",
        )))
        .await;
        let url = normalize(&format!("http://{addr}/")).unwrap();
        let client = reqwest::Client::new();

        let result = fetch(&client, &url, &test_config(5_000, 1_000))
            .await
            .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.html, "<html>ok</html>");
        assert_eq!(result.byte_length, result.html.len());
        // Header names come back lowercased.
        assert_eq!(result.headers.get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn test_fetch_clamps_body_to_byte_cap() {
        let body = "a".repeat(500);
        let addr = serve_once(Some(http_response("", &body))).await;
        let url = normalize(&format!("http://{addr}/")).unwrap();
        let client = reqwest::Client::new();

        let result = fetch(&client, &url, &test_config(5_000, 64)).await.unwrap();
        assert_eq!(result.html.len(), 64);
        assert_eq!(result.byte_length, 64);
    }

    #[tokio::test]
    async fn test_fetch_cap_splitting_multibyte_char_stays_within_cap() {
        // Cap 4 lands inside the two-byte "é"; the dangling first byte must
        // be dropped, not widened into a replacement character.
        let addr = serve_once(Some(http_response("", "aaa\u{e9}"))).await;
        let url = normalize(&format!("http://{addr}/")).unwrap();
        let client = reqwest::Client::new();

        let result = fetch(&client, &url, &test_config(5_000, 4)).await.unwrap();
        assert_eq!(result.html, "aaa");
        assert_eq!(result.byte_length, 3);
        assert!(result.html.len() <= 4);
    }

    #[test]
    fn test_truncate_partial_char_drops_only_dangling_prefix() {
        let mut split = "a\u{e9}".as_bytes()[..2].to_vec();
        truncate_partial_char(&mut split);
        assert_eq!(split, b"a");

        let mut whole = "a\u{e9}".as_bytes().to_vec();
        truncate_partial_char(&mut whole);
        assert_eq!(whole, "a\u{e9}".as_bytes());

        // A four-byte scalar cut after three bytes.
        let mut emoji = "\u{1f600}".as_bytes()[..3].to_vec();
        truncate_partial_char(&mut emoji);
        assert!(emoji.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_times_out_when_server_stalls() {
        let addr = serve_once(None).await;
        let url = normalize(&format!("http://{addr}/")).unwrap();
        let client = reqwest::Client::new();

        let started = Instant::now();
        let result = fetch(&client, &url, &test_config(200, 1_000)).await;
        assert!(matches!(
            result,
            Err(AuditError::FetchTimeout { timeout_ms: 200 })
        ));
        assert!(started.elapsed().as_secs() < 5);
    }

    #[tokio::test]
    async fn test_fetch_maps_refused_connection_to_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = normalize(&format!("http://{addr}/")).unwrap();
        let client = reqwest::Client::new();
        let result = fetch(&client, &url, &test_config(2_000, 1_000)).await;
        assert!(matches!(result, Err(AuditError::NetworkError { .. })));
    }
}
