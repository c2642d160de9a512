//! Security header analysis.
//!
//! Evaluates the fetched response headers against a fixed checklist of
//! protective headers. The TLS probe result is merged into the returned
//! findings by the pipeline once the independent probe completes.

use std::collections::{BTreeMap, HashMap};

use crate::config::SECURITY_HEADERS;
use crate::models::{clamp_score, SecurityFindings, TlsInfo};

/// Protective headers whose absence is reported as an issue. Discriminants
/// index into [`SECURITY_HEADERS`], which owns the header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderCheck {
    /// Strict-Transport-Security (HSTS)
    Hsts = 0,
    /// Content-Security-Policy
    Csp = 1,
    /// X-Content-Type-Options
    ContentTypeOptions = 2,
    /// X-Frame-Options, or a CSP `frame-ancestors` directive as substitute
    FrameOptions = 3,
    /// Referrer-Policy
    ReferrerPolicy = 4,
    /// Permissions-Policy
    PermissionsPolicy = 5,
}

impl HeaderCheck {
    /// Checklist order matches the report order.
    const ALL: [HeaderCheck; 6] = [
        HeaderCheck::Hsts,
        HeaderCheck::Csp,
        HeaderCheck::ContentTypeOptions,
        HeaderCheck::FrameOptions,
        HeaderCheck::ReferrerPolicy,
        HeaderCheck::PermissionsPolicy,
    ];

    fn issue(&self) -> &'static str {
        match self {
            HeaderCheck::Hsts => "Missing Strict-Transport-Security header",
            HeaderCheck::Csp => "Missing Content-Security-Policy header",
            HeaderCheck::ContentTypeOptions => "Missing X-Content-Type-Options header",
            HeaderCheck::FrameOptions => "Missing X-Frame-Options or CSP frame-ancestors",
            HeaderCheck::ReferrerPolicy => "Missing Referrer-Policy",
            HeaderCheck::PermissionsPolicy => "Missing Permissions-Policy",
        }
    }

    fn recommendation(&self) -> &'static str {
        match self {
            HeaderCheck::Hsts => "Enable HSTS with a suitable max-age and includeSubDomains.",
            HeaderCheck::Csp => "Add a CSP to mitigate XSS and data injection attacks.",
            HeaderCheck::ContentTypeOptions => "Set X-Content-Type-Options: nosniff.",
            HeaderCheck::FrameOptions => {
                "Prevent clickjacking with X-Frame-Options or CSP frame-ancestors."
            }
            HeaderCheck::ReferrerPolicy => {
                "Set Referrer-Policy: no-referrer-when-downgrade or stricter."
            }
            HeaderCheck::PermissionsPolicy => "Restrict powerful APIs with Permissions-Policy.",
        }
    }

    /// Lowercased response header that satisfies this check.
    fn header_name(&self) -> &'static str {
        SECURITY_HEADERS[*self as usize]
    }

    /// Whether the headers satisfy this check. Keys must be lowercased.
    fn satisfied_by(&self, headers: &HashMap<String, String>) -> bool {
        if headers.contains_key(self.header_name()) {
            return true;
        }
        // A CSP frame-ancestors directive substitutes for X-Frame-Options.
        *self == HeaderCheck::FrameOptions
            && headers
                .get(HeaderCheck::Csp.header_name())
                .map(|csp| csp.contains("frame-ancestors"))
                .unwrap_or(false)
    }
}

/// Runs the protective-header checklist over the fetched response headers.
///
/// Header keys are expected lowercased, as produced by the fetcher. The
/// returned findings carry a placeholder [`TlsInfo`]; the pipeline replaces it
/// with the real probe result.
pub fn analyze_security(headers: &HashMap<String, String>, scheme: &str) -> SecurityFindings {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    for check in HeaderCheck::ALL {
        if !check.satisfied_by(headers) {
            issues.push(check.issue().to_string());
            recommendations.push(check.recommendation().to_string());
        }
    }

    let score = clamp_score(100 - 10 * issues.len() as i64);

    SecurityFindings {
        headers: headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
        issues,
        recommendations,
        score,
        ssl: TlsInfo::not_secure(scheme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_all_headers_present_scores_100() {
        let headers = headers_from(&[
            ("strict-transport-security", "max-age=31536000"),
            ("content-security-policy", "default-src 'self'"),
            ("x-content-type-options", "nosniff"),
            ("x-frame-options", "DENY"),
            ("referrer-policy", "no-referrer"),
            ("permissions-policy", "camera=()"),
        ]);
        let findings = analyze_security(&headers, "https");
        assert!(findings.issues.is_empty());
        assert_eq!(findings.score, 100);
    }

    #[test]
    fn test_no_headers_scores_40() {
        let findings = analyze_security(&HashMap::new(), "https");
        assert_eq!(findings.issues.len(), 6);
        assert_eq!(findings.recommendations.len(), 6);
        assert_eq!(findings.score, 40);
    }

    #[test]
    fn test_csp_frame_ancestors_substitutes_for_frame_options() {
        let headers = headers_from(&[(
            "content-security-policy",
            "default-src 'self'; frame-ancestors 'none'",
        )]);
        let findings = analyze_security(&headers, "https");
        assert!(!findings
            .issues
            .iter()
            .any(|i| i.contains("X-Frame-Options")));
    }

    #[test]
    fn test_checklist_tracks_the_shared_header_list() {
        for (check, name) in HeaderCheck::ALL.iter().zip(SECURITY_HEADERS) {
            let headers = headers_from(&[(name, "set")]);
            assert!(check.satisfied_by(&headers), "{name} should satisfy its check");
        }
    }

    #[test]
    fn test_issues_follow_checklist_order() {
        let findings = analyze_security(&HashMap::new(), "https");
        assert_eq!(findings.issues[0], "Missing Strict-Transport-Security header");
        assert_eq!(findings.issues[5], "Missing Permissions-Policy");
    }

    #[test]
    fn test_score_monotonically_decreases_with_missing_headers() {
        let mut headers = headers_from(&[
            ("strict-transport-security", "max-age=31536000"),
            ("content-security-policy", "default-src 'self'"),
            ("x-content-type-options", "nosniff"),
            ("x-frame-options", "DENY"),
            ("referrer-policy", "no-referrer"),
            ("permissions-policy", "camera=()"),
        ]);
        let mut last = analyze_security(&headers, "https").score;
        for name in [
            "permissions-policy",
            "referrer-policy",
            "x-content-type-options",
        ] {
            headers.remove(name);
            let score = analyze_security(&headers, "https").score;
            assert!(score < last);
            last = score;
        }
    }

    #[test]
    fn test_report_headers_are_preserved() {
        let headers = headers_from(&[("x-frame-options", "SAMEORIGIN")]);
        let findings = analyze_security(&headers, "https");
        assert_eq!(
            findings.headers.get("x-frame-options").map(String::as_str),
            Some("SAMEORIGIN")
        );
    }
}
