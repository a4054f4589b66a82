//! Time-scoped HMAC signing of recognizer connection URLs.
//!
//! The recognizer authenticates WebSocket connections through query
//! parameters: an HMAC-SHA256 signature over a canonical request string
//! (host, HTTP date, request line), wrapped in a base64-encoded
//! authorization header value. Signatures are valid only around the signing
//! instant, so every connection attempt is signed fresh and never cached.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Query-value encode set: RFC 3986 unreserved characters pass through,
/// everything else is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Recognizer credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Application identifier, sent in every frame header.
    pub app_id: String,
    /// API key, embedded in the authorization header value.
    pub api_key: String,
    /// API secret, used as the HMAC signing key.
    pub api_secret: String,
}

/// A fully signed connection URI.
///
/// Created fresh per transcription attempt; the embedded signature covers
/// the date header and expires quickly, so endpoints are never reused.
#[derive(Debug, Clone)]
pub struct SignedEndpoint {
    /// Complete `wss://` URL with `authorization`, `date`, and `host`
    /// query parameters.
    pub url: String,
}

/// Build a signed WebSocket URL for one connection attempt.
pub fn signed_endpoint(
    credentials: &Credentials,
    host: &str,
    path: &str,
    now: DateTime<Utc>,
) -> SignedEndpoint {
    let date = http_date(now);
    let signature = sign(&credentials.api_secret, host, path, &date);
    let authorization = BASE64.encode(authorization_header(&credentials.api_key, &signature));

    let url = format!(
        "wss://{host}{path}?authorization={}&date={}&host={}",
        utf8_percent_encode(&authorization, QUERY_VALUE),
        utf8_percent_encode(&date, QUERY_VALUE),
        utf8_percent_encode(host, QUERY_VALUE),
    );

    SignedEndpoint { url }
}

/// Format an instant as an HTTP date (RFC 1123, GMT).
fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// HMAC-SHA256 over the canonical request string, base64-encoded.
fn sign(api_secret: &str, host: &str, path: &str, date: &str) -> String {
    let canonical = format!("host: {host}\ndate: {date}\nGET {path} HTTP/1.1");
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(canonical.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

fn authorization_header(api_key: &str, signature: &str) -> String {
    format!(
        r#"api_key="{api_key}", algorithm="hmac-sha256", headers="host date request-line", signature="{signature}""#
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "iat.xf-yun.com";
    const PATH: &str = "/v1";

    fn fixed_now() -> DateTime<Utc> {
        "2006-01-02T15:04:05Z".parse().unwrap()
    }

    fn credentials() -> Credentials {
        Credentials {
            app_id: "app-1".to_string(),
            api_key: "key-abc".to_string(),
            api_secret: "secretkey123".to_string(),
        }
    }

    #[test]
    fn http_date_is_rfc1123_gmt() {
        assert_eq!(http_date(fixed_now()), "Mon, 02 Jan 2006 15:04:05 GMT");
    }

    #[test]
    fn signature_matches_known_vector() {
        // Computed independently: HMAC-SHA256(secretkey123,
        //   "host: iat.xf-yun.com\ndate: Mon, 02 Jan 2006 15:04:05 GMT\nGET /v1 HTTP/1.1")
        let sig = sign(
            "secretkey123",
            HOST,
            PATH,
            "Mon, 02 Jan 2006 15:04:05 GMT",
        );
        assert_eq!(sig, "M/e+oZ6wCkjwZ7HOSearnY2s0LiN4mmf3e2WQt7nvY4=");
    }

    #[test]
    fn authorization_wraps_key_algorithm_and_signature() {
        let auth = authorization_header("key-abc", "SIG=");
        assert_eq!(
            auth,
            r#"api_key="key-abc", algorithm="hmac-sha256", headers="host date request-line", signature="SIG=""#
        );
    }

    #[test]
    fn endpoint_is_deterministic_for_fixed_instant() {
        let a = signed_endpoint(&credentials(), HOST, PATH, fixed_now());
        let b = signed_endpoint(&credentials(), HOST, PATH, fixed_now());
        assert_eq!(a.url, b.url);
    }

    #[test]
    fn endpoint_changes_with_the_instant() {
        let a = signed_endpoint(&credentials(), HOST, PATH, fixed_now());
        let later = "2006-01-02T15:04:06Z".parse().unwrap();
        let b = signed_endpoint(&credentials(), HOST, PATH, later);
        assert_ne!(a.url, b.url);
    }

    #[test]
    fn endpoint_carries_all_three_query_parameters() {
        let endpoint = signed_endpoint(&credentials(), HOST, PATH, fixed_now());
        assert!(endpoint.url.starts_with("wss://iat.xf-yun.com/v1?authorization="));
        assert!(endpoint.url.contains("&date=Mon%2C%2002%20Jan%202006%2015%3A04%3A05%20GMT"));
        assert!(endpoint.url.ends_with("&host=iat.xf-yun.com"));
    }

    #[test]
    fn unreserved_characters_survive_query_encoding() {
        // Dots and dashes in the host must not be escaped; reserved
        // characters in the base64 authorization value still are.
        let endpoint = signed_endpoint(&credentials(), HOST, PATH, fixed_now());
        assert!(endpoint.url.ends_with("&host=iat.xf-yun.com"));
        assert!(!endpoint.url.contains("%2E"));
        assert!(!endpoint.url.contains("%2D"));
        // The known-vector signature contains `/` and `=`.
        assert!(endpoint.url.contains("%2F") || endpoint.url.contains("%3D"));
    }

    #[test]
    fn authorization_parameter_decodes_to_known_header() {
        let endpoint = signed_endpoint(&credentials(), HOST, PATH, fixed_now());
        let expected = BASE64.encode(authorization_header(
            "key-abc",
            "M/e+oZ6wCkjwZ7HOSearnY2s0LiN4mmf3e2WQt7nvY4=",
        ));
        let encoded = utf8_percent_encode(&expected, QUERY_VALUE).to_string();
        assert!(endpoint.url.contains(&encoded));
    }
}
