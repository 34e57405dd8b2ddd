//! Fixed security response headers.
//!
//! Applied to every response, including guard denials and auth challenges.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

const CSP: &str = "default-src 'self'; font-src 'self' data:; img-src 'self' data:; \
                   style-src 'self' 'unsafe-inline'; script-src 'self';";

/// Insert the fixed header set, overriding anything already present.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains; preload"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );
}
