//! Cross-cutting request middleware stages.
//!
//! Each stage is a plain async function wired into the pipeline by
//! `server::build_router`, which owns the ordering. Stages never share
//! mutable state; everything they need arrives through their state value.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use subtle::ConstantTimeEq;

use crate::config::schema::BasicAuthConfig;
use crate::security::headers::apply_security_headers;

/// Reject requests whose declared body size exceeds the limit before any
/// other work happens. Streaming bodies are additionally capped by the
/// request-body-limit layer installed next to this stage.
pub async fn body_limit(
    State(max_bytes): State<u64>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if matches!(declared, Some(len) if len > max_bytes) {
        return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
    }

    next.run(request).await
}

/// Credentials for the basic-auth gate.
#[derive(Clone)]
pub struct AuthState {
    username: Arc<str>,
    password: Arc<str>,
    realm: Arc<str>,
}

impl From<&BasicAuthConfig> for AuthState {
    fn from(config: &BasicAuthConfig) -> Self {
        Self {
            username: config.username.as_str().into(),
            password: config.password.as_str().into(),
            realm: config.realm.as_str().into(),
        }
    }
}

/// Basic-authentication gate. Only installed when credentials are
/// configured; comparison is constant-time to avoid timing side channels.
pub async fn basic_auth(
    State(auth): State<AuthState>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authenticated = credentials
        .as_ref()
        .map(|TypedHeader(Authorization(basic))| {
            credentials_match(&auth, basic.username(), basic.password())
        })
        .unwrap_or(false);

    if authenticated {
        next.run(request).await
    } else {
        challenge(&auth.realm)
    }
}

fn credentials_match(auth: &AuthState, username: &str, password: &str) -> bool {
    let user_ok = username.as_bytes().ct_eq(auth.username.as_bytes());
    let pass_ok = password.as_bytes().ct_eq(auth.password.as_bytes());
    bool::from(user_ok & pass_ok)
}

fn challenge(realm: &str) -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, value);
    }
    response
}

/// Set the fixed security header set on every response, whatever its
/// status.
pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut());
    response
}

/// One structured access-log line per request, unless running quiet.
pub async fn access_log(
    State(quiet): State<bool>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    if !quiet {
        tracing::info!(
            target: "lanshare::access",
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "request"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::util::ServiceExt;

    fn auth_state() -> AuthState {
        AuthState::from(&BasicAuthConfig {
            username: "alice".into(),
            password: "wonder".into(),
            realm: "lanshare".into(),
        })
    }

    async fn ok() -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn oversized_declared_body_is_rejected_early() {
        let app = Router::new()
            .route("/", get(ok).post(ok))
            .layer(middleware::from_fn_with_state(16u64, body_limit));

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_LENGTH, "1024")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_LENGTH, "8")
            .body(Body::from("12345678"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_credentials_get_a_challenge() {
        let app = Router::new()
            .route("/", get(ok))
            .layer(middleware::from_fn_with_state(auth_state(), basic_auth));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"lanshare\""
        );
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected_correct_accepted() {
        let app = Router::new()
            .route("/", get(ok))
            .layer(middleware::from_fn_with_state(auth_state(), basic_auth));

        // alice:nope
        let request = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, "Basic YWxpY2U6bm9wZQ==")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // alice:wonder
        let request = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, "Basic YWxpY2U6d29uZGVy")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn security_headers_apply_to_denials_too() {
        let app = Router::new()
            .route("/", get(ok))
            .layer(middleware::from_fn_with_state(auth_state(), basic_auth))
            .layer(middleware::from_fn(security_headers));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }
}
