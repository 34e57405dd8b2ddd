//! HTTPS server setup and lifecycle.
//!
//! # Responsibilities
//! - Build the Axum router with the fixed middleware pipeline
//! - Run preflight checks, load the TLS policy, bind the listener
//! - Wire the shutdown coordinator to the signal task
//!
//! The lifecycle is Idle → PreflightChecked → Listening → ShuttingDown →
//! Stopped; `run` walks the whole chain, `serve` starts at Listening (used
//! by tests that drive shutdown themselves).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use hyper_util::rt::TokioTimer;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerOptions;
use crate::error::ServeError;
use crate::http::files::{serve_files, AppState};
use crate::http::middleware::{access_log, basic_auth, body_limit, security_headers, AuthState};
use crate::lifecycle::{startup::preflight, Shutdown};
use crate::net::tls::load_tls_config;

/// HTTPS static-file server.
pub struct HttpServer {
    router: Router,
    options: Arc<ServerOptions>,
}

impl HttpServer {
    /// Build the server and its request pipeline from validated options.
    pub fn new(options: ServerOptions) -> Self {
        let router = build_router(&options);
        Self {
            router,
            options: Arc::new(options),
        }
    }

    /// Full lifecycle: preflight, TLS load, signal task, serve until the
    /// drain after a termination signal has completed.
    pub async fn run(self) -> Result<(), ServeError> {
        preflight(&self.options)?;

        let tls = load_tls_config(&self.options.cert_path, &self.options.key_path)?;

        let shutdown = Shutdown::new(self.options.grace_period());
        let handle = shutdown.handle();
        tokio::spawn(shutdown.listen_for_signals());

        self.serve(tls, handle).await
    }

    /// Start listening; resolves once shutdown (graceful or forced) has
    /// completed.
    pub async fn serve(self, tls: RustlsConfig, handle: Handle) -> Result<(), ServeError> {
        let addr: SocketAddr = self.options.addr.parse().map_err(|source| ServeError::Address {
            addr: self.options.addr.clone(),
            source,
        })?;

        banner(&self.options, addr);

        let mut server = axum_server::bind_rustls(addr, tls);
        server
            .http_builder()
            .http1()
            .timer(TokioTimer::new())
            // Bounds both the initial header read and idle keep-alive wait.
            .header_read_timeout(self.options.read_timeout().min(self.options.idle_timeout()))
            .max_buf_size(self.options.max_header_bytes());

        server
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

/// Explicit pipeline construction. Outermost to innermost:
/// access log → security headers → request timeout → body-size limit
/// → optional basic auth → gzip → PathGuard-gated file responder.
fn build_router(options: &ServerOptions) -> Router {
    let state = AppState::new(options);
    let mut router = Router::new().fallback(serve_files).with_state(state);

    // Layers added later wrap the ones added earlier, so this list reads
    // innermost-first.
    router = router.layer(CompressionLayer::new());

    if let Some(auth) = &options.auth {
        router = router.layer(middleware::from_fn_with_state(
            AuthState::from(auth),
            basic_auth,
        ));
    }

    router
        .layer(RequestBodyLimitLayer::new(options.max_body_bytes() as usize))
        .layer(middleware::from_fn_with_state(
            options.max_body_bytes(),
            body_limit,
        ))
        .layer(TimeoutLayer::new(options.write_timeout()))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn_with_state(options.quiet, access_log))
}

fn banner(options: &ServerOptions, addr: SocketAddr) {
    if options.quiet {
        return;
    }

    tracing::info!(
        address = %addr,
        root = %options.root.display(),
        "lanshare listening; open https://localhost:{} in a browser",
        addr.port()
    );
    if !options.allow.is_empty() {
        tracing::info!(paths = ?options.allow, "sharing restricted to allow-list");
    }
    tracing::info!(
        read_timeout_secs = options.read_timeout().as_secs(),
        write_timeout_secs = options.write_timeout().as_secs(),
        idle_timeout_secs = options.idle_timeout().as_secs(),
        max_header_bytes = options.max_header_bytes(),
        max_body_bytes = options.max_body_bytes(),
        "limits"
    );
    if let Some(auth) = &options.auth {
        tracing::info!(user = %auth.username, "basic authentication enabled");
    }
}
