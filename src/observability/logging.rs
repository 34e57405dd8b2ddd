//! Structured logging initialization.
//!
//! Uses `tracing` throughout; level configurable via `RUST_LOG`. Quiet
//! mode is handled at the access-log middleware, not here, so errors are
//! never suppressed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. Call once, before anything logs.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lanshare=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
