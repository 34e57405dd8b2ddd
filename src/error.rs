//! Top-level error type for server startup and shutdown.
//!
//! Per-request denials (403/401/413) are not errors; they are responses.
//! Everything here is fatal at startup and maps to a non-zero exit code.

use thiserror::Error;

use crate::certs::CertError;
use crate::config::loader::ConfigError;
use crate::lifecycle::startup::StartupError;
use crate::net::tls::TlsError;

/// Fatal error raised while bringing the server up or tearing it down.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("certificate error: {0}")]
    Certificate(#[from] CertError),

    #[error("preflight check failed: {0}")]
    Startup(#[from] StartupError),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("invalid listen address {addr:?}: {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
