//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! PEM files on disk
//!     → tls.rs (parse, build restrictive rustls ServerConfig)
//!     → axum-server RustlsConfig
//!     → TLS handshake per connection
//! ```
//!
//! # Design Decisions
//! - Minimum protocol version TLS 1.2; ECDHE + AEAD suites only.
//! - Server-only authentication: no client certificates requested.

pub mod tls;
