//! Local certificate authority subsystem.
//!
//! # Data Flow
//! ```text
//! `lanshare cert` (or first run)
//!     → authority.rs (issue CA + leaf in memory)
//!     → persist three PEM files (CA cert, server cert, server key)
//!     → net::tls loads server cert/key at startup
//!     → user installs the CA cert on their device once
//! ```
//!
//! # Design Decisions
//! - No external PKI and no network calls; trust is established by the
//!   user installing the CA certificate manually.
//! - The CA private key is used once to sign the leaf and never persisted.
//! - Existing certificates are reused unless regeneration is forced.

pub mod authority;

pub use authority::{generate, CertError, CertPaths, GenerateOutcome};
