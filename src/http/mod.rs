//! HTTP layer subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection
//!     → middleware.rs (access log → security headers → body limit
//!       → optional basic auth → gzip)
//!     → files.rs (PathGuard decision → ServeDir / directory listing)
//! ```
//!
//! # Design Decisions
//! - Middleware order is an explicit construction step in server.rs, not
//!   an accident of nesting.
//! - Guard denials, failed auth and oversized bodies are responses, never
//!   errors; only startup can fail the process.

pub mod files;
pub mod middleware;
pub mod server;

pub use server::HttpServer;
