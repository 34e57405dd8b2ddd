//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (or TOML file)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerOptions (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Options are immutable once constructed; no component reads ambient
//!   global state.
//! - All fields have defaults so a bare `lanshare` invocation works.
//! - Zero/unset timeouts and limits mean "use default", resolved once at
//!   startup, not at each use site.
//! - Validation separates syntactic (serde) from semantic checks and
//!   returns every violation, not just the first.

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ServerOptions;
