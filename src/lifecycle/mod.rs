//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Check cert files → Probe bind address → Load TLS → Start listener
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGINT/SIGTERM → stop accepting → drain within grace period
//!     → forced close after deadline → serve future resolves → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any preflight error is fatal before the listener exists.
//! - The signal task owns "stop and drain"; the serve loop owns "accept";
//!   they coordinate through the server handle, never ad-hoc flags.
//! - The process exits only after the drain (or forced close) completed.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
