//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → path_guard.rs (safety → allow-list scope → hidden-file check)
//!     → Pass to the static-file responder, or uniform 403
//!
//! Every response:
//!     → headers.rs (fixed security header set)
//! ```
//!
//! # Design Decisions
//! - Fail closed: any failing check yields the same "Forbidden" response,
//!   never revealing which boundary was hit.
//! - All predicates are pure functions of their inputs; no shared state.

pub mod headers;
pub mod path_guard;
