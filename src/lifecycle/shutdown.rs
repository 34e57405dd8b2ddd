//! Shutdown coordination.
//!
//! Owns the server handle and the grace period. Triggering stops the
//! listener from accepting new connections and gives in-flight ones the
//! grace period to drain; connections still open after the deadline are
//! closed forcibly. The serve future resolves only once that completed.

use std::time::Duration;

use axum_server::Handle;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown of one server.
pub struct Shutdown {
    handle: Handle,
    grace: Duration,
}

impl Shutdown {
    /// Create a coordinator with the given drain grace period.
    pub fn new(grace: Duration) -> Self {
        Self {
            handle: Handle::new(),
            grace,
        }
    }

    /// The handle the server must be started with.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Begin graceful shutdown: stop accepting, drain, force after grace.
    pub fn trigger(&self) {
        tracing::info!(
            grace_secs = self.grace.as_secs(),
            "shutting down, draining in-flight connections"
        );
        self.handle.graceful_shutdown(Some(self.grace));
    }

    /// Block on the termination signal, then trigger the shutdown.
    pub async fn listen_for_signals(self) {
        signals::wait_for_signal().await;
        self.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_without_server_does_not_panic() {
        let shutdown = Shutdown::new(Duration::from_secs(1));
        let _server_handle = shutdown.handle();
        shutdown.trigger();
    }
}
