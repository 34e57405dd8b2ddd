//! OS signal handling.
//!
//! Translates SIGINT/SIGTERM into a single "shut down now" event. Signals
//! are the only input; everything downstream is message passing through
//! the shutdown coordinator.

use tokio::signal;

/// Resolve when an interrupt or termination signal arrives.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
