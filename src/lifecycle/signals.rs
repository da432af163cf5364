//! OS signal handling.
//!
//! Ctrl-C (SIGINT) triggers shutdown of the accept loop.

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers `shutdown` on the first Ctrl-C.
pub fn spawn_interrupt_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
        }
    })
}
