//! Signal handling for graceful shutdown (SIGTERM/SIGINT).
//!
//! The model registry is immutable after load, so unlike the teacher crate
//! this carries no SIGHUP reload path.

use tokio::sync::watch;

/// Listens for OS signals and flips a `watch` channel to `true` on shutdown.
pub struct SignalHandler {
    shutdown_tx: watch::Sender<bool>,
}

impl SignalHandler {
    /// Create a new signal handler and a receiver that becomes `true` on shutdown.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { shutdown_tx: tx }, rx)
    }

    /// Run the signal loop. Blocks until a shutdown signal is received.
    pub async fn run(self) {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT, initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        let _ = self.shutdown_tx.send(true);
    }
}
