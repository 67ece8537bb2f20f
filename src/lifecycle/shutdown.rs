//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or on the broadcast, whichever comes first.
pub async fn wait_for_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
            tracing::info!("Shutdown signal received");
        }
        _ = shutdown.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}
