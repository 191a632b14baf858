//! Background expiry sweep for the in-memory store

use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::memory_store::MemoryOtpStore;

/// Shortest period the sweep runs at; a zero interval is raised to this
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running sweep task
pub struct ExpirySweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExpirySweeper {
    /// Spawn a task calling `cleanup_expired` every `interval`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(store: Weak<MemoryOtpStore>, interval: Duration) -> Self {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                "OTP expiry sweeper started"
            );

            let mut interval_timer = tokio::time::interval(interval);
            // The first tick completes immediately; nothing can have expired yet.
            interval_timer.tick().await;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let Some(store) = store.upgrade() else {
                            break;
                        };
                        if let Err(e) = store.cleanup_expired() {
                            warn!(error = %e, "OTP expiry sweep failed");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("OTP expiry sweeper stopped");
        });

        Self { shutdown, handle }
    }

    /// Signal the task to stop and wait for it
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "OTP expiry sweeper ended abnormally");
        }
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
