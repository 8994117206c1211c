//! Background health monitoring.
//!
//! A single [`HealthMonitor`] task runs per process lifetime: sleep
//! for the configured interval, then resolve unconditionally to
//! re-validate the active provider and opportunistically detect
//! recovery of a previously unhealthy one. Failures inside the loop
//! are logged and swallowed; the loop never terminates on a transient
//! error, only on the shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::controller::FailoverController;

pub struct HealthMonitor {
    controller: Arc<FailoverController>,
    interval: Duration,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(controller: Arc<FailoverController>, interval: Duration) -> Self {
        Self {
            controller,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "health monitor starting"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    tracing::debug!("health monitor shutting down");
                    return;
                }
            }

            match self.controller.resolve().await {
                Ok(resolution) if resolution.changed() => {
                    tracing::info!(
                        provider = %resolution.provider_id,
                        switched_from = ?resolution.switched_from,
                        rotated = resolution.rotated,
                        "monitor tick changed active configuration"
                    );
                }
                Ok(resolution) => {
                    tracing::debug!(
                        provider = %resolution.provider_id,
                        "monitor tick revalidated active provider"
                    );
                }
                Err(e) => {
                    // Keep serving the last-known config; the next tick retries.
                    tracing::error!(error = %e, "monitor resolution failed, keeping current configuration");
                }
            }
        }
    }
}
