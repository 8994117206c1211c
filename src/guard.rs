//! Per-request failover guard for the consuming web layer.
//!
//! [`RequestGuard`] wraps a unit of work with two behaviors:
//!
//! 1. A throttled lazy check before the work runs: at most once per
//!    throttle window the active config is probed, and a failed probe
//!    triggers a resolution. A resulting switch is surfaced as a
//!    [`notice`](GuardedOutcome::notice) naming the new provider.
//! 2. Emergency failover: when the work fails with a
//!    connectivity-classified [`ResourceError`], one resolution is
//!    attempted and the work retried exactly once. Any other error
//!    propagates unchanged to the caller's normal error handling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::controller::FailoverController;
use crate::error::ResourceError;

pub struct RequestGuard {
    controller: Arc<FailoverController>,
    throttle: Duration,
}

/// Result of guarded work plus an optional user-visible notice about a
/// failover that happened on the way.
#[derive(Debug)]
pub struct GuardedOutcome<T> {
    pub value: T,
    pub notice: Option<String>,
}

impl RequestGuard {
    #[must_use]
    pub fn new(controller: Arc<FailoverController>, throttle: Duration) -> Self {
        Self {
            controller,
            throttle,
        }
    }

    /// Run a unit of work under the guard. The closure may be invoked
    /// twice: once normally and once more after a successful emergency
    /// failover.
    pub async fn run<T, F, Fut>(&self, work: F) -> Result<GuardedOutcome<T>, ResourceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ResourceError>>,
    {
        let mut notice = self.lazy_check().await;

        match work().await {
            Ok(value) => Ok(GuardedOutcome { value, notice }),
            Err(error) if error.is_connectivity() => {
                match self.controller.report_failure(&error).await {
                    Ok(Some(resolution)) => {
                        if let Some(ref from) = resolution.switched_from {
                            tracing::info!(
                                from = %from,
                                to = %resolution.provider_id,
                                "emergency failover, retrying request"
                            );
                            notice = Some(switch_notice(&resolution.provider_id));
                        }
                        // One retry, on whichever config is now active.
                        let value = work().await?;
                        Ok(GuardedOutcome { value, notice })
                    }
                    Ok(None) => Err(error),
                    Err(resolve_err) => {
                        tracing::error!(error = %resolve_err, "emergency failover failed");
                        Err(error)
                    }
                }
            }
            Err(error) => Err(error),
        }
    }

    /// Throttled pre-work check; returns a notice when it switched.
    async fn lazy_check(&self) -> Option<String> {
        match self.controller.check_active(self.throttle).await {
            Ok(Some(resolution)) if resolution.switched_from.is_some() => {
                Some(switch_notice(&resolution.provider_id))
            }
            Ok(_) => None,
            Err(e) => {
                // The work itself will surface the outage; nothing to do here.
                tracing::error!(error = %e, "lazy health check failed");
                None
            }
        }
    }
}

fn switch_notice(provider_id: &str) -> String {
    format!("switched to provider '{provider_id}' after a connectivity failure")
}
