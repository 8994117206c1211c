//! The failover controller: resolution, validation, and switch-over.
//!
//! [`FailoverController`] owns the active configuration and the
//! provider registry. It is constructed once at the composition root
//! and passed by `Arc` to everything that needs it; there is no
//! ambient global. `resolve()` walks the candidate providers in
//! environment-then-priority order, installs the first one whose fetch
//! and probe both pass, and notifies registered dependents when the
//! active provider (or its payload) changes.
//!
//! # Concurrency discipline
//!
//! `resolve()` and the switch it performs run under a single
//! mutual-exclusion lock; at most one resolution is in flight at any
//! time. Callers that arrive while one is running wait for it and then
//! adopt its result instead of duplicating fetches. The active config
//! is published with a single write-lock swap, so readers observe
//! either the old or the new fully-formed config, never a mix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex, RwLock};

use crate::error::{HandoverError, ResourceError};
use crate::probe::{ConnectivityProbe, ProbeOutcome};
use crate::provider::{ProviderConfig, SecretSource};
use crate::registry::{ProviderRegistry, ProviderState};
use crate::resources::SwitchSubscriber;

/// One declared provider: its id plus the secret source serving it.
pub struct ProviderSlot {
    pub id: String,
    pub source: Box<dyn SecretSource>,
}

#[derive(Debug)]
struct ActiveConfig {
    config: Arc<ProviderConfig>,
    switched_at: Instant,
}

/// Published whenever a new config is installed. `from` is `None` on
/// the initial install; `rotated` marks a same-provider payload change.
#[derive(Debug, Clone)]
pub struct SwitchEvent {
    pub from: Option<String>,
    pub to: String,
    pub rotated: bool,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub provider_id: String,
    /// Previous provider when this resolution switched providers.
    pub switched_from: Option<String>,
    /// Same provider, new payload (rotated secret).
    pub rotated: bool,
}

impl Resolution {
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.switched_from.is_some() || self.rotated
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// Upper bound on any single secret fetch, so the resolve lock is
    /// never held indefinitely by a hung store.
    pub fetch_timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub struct ResolveStats {
    pub resolutions: AtomicU64,
    pub failovers: AtomicU64,
    pub emergency_failovers: AtomicU64,
}

impl ResolveStats {
    const fn new() -> Self {
        Self {
            resolutions: AtomicU64::new(0),
            failovers: AtomicU64::new(0),
            emergency_failovers: AtomicU64::new(0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub resolutions: u64,
    pub failovers: u64,
    pub emergency_failovers: u64,
}

/// Read-only diagnostics row for one provider.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub id: String,
    pub disabled: bool,
    pub state: ProviderState,
    pub last_checked_ago: Option<Duration>,
    pub last_error: Option<String>,
}

/// Read-only snapshot of controller state, no side effects.
#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub current_provider: Option<String>,
    pub active_version: Option<String>,
    pub switched_ago: Option<Duration>,
    pub last_health_check_ago: Option<Duration>,
    pub providers: Vec<ProviderStatus>,
    pub stats: StatsSnapshot,
}

impl ControllerSnapshot {
    /// Overall condition: `active` when the roster is fully healthy,
    /// `degraded` when serving with an unhealthy alternate,
    /// `unavailable` before the first successful resolution.
    #[must_use]
    pub fn health(&self) -> &'static str {
        if self.current_provider.is_none() {
            "unavailable"
        } else if self
            .providers
            .iter()
            .any(|p| !p.disabled && p.state == ProviderState::Unhealthy)
        {
            "degraded"
        } else {
            "active"
        }
    }
}

pub struct FailoverController {
    slots: Vec<ProviderSlot>,
    probe: Box<dyn ConnectivityProbe>,
    registry: RwLock<ProviderRegistry>,
    active: RwLock<Option<ActiveConfig>>,
    last_check: std::sync::Mutex<Option<Instant>>,
    // Generation of the last completed resolution, guarded by the
    // resolve lock; the atomic mirror lets waiters detect completion.
    resolve_lock: Mutex<u64>,
    generation: AtomicU64,
    subscribers: RwLock<Vec<Arc<dyn SwitchSubscriber>>>,
    switch_tx: watch::Sender<Option<SwitchEvent>>,
    fetch_timeout: Duration,
    stats: ResolveStats,
}

impl FailoverController {
    #[must_use]
    pub fn new(
        slots: Vec<ProviderSlot>,
        probe: Box<dyn ConnectivityProbe>,
        registry: ProviderRegistry,
        settings: ControllerSettings,
    ) -> Self {
        let (switch_tx, _) = watch::channel(None);
        Self {
            slots,
            probe,
            registry: RwLock::new(registry),
            active: RwLock::new(None),
            last_check: std::sync::Mutex::new(None),
            resolve_lock: Mutex::new(0),
            generation: AtomicU64::new(0),
            subscribers: RwLock::new(Vec::new()),
            switch_tx,
            fetch_timeout: settings.fetch_timeout,
            stats: ResolveStats::new(),
        }
    }

    /// Register a dependent whose handle must be rebuilt on switch.
    pub async fn register_subscriber(&self, subscriber: Arc<dyn SwitchSubscriber>) {
        self.subscribers.write().await.push(subscriber);
    }

    /// Subscribe to switch notifications.
    #[must_use]
    pub fn switch_events(&self) -> watch::Receiver<Option<SwitchEvent>> {
        self.switch_tx.subscribe()
    }

    /// The config presently in use (cheap refcount bump), or `None`
    /// before the first successful resolution.
    pub async fn active_config(&self) -> Option<Arc<ProviderConfig>> {
        self.active.read().await.as_ref().map(|a| Arc::clone(&a.config))
    }

    pub async fn current_provider(&self) -> Option<String> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| a.config.provider_id.clone())
    }

    /// Resolve the active configuration: try candidates in
    /// environment-then-priority order and install the first usable
    /// one. Serialized: concurrent callers collapse into a single
    /// fetch+probe cycle and adopt its result.
    pub async fn resolve(&self) -> Result<Resolution, HandoverError> {
        let observed = self.generation.load(Ordering::Acquire);
        let mut completed = self.resolve_lock.lock().await;

        if *completed != observed {
            // A resolution finished while we waited for the lock.
            return self.adopt_current().await;
        }

        let result = self.resolve_locked().await;
        *completed += 1;
        self.generation.store(*completed, Ordering::Release);
        result
    }

    /// Throttled lazy check used on the request path: probe the active
    /// config at most once per throttle window, resolving on failure.
    /// Returns `Some` when a resolution was attempted.
    pub async fn check_active(
        &self,
        throttle: Duration,
    ) -> Result<Option<Resolution>, HandoverError> {
        {
            let mut last = self
                .last_check
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(at) = *last {
                if at.elapsed() < throttle {
                    return Ok(None);
                }
            }
            *last = Some(Instant::now());
        }

        let Some(config) = self.active_config().await else {
            return self.resolve().await.map(Some);
        };

        match self.probe.check(&config).await {
            ProbeOutcome::Pass => Ok(None),
            ProbeOutcome::Fail { target, reason } => {
                tracing::warn!(
                    provider = %config.provider_id,
                    target = %target,
                    reason = %reason,
                    "active provider failed lazy check, attempting failover"
                );
                self.resolve().await.map(Some)
            }
        }
    }

    /// Entry point for dependents reporting a failed resource call.
    /// Connectivity-flavored failures trigger one emergency
    /// resolution; anything else is left to the caller's own error
    /// handling. Returns `Some` when a resolution was attempted.
    pub async fn report_failure(
        &self,
        error: &ResourceError,
    ) -> Result<Option<Resolution>, HandoverError> {
        if !error.is_connectivity() {
            return Ok(None);
        }

        self.stats.emergency_failovers.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(error = %error, "resource failure reported, attempting emergency failover");
        self.resolve().await.map(Some)
    }

    /// Read-only snapshot for the diagnostics surface.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        let (current_provider, active_version, switched_ago) = {
            let active = self.active.read().await;
            active.as_ref().map_or((None, None, None), |a| {
                (
                    Some(a.config.provider_id.clone()),
                    Some(a.config.version.short().to_string()),
                    Some(a.switched_at.elapsed()),
                )
            })
        };

        let last_health_check_ago = self
            .last_check
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .map(|at| at.elapsed());

        let providers = self
            .registry
            .read()
            .await
            .snapshot()
            .into_iter()
            .map(|(id, disabled, availability)| ProviderStatus {
                id,
                disabled,
                state: availability.state,
                last_checked_ago: availability.last_checked_at.map(|at| at.elapsed()),
                last_error: availability.last_error,
            })
            .collect();

        ControllerSnapshot {
            current_provider,
            active_version,
            switched_ago,
            last_health_check_ago,
            providers,
            stats: StatsSnapshot {
                resolutions: self.stats.resolutions.load(Ordering::Relaxed),
                failovers: self.stats.failovers.load(Ordering::Relaxed),
                emergency_failovers: self.stats.emergency_failovers.load(Ordering::Relaxed),
            },
        }
    }

    async fn resolve_locked(&self) -> Result<Resolution, HandoverError> {
        let resolution_id = uuid::Uuid::new_v4();
        self.stats.resolutions.fetch_add(1, Ordering::Relaxed);
        self.touch_last_check();

        let order = self.candidate_order().await;
        tracing::debug!(
            resolution = %resolution_id,
            order = ?order,
            "resolution started"
        );

        let mut attempted = Vec::new();

        for id in order {
            let Some(slot) = self.slots.iter().find(|s| s.id == id) else {
                continue;
            };
            attempted.push(id.clone());

            let config = match tokio::time::timeout(self.fetch_timeout, slot.source.fetch()).await
            {
                Ok(Ok(config)) => config,
                Ok(Err(e)) => {
                    self.registry
                        .write()
                        .await
                        .mark_unhealthy(&id, &e.to_string());
                    continue;
                }
                Err(_) => {
                    let reason = format!(
                        "secret fetch timed out after {}s",
                        self.fetch_timeout.as_secs()
                    );
                    self.registry.write().await.mark_unhealthy(&id, &reason);
                    continue;
                }
            };

            match self.probe.check(&config).await {
                ProbeOutcome::Pass => {}
                ProbeOutcome::Fail { target, reason } => {
                    let err = HandoverError::ProbeFailed {
                        provider: id.clone(),
                        target,
                        reason,
                    };
                    self.registry
                        .write()
                        .await
                        .mark_unhealthy(&id, &err.to_string());
                    continue;
                }
            }

            match self.install(config).await {
                Ok(resolution) => {
                    self.registry.write().await.mark_healthy(&id);
                    if resolution.switched_from.is_some() {
                        self.stats.failovers.fetch_add(1, Ordering::Relaxed);
                    }
                    tracing::info!(
                        resolution = %resolution_id,
                        provider = %id,
                        switched = resolution.switched_from.is_some(),
                        rotated = resolution.rotated,
                        "resolution succeeded"
                    );
                    return Ok(resolution);
                }
                Err(HandoverError::SwitchConflict { provider }) => {
                    tracing::warn!(
                        resolution = %resolution_id,
                        provider = %provider,
                        "switch conflict, trying next candidate"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(
            resolution = %resolution_id,
            attempted = ?attempted,
            "no provider available"
        );
        Err(HandoverError::AllProvidersUnavailable { attempted })
    }

    /// Candidate order: environment-preferred provider first, then the
    /// remaining providers in static priority order, ineligible ones
    /// skipped.
    async fn candidate_order(&self) -> Vec<String> {
        let registry = self.registry.read().await;

        let mut order: Vec<String> = registry
            .provider_ids()
            .into_iter()
            .filter(|id| registry.is_eligible(id))
            .collect();

        if let Some(hint) = registry.detect_environment_hint().await {
            if let Some(pos) = order.iter().position(|id| *id == hint) {
                let preferred = order.remove(pos);
                order.insert(0, preferred);
            }
        }

        order
    }

    /// Publish a validated config and notify dependents. No-op when
    /// both the provider and the payload fingerprint are unchanged.
    async fn install(&self, config: ProviderConfig) -> Result<Resolution, HandoverError> {
        if !self.registry.read().await.is_eligible(&config.provider_id) {
            return Err(HandoverError::SwitchConflict {
                provider: config.provider_id,
            });
        }

        let new = Arc::new(config);

        let previous = {
            let mut active = self.active.write().await;

            let previous = active
                .as_ref()
                .map(|a| (a.config.provider_id.clone(), a.config.version.clone()));

            if let Some((ref id, ref version)) = previous {
                if *id == new.provider_id && *version == new.version {
                    return Ok(Resolution {
                        provider_id: new.provider_id.clone(),
                        switched_from: None,
                        rotated: false,
                    });
                }
            }

            // Single atomic publish: from here every reader sees the
            // new fully-formed config.
            *active = Some(ActiveConfig {
                config: Arc::clone(&new),
                switched_at: Instant::now(),
            });

            previous
        };

        let from = previous.map(|(id, _)| id);
        let switched_from = from.clone().filter(|id| *id != new.provider_id);
        let rotated = matches!(&from, Some(id) if *id == new.provider_id);

        for subscriber in self.subscribers.read().await.iter() {
            if let Err(e) = subscriber.rebuild(&new).await {
                tracing::warn!(
                    subscriber = subscriber.name(),
                    provider = %new.provider_id,
                    error = %e,
                    "dependent rebuild failed"
                );
            }
        }

        let _ = self.switch_tx.send(Some(SwitchEvent {
            from,
            to: new.provider_id.clone(),
            rotated,
        }));

        if let Some(ref from_id) = switched_from {
            tracing::info!(from = %from_id, to = %new.provider_id, "switched active provider");
        }

        Ok(Resolution {
            provider_id: new.provider_id.clone(),
            switched_from,
            rotated,
        })
    }

    async fn adopt_current(&self) -> Result<Resolution, HandoverError> {
        match self.active_config().await {
            Some(config) => Ok(Resolution {
                provider_id: config.provider_id.clone(),
                switched_from: None,
                rotated: false,
            }),
            None => Err(HandoverError::AllProvidersUnavailable {
                attempted: self.eligible_ids().await,
            }),
        }
    }

    async fn eligible_ids(&self) -> Vec<String> {
        let registry = self.registry.read().await;
        registry
            .provider_ids()
            .into_iter()
            .filter(|id| registry.is_eligible(id))
            .collect()
    }

    fn touch_last_check(&self) {
        *self
            .last_check
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Instant::now());
    }
}
