//! Per-provider availability tracking and environment detection.
//!
//! [`ProviderRegistry`] is the leaf state holder: one
//! [`ProviderAvailability`] record per declared provider, in static
//! priority order, plus the ordered waterfall of
//! [`EnvironmentCheck`]s used to bias candidate order toward the
//! provider hosting this process.
//!
//! # State Transitions
//! ```text
//! Unknown   → Healthy:   passing fetch + probe
//! Unknown   → Unhealthy: failing fetch or probe
//! Healthy   ⇄ Unhealthy: explicit probe outcome only
//! ```
//! A provider is never silently re-marked Healthy without a passing
//! probe; recovery happens when a later resolution probes it again.

use std::time::Instant;

use async_trait::async_trait;

use crate::bootstrap::model::ProviderSpec;

pub const PREFERRED_PROVIDER_ENV: &str = "HANDOVER_PREFERRED_PROVIDER";

/// How long any single environment check may run.
const CHECK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Unknown,
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Healthy => f.write_str("healthy"),
            Self::Unhealthy => f.write_str("unhealthy"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderAvailability {
    pub state: ProviderState,
    pub last_checked_at: Option<Instant>,
    pub last_error: Option<String>,
}

impl ProviderAvailability {
    const fn unknown() -> Self {
        Self {
            state: ProviderState::Unknown,
            last_checked_at: None,
            last_error: None,
        }
    }
}

struct RegistryEntry {
    id: String,
    disabled: bool,
    availability: ProviderAvailability,
}

pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
    checks: Vec<Box<dyn EnvironmentCheck>>,
}

impl ProviderRegistry {
    /// Build a registry from the bootstrap roster with the default
    /// detection waterfall: preferred-provider env var, then metadata
    /// reachability, then runtime marker vars.
    #[must_use]
    pub fn from_specs(specs: &[ProviderSpec]) -> Self {
        let known: Vec<String> = specs.iter().map(|s| s.id.clone()).collect();

        let metadata_targets: Vec<(String, String)> = specs
            .iter()
            .filter_map(|s| s.metadata_addr.clone().map(|addr| (s.id.clone(), addr)))
            .collect();

        let runtime_markers: Vec<(String, String)> = specs
            .iter()
            .filter_map(|s| s.runtime_env.clone().map(|var| (s.id.clone(), var)))
            .collect();

        let mut checks: Vec<Box<dyn EnvironmentCheck>> = vec![Box::new(PreferredProviderVar {
            var: PREFERRED_PROVIDER_ENV.to_string(),
            known,
        })];
        if !metadata_targets.is_empty() {
            checks.push(Box::new(MetadataReachability {
                targets: metadata_targets,
                connect_timeout: std::time::Duration::from_millis(500),
            }));
        }
        if !runtime_markers.is_empty() {
            checks.push(Box::new(RuntimeMarkerVar {
                markers: runtime_markers,
            }));
        }

        Self::with_checks(specs, checks)
    }

    /// Build a registry with an explicit check waterfall (tests inject
    /// canned checks here).
    #[must_use]
    pub fn with_checks(specs: &[ProviderSpec], checks: Vec<Box<dyn EnvironmentCheck>>) -> Self {
        let entries = specs
            .iter()
            .map(|s| RegistryEntry {
                id: s.id.clone(),
                disabled: !s.enabled,
                availability: ProviderAvailability::unknown(),
            })
            .collect();

        Self { entries, checks }
    }

    /// Provider ids in static priority order.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Whether a provider may participate in resolution. Disabled
    /// providers are out for the whole run; Unhealthy ones are still
    /// eligible so a later resolution can detect recovery.
    #[must_use]
    pub fn is_eligible(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id && !e.disabled)
    }

    pub fn mark_healthy(&mut self, id: &str) {
        if let Some(entry) = self.entry_mut(id) {
            if entry.availability.state != ProviderState::Healthy {
                tracing::info!(provider = %id, "provider marked healthy");
            }
            entry.availability = ProviderAvailability {
                state: ProviderState::Healthy,
                last_checked_at: Some(Instant::now()),
                last_error: None,
            };
        }
    }

    pub fn mark_unhealthy(&mut self, id: &str, reason: &str) {
        if let Some(entry) = self.entry_mut(id) {
            if entry.availability.state != ProviderState::Unhealthy {
                tracing::warn!(provider = %id, reason = %reason, "provider marked unhealthy");
            }
            entry.availability = ProviderAvailability {
                state: ProviderState::Unhealthy,
                last_checked_at: Some(Instant::now()),
                last_error: Some(reason.to_string()),
            };
        }
    }

    #[must_use]
    pub fn availability(&self, id: &str) -> Option<&ProviderAvailability> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.availability)
    }

    /// Snapshot rows for diagnostics: `(id, disabled, availability)`.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, bool, ProviderAvailability)> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.disabled, e.availability.clone()))
            .collect()
    }

    /// Run the detection waterfall: each check in order, first positive
    /// result wins. Every check is bounded to ~1s so resolution order
    /// can never hang on a slow metadata endpoint.
    pub async fn detect_environment_hint(&self) -> Option<String> {
        for check in &self.checks {
            match tokio::time::timeout(CHECK_TIMEOUT, check.detect()).await {
                Ok(Some(id)) => {
                    if self.is_eligible(&id) {
                        tracing::debug!(provider = %id, check = check.name(), "environment hint");
                        return Some(id);
                    }
                    tracing::debug!(
                        provider = %id,
                        check = check.name(),
                        "environment hint names an ineligible provider, ignoring"
                    );
                }
                Ok(None) => {}
                Err(_) => {
                    tracing::debug!(check = check.name(), "environment check timed out");
                }
            }
        }
        None
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut RegistryEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

/// One step of the environment-detection waterfall. Best-effort: a
/// check answers with a provider id or stays silent.
#[async_trait]
pub trait EnvironmentCheck: Send + Sync {
    fn name(&self) -> &'static str;

    async fn detect(&self) -> Option<String>;
}

/// Explicit operator preference via env var.
pub struct PreferredProviderVar {
    pub var: String,
    pub known: Vec<String>,
}

#[async_trait]
impl EnvironmentCheck for PreferredProviderVar {
    fn name(&self) -> &'static str {
        "preferred-provider-env"
    }

    async fn detect(&self) -> Option<String> {
        let value = std::env::var(&self.var).ok()?;
        if self.known.iter().any(|id| *id == value) {
            Some(value)
        } else {
            if !value.is_empty() {
                tracing::warn!(
                    var = %self.var,
                    value = %value,
                    "preferred provider is not in the bootstrap roster"
                );
            }
            None
        }
    }
}

/// TCP reachability of a provider's instance-metadata address. Only
/// reachable from inside that provider's network, which makes it a
/// usable co-location signal.
pub struct MetadataReachability {
    pub targets: Vec<(String, String)>,
    pub connect_timeout: std::time::Duration,
}

#[async_trait]
impl EnvironmentCheck for MetadataReachability {
    fn name(&self) -> &'static str {
        "metadata-reachability"
    }

    async fn detect(&self) -> Option<String> {
        for (provider, addr) in &self.targets {
            let connect = tokio::net::TcpStream::connect(addr.as_str());
            if let Ok(Ok(_)) = tokio::time::timeout(self.connect_timeout, connect).await {
                return Some(provider.clone());
            }
        }
        None
    }
}

/// Provider-managed runtime marker vars (e.g. `AWS_EXECUTION_ENV`).
pub struct RuntimeMarkerVar {
    pub markers: Vec<(String, String)>,
}

#[async_trait]
impl EnvironmentCheck for RuntimeMarkerVar {
    fn name(&self) -> &'static str {
        "runtime-marker-env"
    }

    async fn detect(&self) -> Option<String> {
        for (provider, var) in &self.markers {
            if std::env::var(var).is_ok_and(|v| !v.is_empty()) {
                return Some(provider.clone());
            }
        }
        None
    }
}
