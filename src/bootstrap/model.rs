//! Serde data structures for the Handover bootstrap file.
//!
//! Contains [`Bootstrap`] (the root), [`ProviderSpec`], [`SecretSpec`],
//! and the tunables blocks ([`MonitorSettings`], [`ProbeSettings`],
//! [`GuardSettings`], [`FetchSettings`]). Struct types derive
//! `Serialize` and `Deserialize` with `deny_unknown_fields` for strict
//! parsing.
//!
//! The order of the `providers` list is the static priority order:
//! earlier entries are tried first unless the environment hint moves a
//! later one to the front.

use serde::{Deserialize, Serialize};

const fn default_monitor_interval() -> u64 {
    30
}

const fn default_probe_timeout() -> u64 {
    5
}

const fn default_fetch_timeout() -> u64 {
    10
}

const fn default_guard_throttle() -> u64 {
    30
}

const fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_default_monitor(v: &MonitorSettings) -> bool {
    v.interval_secs == default_monitor_interval()
}

fn is_default_probe(v: &ProbeSettings) -> bool {
    v.timeout_secs == default_probe_timeout()
}

fn is_default_fetch(v: &FetchSettings) -> bool {
    v.timeout_secs == default_fetch_timeout()
}

fn is_default_guard(v: &GuardSettings) -> bool {
    v.throttle_secs == default_guard_throttle()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Bootstrap {
    #[serde(default, skip_serializing_if = "is_default_monitor")]
    pub monitor: MonitorSettings,

    #[serde(default, skip_serializing_if = "is_default_probe")]
    pub probe: ProbeSettings,

    #[serde(default, skip_serializing_if = "is_default_fetch")]
    pub fetch: FetchSettings,

    #[serde(default, skip_serializing_if = "is_default_guard")]
    pub guard: GuardSettings,

    pub providers: Vec<ProviderSpec>,
}

impl Bootstrap {
    /// Providers that may participate in resolution.
    #[must_use]
    pub fn enabled_providers(&self) -> usize {
        self.providers.iter().filter(|p| p.enabled).count()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSettings {
    #[serde(default = "default_monitor_interval")]
    pub interval_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_monitor_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSettings {
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuardSettings {
    #[serde(default = "default_guard_throttle")]
    pub throttle_secs: u64,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            throttle_secs: default_guard_throttle(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSpec {
    pub id: String,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,

    pub secrets: SecretSpec,

    /// `host:port` of the provider's instance-metadata service, used by
    /// environment detection to decide whether the process runs inside
    /// this provider's infrastructure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_addr: Option<String>,

    /// Env var whose presence marks this provider's managed runtime
    /// (e.g. `AWS_EXECUTION_ENV`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_env: Option<String>,
}

/// Per-provider secret source settings. The wire protocol behind each
/// kind is opaque to the controller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SecretSpec {
    /// Local JSON payload file (development and tests).
    File { path: std::path::PathBuf },

    /// HTTPS endpoint returning the JSON payload.
    Http {
        url: String,

        /// Env var holding a bearer token attached to the fetch.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bearer_token_env: Option<String>,
    },

    /// AWS Secrets Manager secret (requires the `aws` feature).
    AwsSecretsManager { secret_id: String, region: String },
}

impl SecretSpec {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Http { .. } => "http",
            Self::AwsSecretsManager { .. } => "aws-secrets-manager",
        }
    }
}
