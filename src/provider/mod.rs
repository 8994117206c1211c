//! Provider configuration model and the pluggable secret-source trait.
//!
//! Defines [`ProviderConfig`] (the immutable resolved settings for one
//! provider), the [`SecretSource`] trait for pluggable secret
//! backends, and the [`PayloadVersion`] fingerprint used to detect a
//! rotated payload on an unchanged provider. Submodules provide the
//! payload schema and concrete source implementations.

pub mod payload;
pub mod sources;

use std::fmt;

use async_trait::async_trait;

use crate::error::HandoverError;

/// Content fingerprint of a resolved secret payload. Two configs from
/// the same provider with equal versions carry identical settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PayloadVersion {
    Hash(String),
}

impl PayloadVersion {
    /// Short prefix for log and status output.
    #[must_use]
    pub fn short(&self) -> &str {
        match self {
            Self::Hash(h) => h.get(..8).unwrap_or(h),
        }
    }
}

/// Opaque signing secret consumed by the session-store binding.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for SigningSecret {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Connection parameters for the relational store.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Connection parameters for the key-value cache. TLS requirement is
/// provider-specific and carried as data, never inferred at call sites.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub host: String,
    pub port: u16,
    pub tls_required: bool,
}

impl CacheSettings {
    /// Connection URL honoring the TLS flag.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let scheme = if self.tls_required { "rediss" } else { "redis" };
        format!("{scheme}://{}:{}/", self.host, self.port)
    }
}

/// Resolved settings for one provider. Immutable once constructed:
/// resolution either fully succeeds or returns no config, and a
/// superseded config is discarded, never mutated in place.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub signing_secret: SigningSecret,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub version: PayloadVersion,
}

// async_trait is required here because SecretSource is used as
// Box<dyn SecretSource> and native async fn in traits (Rust 1.75+)
// does not support dyn dispatch.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Source kind, for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Fetch and parse the provider's secret payload.
    ///
    /// "Not configured for this environment" is a normal
    /// `SourceUnavailable` outcome, not a panic.
    async fn fetch(&self) -> Result<ProviderConfig, HandoverError>;
}
