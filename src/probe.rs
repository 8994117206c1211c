//! Connectivity validation for resolved provider configs.
//!
//! A resolved config is only usable if both of its endpoints answer: a
//! database connection can be established and released, and the cache
//! answers a round-trip PING over the transport the config demands.
//! Probes never raise to the caller; a timeout or handshake failure is
//! an outcome, not an error.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection};

use crate::provider::ProviderConfig;

/// Which endpoint a probe exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTarget {
    Database,
    Cache,
}

impl std::fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => f.write_str("database"),
            Self::Cache => f.write_str("cache"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Pass,
    Fail { target: ProbeTarget, reason: String },
}

impl ProbeOutcome {
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Check both endpoints of a resolved config. A config with either
    /// check failing is not usable.
    async fn check(&self, config: &ProviderConfig) -> ProbeOutcome;
}

/// Real-network probe: MySQL connect-and-release plus redis PING, each
/// bounded by the same timeout budget.
pub struct NetProbe {
    timeout: Duration,
}

impl NetProbe {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn check_database(&self, config: &ProviderConfig) -> Result<(), String> {
        let db = &config.database;
        let options = MySqlConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password)
            .database(&db.database);

        match tokio::time::timeout(self.timeout, options.connect()).await {
            Ok(Ok(conn)) => {
                // Establish and immediately release; a close failure
                // still proves reachability.
                let _ = conn.close().await;
                Ok(())
            }
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        }
    }

    async fn check_cache(&self, config: &ProviderConfig) -> Result<(), String> {
        let url = config.cache.connection_url();
        let client = redis::Client::open(url).map_err(|e| e.to_string())?;

        let mut conn =
            match tokio::time::timeout(self.timeout, client.get_multiplexed_async_connection())
                .await
            {
                Ok(Ok(conn)) => conn,
                Ok(Err(e)) => return Err(e.to_string()),
                Err(_) => return Err(format!("timed out after {}s", self.timeout.as_secs())),
            };

        let ping = async {
            redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map(|_: String| ())
        };

        match tokio::time::timeout(self.timeout, ping).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for NetProbe {
    async fn check(&self, config: &ProviderConfig) -> ProbeOutcome {
        if let Err(reason) = self.check_database(config).await {
            tracing::warn!(
                provider = %config.provider_id,
                host = %config.database.host,
                reason = %reason,
                "database probe failed"
            );
            return ProbeOutcome::Fail {
                target: ProbeTarget::Database,
                reason,
            };
        }

        if let Err(reason) = self.check_cache(config).await {
            tracing::warn!(
                provider = %config.provider_id,
                host = %config.cache.host,
                tls = config.cache.tls_required,
                reason = %reason,
                "cache probe failed"
            );
            return ProbeOutcome::Fail {
                target: ProbeTarget::Cache,
                reason,
            };
        }

        ProbeOutcome::Pass
    }
}
