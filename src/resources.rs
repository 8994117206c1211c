//! Rebuildable resource handles owned by the dependent service.
//!
//! Each handle implements [`SwitchSubscriber`]: when the controller
//! publishes a new active config, the handle rebuilds itself against
//! the new endpoints. Reads clone cheaply out of a short-held lock so
//! request handlers never hold a handle lock across their own I/O.
//!
//! Before the first successful resolution a handle is empty and reads
//! report a `ResourceError`; the web layer treats that as unavailable.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tokio::sync::RwLock;

use crate::error::ResourceError;
use crate::provider::{ProviderConfig, SigningSecret};

// async_trait for the same reason as SecretSource: subscribers are
// registered as Arc<dyn SwitchSubscriber>.
#[async_trait]
pub trait SwitchSubscriber: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rebuild this handle against a newly published config.
    async fn rebuild(&self, config: &ProviderConfig) -> Result<(), ResourceError>;
}

/// Connection pool for the relational store.
pub struct DatabaseHandle {
    pool: RwLock<Option<MySqlPool>>,
    max_connections: u32,
}

impl DatabaseHandle {
    #[must_use]
    pub fn new(max_connections: u32) -> Self {
        Self {
            pool: RwLock::new(None),
            max_connections,
        }
    }

    /// Current pool (cheap handle clone).
    pub async fn pool(&self) -> Result<MySqlPool, ResourceError> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or_else(|| ResourceError::Database("no active database configuration".into()))
    }
}

impl Default for DatabaseHandle {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl SwitchSubscriber for DatabaseHandle {
    fn name(&self) -> &'static str {
        "database-pool"
    }

    async fn rebuild(&self, config: &ProviderConfig) -> Result<(), ResourceError> {
        let db = &config.database;
        let options = MySqlConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password)
            .database(&db.database);

        // Lazy pool: the probe already proved reachability, connections
        // are established on first acquire.
        let new_pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_lazy_with(options);

        let old = self.pool.write().await.replace(new_pool);
        if let Some(old) = old {
            // Graceful drain of the superseded pool off the switch path.
            tokio::spawn(async move { old.close().await });
        }

        tracing::info!(
            provider = %config.provider_id,
            host = %config.database.host,
            "database pool rebuilt"
        );
        Ok(())
    }
}

/// Client for the key-value cache.
pub struct CacheHandle {
    conn: RwLock<Option<redis::aio::ConnectionManager>>,
}

impl CacheHandle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            conn: RwLock::new(None),
        }
    }

    /// Current connection (multiplexed, cheap handle clone).
    pub async fn connection(&self) -> Result<redis::aio::ConnectionManager, ResourceError> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| ResourceError::Cache("no active cache configuration".into()))
    }
}

impl Default for CacheHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SwitchSubscriber for CacheHandle {
    fn name(&self) -> &'static str {
        "cache-client"
    }

    async fn rebuild(&self, config: &ProviderConfig) -> Result<(), ResourceError> {
        let client = redis::Client::open(config.cache.connection_url())
            .map_err(|e| ResourceError::Cache(Box::new(e)))?;

        let manager = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| ResourceError::Cache(Box::new(e)))?;

        *self.conn.write().await = Some(manager);

        tracing::info!(
            provider = %config.provider_id,
            host = %config.cache.host,
            tls = config.cache.tls_required,
            "cache client rebuilt"
        );
        Ok(())
    }
}

/// Session-store binding holding the provider's signing secret.
pub struct SessionSigner {
    secret: RwLock<Option<SigningSecret>>,
}

impl SessionSigner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            secret: RwLock::new(None),
        }
    }

    pub async fn secret(&self) -> Result<SigningSecret, ResourceError> {
        self.secret
            .read()
            .await
            .clone()
            .ok_or_else(|| ResourceError::Other("no active signing secret".into()))
    }
}

impl Default for SessionSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SwitchSubscriber for SessionSigner {
    fn name(&self) -> &'static str {
        "session-signer"
    }

    async fn rebuild(&self, config: &ProviderConfig) -> Result<(), ResourceError> {
        *self.secret.write().await = Some(config.signing_secret.clone());
        tracing::info!(provider = %config.provider_id, "session signing secret rotated");
        Ok(())
    }
}
