//! Secret payload schema and the parse-validate-fingerprint pipeline.
//!
//! Every secret source stores the same JSON payload shape regardless
//! of its wire protocol. [`parse_payload`] deserializes it into a
//! fully-populated [`ProviderConfig`] or fails; there is no partially
//! constructed config. Shared by all source implementations to avoid
//! duplicating the pipeline.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{CacheSettings, DatabaseSettings, PayloadVersion, ProviderConfig, SigningSecret};
use crate::error::HandoverError;

const fn default_database_port() -> u16 {
    3306
}

const fn default_cache_port() -> u16 {
    6379
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SecretPayload {
    signing_secret: String,
    database: DatabasePayload,
    cache: CachePayload,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabasePayload {
    host: String,
    #[serde(default = "default_database_port")]
    port: u16,
    user: String,
    password: String,
    database: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CachePayload {
    host: String,
    #[serde(default = "default_cache_port")]
    port: u16,
    #[serde(default)]
    tls_required: bool,
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Deserialize a raw payload into a [`ProviderConfig`], fingerprinting
/// the raw bytes so a rotated secret on the same provider is detected
/// as a change.
///
/// A missing or malformed field maps to `SourceUnavailable`: the
/// config is all-fields-populated or it does not exist.
pub fn parse_payload(provider_id: &str, raw: &str) -> Result<ProviderConfig, HandoverError> {
    let payload: SecretPayload =
        serde_json::from_str(raw).map_err(|e| HandoverError::SourceUnavailable {
            provider: provider_id.to_string(),
            source: Box::new(e),
        })?;

    if payload.signing_secret.is_empty() {
        return Err(HandoverError::SourceUnavailable {
            provider: provider_id.to_string(),
            source: "payload field 'signing_secret' is empty".into(),
        });
    }

    Ok(ProviderConfig {
        provider_id: provider_id.to_string(),
        signing_secret: SigningSecret::from(payload.signing_secret),
        database: DatabaseSettings {
            host: payload.database.host,
            port: payload.database.port,
            user: payload.database.user,
            password: payload.database.password,
            database: payload.database.database,
        },
        cache: CacheSettings {
            host: payload.cache.host,
            port: payload.cache.port,
            tls_required: payload.cache.tls_required,
        },
        version: PayloadVersion::Hash(sha256_hex(raw.as_bytes())),
    })
}
