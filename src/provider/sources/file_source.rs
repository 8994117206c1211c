//! File-backed secret source.
//!
//! [`FileSource`] implements [`SecretSource`] by reading the JSON
//! payload from a local file via Tokio. Intended for development and
//! tests; a missing file is a normal `SourceUnavailable` outcome, the
//! same as an unreachable remote store.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::HandoverError;
use crate::provider::{payload, ProviderConfig, SecretSource};

pub struct FileSource {
    provider_id: String,
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(provider_id: String, path: PathBuf) -> Self {
        Self { provider_id, path }
    }
}

#[async_trait]
impl SecretSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self) -> Result<ProviderConfig, HandoverError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            HandoverError::SourceUnavailable {
                provider: self.provider_id.clone(),
                source: format!("{}: {e}", self.path.display()).into(),
            }
        })?;

        payload::parse_payload(&self.provider_id, &content)
    }
}
