//! HTTPS endpoint secret source.
//!
//! [`HttpSource`] implements [`SecretSource`] by fetching the JSON
//! payload from an HTTPS endpoint with the shared rustls-backed hyper
//! client. An optional bearer token is read from an env var at fetch
//! time, so rotated tokens are picked up without a restart. Every
//! fetch is bounded by a timeout so the controller's resolve lock can
//! never be held indefinitely by a hung store.

use std::time::Duration;

use async_trait::async_trait;
use http_body_util::BodyExt;

use crate::error::HandoverError;
use crate::provider::{payload, ProviderConfig, SecretSource};
use crate::server::{self, HttpClient};

pub struct HttpSource {
    provider_id: String,
    uri: hyper::Uri,
    bearer_token_env: Option<String>,
    client: HttpClient,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(
        provider_id: String,
        url: &str,
        bearer_token_env: Option<String>,
    ) -> Result<Self, HandoverError> {
        let uri: hyper::Uri =
            url.parse()
                .map_err(|e: hyper::http::uri::InvalidUri| HandoverError::UriParse {
                    source: Box::new(e),
                })?;

        Ok(Self {
            provider_id,
            uri,
            bearer_token_env,
            client: server::build_http_client(),
            timeout: Duration::from_secs(10),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn unavailable(&self, source: Box<dyn std::error::Error + Send + Sync>) -> HandoverError {
        HandoverError::SourceUnavailable {
            provider: self.provider_id.clone(),
            source,
        }
    }
}

#[async_trait]
impl SecretSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self) -> Result<ProviderConfig, HandoverError> {
        let mut builder = hyper::Request::builder()
            .uri(self.uri.clone())
            .header("accept", "application/json");

        if let Some(var) = &self.bearer_token_env {
            if let Ok(token) = std::env::var(var) {
                builder = builder.header("authorization", format!("Bearer {token}"));
            }
        }

        let req = builder
            .body(http_body_util::Full::new(bytes::Bytes::new()))
            .map_err(|e| self.unavailable(Box::new(e)))?;

        let response = tokio::time::timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| {
                self.unavailable(
                    format!("fetch timed out after {}s", self.timeout.as_secs()).into(),
                )
            })?
            .map_err(|e| self.unavailable(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("endpoint returned {status}").into()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| self.unavailable(Box::new(e)))?
            .to_bytes();

        payload::parse_payload(&self.provider_id, &String::from_utf8_lossy(&body))
    }
}
