//! AWS Secrets Manager [`SecretSource`] implementation.
//!
//! Reads the JSON payload from a Secrets Manager secret's string
//! value. Credentials come from the default AWS provider chain, so the
//! same bootstrap works on EC2 instance roles, ECS task roles, and
//! local profiles.
//!
//! # Bootstrap settings
//!
//! | Field       | Meaning                         |
//! |-------------|---------------------------------|
//! | `secret_id` | Secret name or full ARN         |
//! | `region`    | AWS region, e.g. `us-east-2`    |

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;

use crate::error::HandoverError;
use crate::provider::{payload, ProviderConfig, SecretSource};

pub struct AwsSource {
    provider_id: String,
    client: Client,
    secret_id: String,
}

impl AwsSource {
    pub async fn new(provider_id: String, secret_id: &str, region: &str) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        Self {
            provider_id,
            client: Client::new(&sdk_config),
            secret_id: secret_id.to_string(),
        }
    }

    fn unavailable(&self, source: Box<dyn std::error::Error + Send + Sync>) -> HandoverError {
        HandoverError::SourceUnavailable {
            provider: self.provider_id.clone(),
            source,
        }
    }
}

#[async_trait]
impl SecretSource for AwsSource {
    fn name(&self) -> &'static str {
        "aws-secrets-manager"
    }

    async fn fetch(&self) -> Result<ProviderConfig, HandoverError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(&self.secret_id)
            .send()
            .await
            .map_err(|e| self.unavailable(Box::new(e)))?;

        let raw = output.secret_string().ok_or_else(|| {
            self.unavailable(
                format!("secret '{}' has no string value", self.secret_id).into(),
            )
        })?;

        payload::parse_payload(&self.provider_id, raw)
    }
}
