//! Concrete [`SecretSource`](super::SecretSource) implementations.
//!
//! Provides the file-backed source (development and tests), the HTTPS
//! endpoint source, and the AWS Secrets Manager source gated by the
//! `aws` feature. Construction from a bootstrap [`ProviderSpec`] is
//! handled by [`build_source`].

pub mod file_source;
pub mod http;

#[cfg(feature = "aws")]
pub mod aws;

use crate::bootstrap::model::{ProviderSpec, SecretSpec};
use crate::error::HandoverError;
use crate::provider::SecretSource;

/// Construct the secret source declared by a provider spec.
pub async fn build_source(spec: &ProviderSpec) -> Result<Box<dyn SecretSource>, HandoverError> {
    match &spec.secrets {
        SecretSpec::File { path } => Ok(Box::new(file_source::FileSource::new(
            spec.id.clone(),
            path.clone(),
        ))),

        SecretSpec::Http {
            url,
            bearer_token_env,
        } => {
            let source = http::HttpSource::new(spec.id.clone(), url, bearer_token_env.clone())?;
            Ok(Box::new(source))
        }

        #[cfg(feature = "aws")]
        SecretSpec::AwsSecretsManager { secret_id, region } => {
            let source = aws::AwsSource::new(spec.id.clone(), secret_id, region).await;
            Ok(Box::new(source))
        }

        #[cfg(not(feature = "aws"))]
        SecretSpec::AwsSecretsManager { .. } => Err(HandoverError::BootstrapValidation {
            errors: vec![crate::error::ValidationError {
                provider: spec.id.clone(),
                field: "secrets.kind".into(),
                message: "aws-secrets-manager requires the 'aws' feature".into(),
                suggestion: Some("rebuild with --features aws".into()),
            }],
        }),
    }
}
