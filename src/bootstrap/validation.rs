//! Bootstrap validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Bootstrap`] for
//! structural errors such as an empty provider list, duplicate or
//! malformed provider ids, bad secret-source URLs, unparseable
//! metadata addresses, and zeroed timeouts. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use url::Url;

use super::model::{Bootstrap, SecretSpec};
use crate::error::ValidationError;

/// Validate a provider id. Returns `Ok(())` or a human-readable error.
pub fn validate_provider_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("id cannot be empty".into());
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "'{id}' contains characters outside [a-zA-Z0-9_-]"
        ));
    }
    Ok(())
}

/// Validate a secret-source URL. Returns `Ok(())` or a human-readable error.
pub fn validate_source_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

/// Validate a `host:port` metadata address. Returns `Ok(())` or a
/// human-readable error.
pub fn validate_metadata_addr(addr: &str) -> Result<(), String> {
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            if port.parse::<u16>().is_ok() {
                Ok(())
            } else {
                Err(format!("'{port}' is not a valid port"))
            }
        }
        _ => Err(format!("'{addr}' is not of the form host:port")),
    }
}

pub fn validate(bootstrap: &Bootstrap) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if bootstrap.providers.is_empty() {
        errors.push(ValidationError {
            provider: "(root)".into(),
            field: "providers".into(),
            message: "at least one provider must be declared".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    if bootstrap.enabled_providers() == 0 {
        errors.push(ValidationError {
            provider: "(root)".into(),
            field: "providers".into(),
            message: "every provider is disabled".into(),
            suggestion: Some("set enabled: true on at least one provider".into()),
        });
    }

    for (field, value) in [
        ("monitor.interval_secs", bootstrap.monitor.interval_secs),
        ("probe.timeout_secs", bootstrap.probe.timeout_secs),
        ("fetch.timeout_secs", bootstrap.fetch.timeout_secs),
        ("guard.throttle_secs", bootstrap.guard.throttle_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError {
                provider: "(root)".into(),
                field: field.into(),
                message: "must be greater than zero".into(),
                suggestion: None,
            });
        }
    }

    let mut seen_ids = std::collections::HashSet::new();

    for (i, spec) in bootstrap.providers.iter().enumerate() {
        let provider_id = if spec.id.is_empty() {
            format!("providers[{i}]")
        } else {
            spec.id.clone()
        };

        if let Err(msg) = validate_provider_id(&spec.id) {
            errors.push(ValidationError {
                provider: provider_id.clone(),
                field: "id".into(),
                message: msg,
                suggestion: None,
            });
        }

        if !seen_ids.insert(&spec.id) {
            errors.push(ValidationError {
                provider: provider_id.clone(),
                field: "id".into(),
                message: "duplicate provider id".into(),
                suggestion: None,
            });
        }

        match &spec.secrets {
            SecretSpec::Http { url, .. } => {
                if let Err(msg) = validate_source_url(url) {
                    errors.push(ValidationError {
                        provider: provider_id.clone(),
                        field: "secrets.url".into(),
                        message: msg,
                        suggestion: None,
                    });
                }
            }
            SecretSpec::File { path } => {
                if path.as_os_str().is_empty() {
                    errors.push(ValidationError {
                        provider: provider_id.clone(),
                        field: "secrets.path".into(),
                        message: "path cannot be empty".into(),
                        suggestion: None,
                    });
                }
            }
            SecretSpec::AwsSecretsManager { secret_id, region } => {
                if secret_id.is_empty() {
                    errors.push(ValidationError {
                        provider: provider_id.clone(),
                        field: "secrets.secret_id".into(),
                        message: "secret_id cannot be empty".into(),
                        suggestion: None,
                    });
                }
                if region.is_empty() {
                    errors.push(ValidationError {
                        provider: provider_id.clone(),
                        field: "secrets.region".into(),
                        message: "region cannot be empty".into(),
                        suggestion: Some("e.g. us-east-2".into()),
                    });
                }
            }
        }

        if let Some(addr) = &spec.metadata_addr {
            if let Err(msg) = validate_metadata_addr(addr) {
                errors.push(ValidationError {
                    provider: provider_id.clone(),
                    field: "metadata_addr".into(),
                    message: msg,
                    suggestion: None,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// One-line summary for `handover validate` text output.
#[must_use]
pub fn format_validation_report(path: &str, bootstrap: &Bootstrap) -> String {
    format!(
        "{path} is valid ({} providers, {} enabled)",
        bootstrap.providers.len(),
        bootstrap.enabled_providers()
    )
}
