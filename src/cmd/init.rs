//! `handover init` — generate a starter bootstrap file.
//!
//! Writes a two-provider template (an HTTPS secret endpoint and an AWS
//! Secrets Manager secret) in the chosen format. Refuses to overwrite
//! an existing file.

use std::path::PathBuf;

use crate::bootstrap::model::{Bootstrap, ProviderSpec, SecretSpec};
use crate::cli::{BootstrapFormat, InitArgs};
use crate::error::HandoverError;

pub fn execute(args: &InitArgs) -> Result<(), HandoverError> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("handover.{}", args.format.extension())));

    if path.exists() {
        return Err(HandoverError::FileExists { path });
    }

    let content = serialize_bootstrap(&starter_bootstrap(), &args.format)?;
    std::fs::write(&path, content)?;

    println!(
        "\u{2713} wrote {}\n\n  Edit the provider endpoints, then:\n    \
         handover validate {}\n    \
         handover check\n    \
         handover run",
        path.display(),
        path.display()
    );

    Ok(())
}

fn starter_bootstrap() -> Bootstrap {
    Bootstrap {
        monitor: Default::default(),
        probe: Default::default(),
        fetch: Default::default(),
        guard: Default::default(),
        providers: vec![
            ProviderSpec {
                id: "primary".into(),
                enabled: true,
                secrets: SecretSpec::Http {
                    url: "https://secrets.internal.example/primary".into(),
                    bearer_token_env: Some("HANDOVER_PRIMARY_TOKEN".into()),
                },
                metadata_addr: Some("metadata.internal.example:80".into()),
                runtime_env: None,
            },
            ProviderSpec {
                id: "secondary".into(),
                enabled: true,
                secrets: SecretSpec::AwsSecretsManager {
                    secret_id: "app/config".into(),
                    region: "us-east-2".into(),
                },
                metadata_addr: None,
                runtime_env: Some("AWS_EXECUTION_ENV".into()),
            },
        ],
    }
}

/// Serialize a `Bootstrap` to a formatted string in the given format.
fn serialize_bootstrap(
    bootstrap: &Bootstrap,
    format: &BootstrapFormat,
) -> Result<String, HandoverError> {
    match format {
        #[cfg(feature = "yaml")]
        BootstrapFormat::Yaml => serde_yml::to_string(bootstrap)
            .map_err(|e| HandoverError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "yaml"))]
        BootstrapFormat::Yaml => Err(HandoverError::UnsupportedFormat("yaml".into())),

        BootstrapFormat::Json => serde_json::to_string_pretty(bootstrap)
            .map_err(|e| HandoverError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(feature = "toml")]
        BootstrapFormat::Toml => toml::to_string_pretty(bootstrap)
            .map_err(|e| HandoverError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "toml"))]
        BootstrapFormat::Toml => Err(HandoverError::UnsupportedFormat("toml".into())),
    }
}
