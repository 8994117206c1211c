//! Bootstrap file loading and validation.
//!
//! The bootstrap file declares the provider roster (in static priority
//! order), per-provider secret-source settings, and the controller
//! tunables. Submodules provide the data model and validation logic;
//! this module dispatches parsing by file extension and auto-detects a
//! bootstrap file in the working directory.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::HandoverError;
use model::Bootstrap;

/// Parse a bootstrap string based on file extension.
pub fn parse_bootstrap_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Bootstrap, HandoverError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| HandoverError::BootstrapParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| HandoverError::BootstrapParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| HandoverError::BootstrapParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(HandoverError::UnsupportedFormat(other.to_string())),
    }
}

/// Load, parse, and validate a bootstrap file.
pub async fn load(path: &Path) -> Result<Bootstrap, HandoverError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HandoverError::BootstrapNotFound {
                path: path.to_path_buf(),
            }
        } else {
            HandoverError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let bootstrap = parse_bootstrap_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&bootstrap) {
        return Err(HandoverError::BootstrapValidation { errors });
    }

    Ok(bootstrap)
}

/// Resolve the bootstrap path: explicit flag first, then auto-detect in
/// the current directory.
pub async fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, HandoverError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = [
        "handover.yaml",
        "handover.yml",
        "handover.json",
        "handover.toml",
    ];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected bootstrap file");
            return Ok(path);
        }
    }

    Err(HandoverError::NoBootstrap {
        hint: "Provide --config <file> or create ./handover.yaml.\n  \
               Run 'handover init' to create a starter bootstrap file."
            .into(),
    })
}
