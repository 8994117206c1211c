//! Unified error types for Handover.
//!
//! Defines [`HandoverError`] (the main crate error enum),
//! [`ResourceError`] (the typed failure classification reported by
//! dependent resources), and [`ValidationError`] for bootstrap
//! validation failures. All use `thiserror` for `Display` and `Error`
//! derives. Error messages include contextual hints to guide the user
//! toward a fix.
//!
//! Provider-specific failures (`SourceUnavailable`, `ProbeFailed`)
//! never escape the controller; they are converted into availability
//! state updates. Only `AllProvidersUnavailable` reaches the caller of
//! the initial resolution.

use std::path::PathBuf;

use crate::probe::ProbeTarget;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub provider: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  provider {}: {} — {}",
            self.provider, self.field, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HandoverError {
    #[error("secret source for provider '{provider}' is unavailable: {source}")]
    SourceUnavailable {
        provider: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("connectivity probe failed for provider '{provider}' ({target}): {reason}")]
    ProbeFailed {
        provider: String,
        target: ProbeTarget,
        reason: String,
    },

    #[error("no provider is available (attempted: {})", attempted.join(", "))]
    AllProvidersUnavailable { attempted: Vec<String> },

    #[error("provider '{provider}' became ineligible during switch; resolution must be re-run")]
    SwitchConflict { provider: String },

    #[error("No bootstrap file found.\n\n  {hint}")]
    NoBootstrap { hint: String },

    #[error("Bootstrap file not found: {}", path.display())]
    BootstrapNotFound { path: PathBuf },

    #[error("Bootstrap parse error in {path}:\n  {source}")]
    BootstrapParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Bootstrap validation failed:\n{}", format_errors(.errors))]
    BootstrapValidation { errors: Vec<ValidationError> },

    #[error("Unsupported bootstrap format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Status check failed with status {0}")]
    StatusCheckFailed(hyper::StatusCode),

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Typed failure classification reported by dependent resources.
///
/// Replaces keyword matching on error text: a dependent that fails a
/// database call reports `Database`, a cache call `Cache`, and so on.
/// Only connectivity-flavored variants trigger emergency failover;
/// `Other` always propagates to the caller's normal error handling.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("cache error: {0}")]
    Cache(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("resource operation timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ResourceError {
    /// Whether this failure should trigger an emergency failover.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Cache(_) | Self::Timeout(_)
        )
    }
}
