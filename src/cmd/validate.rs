//! `handover validate` — check a bootstrap file for errors.
//!
//! Parses and validates the bootstrap file, reporting results in
//! either human-readable text or machine-readable JSON format.

use crate::bootstrap::{parse_bootstrap_str, validation};
use crate::cli::{ReportFormat, ValidateArgs};
use crate::error::HandoverError;

pub fn execute(args: &ValidateArgs) -> Result<(), HandoverError> {
    let path = &args.config;

    if !path.exists() {
        return Err(HandoverError::BootstrapNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let bootstrap = parse_bootstrap_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&bootstrap) {
        match args.format {
            ReportFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ReportFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "provider": e.provider,
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(HandoverError::BootstrapValidation { errors });
    }

    match args.format {
        ReportFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&path.display().to_string(), &bootstrap)
            );
        }
        ReportFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "providers": bootstrap.providers.len(),
                    "enabled": bootstrap.enabled_providers(),
                })
            );
        }
    }

    Ok(())
}
