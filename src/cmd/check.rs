//! `handover check` — dry-run resolution of every declared provider.
//!
//! Fetches and probes each provider independently (no ordering, no
//! switch) and reports the per-provider outcome in human-readable text
//! or machine-readable JSON. Exits non-zero when no provider is
//! usable.

use std::time::Duration;

use crate::bootstrap;
use crate::cli::{CheckArgs, ReportFormat};
use crate::error::HandoverError;
use crate::probe::{ConnectivityProbe, NetProbe, ProbeOutcome};
use crate::provider::sources;

struct CheckRow {
    id: String,
    kind: &'static str,
    outcome: &'static str,
    detail: Option<String>,
}

pub async fn execute(args: CheckArgs) -> Result<(), HandoverError> {
    let path = bootstrap::resolve_path(args.config.as_deref()).await?;
    let boot = bootstrap::load(&path).await?;

    let probe = NetProbe::new(Duration::from_secs(boot.probe.timeout_secs));
    let fetch_timeout = Duration::from_secs(boot.fetch.timeout_secs);

    let mut rows = Vec::with_capacity(boot.providers.len());
    let mut usable = 0usize;
    let mut attempted = Vec::new();

    for spec in &boot.providers {
        if !spec.enabled {
            rows.push(CheckRow {
                id: spec.id.clone(),
                kind: spec.secrets.kind(),
                outcome: "disabled",
                detail: None,
            });
            continue;
        }

        attempted.push(spec.id.clone());
        let source = sources::build_source(spec).await?;

        let (outcome, detail) = match tokio::time::timeout(fetch_timeout, source.fetch()).await {
            Ok(Ok(config)) => match probe.check(&config).await {
                ProbeOutcome::Pass => {
                    usable += 1;
                    ("usable", None)
                }
                ProbeOutcome::Fail { target, reason } => {
                    ("probe-failed", Some(format!("{target}: {reason}")))
                }
            },
            Ok(Err(e)) => ("fetch-failed", Some(e.to_string())),
            Err(_) => (
                "fetch-failed",
                Some(format!("timed out after {}s", fetch_timeout.as_secs())),
            ),
        };

        rows.push(CheckRow {
            id: spec.id.clone(),
            kind: spec.secrets.kind(),
            outcome,
            detail,
        });
    }

    match args.format {
        ReportFormat::Text => {
            for row in &rows {
                let mark = match row.outcome {
                    "usable" => "\u{2713}",
                    "disabled" => "-",
                    _ => "\u{2717}",
                };
                match &row.detail {
                    Some(detail) => {
                        println!("{mark} {} ({}): {} \u{2014} {detail}", row.id, row.kind, row.outcome);
                    }
                    None => println!("{mark} {} ({}): {}", row.id, row.kind, row.outcome),
                }
            }
            println!("\n{usable}/{} providers usable", attempted.len());
        }
        ReportFormat::Json => {
            let json_rows: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "source": r.kind,
                        "outcome": r.outcome,
                        "detail": r.detail,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "usable": usable,
                    "providers": json_rows,
                })
            );
        }
    }

    if usable == 0 {
        return Err(HandoverError::AllProvidersUnavailable { attempted });
    }

    Ok(())
}
