//! `handover status` — check a running instance.
//!
//! Sends a `GET /status` request to the specified URL and displays
//! the response as formatted text or raw JSON.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::StatusArgs;
use crate::error::HandoverError;
use crate::status::StatusResponse;

pub async fn execute(args: StatusArgs) -> Result<(), HandoverError> {
    let url = format!("{}/status", args.url.trim_end_matches('/'));
    let uri: hyper::Uri =
        url.parse().map_err(
            |e: hyper::http::uri::InvalidUri| HandoverError::UriParse {
                source: Box::new(e),
            },
        )?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| HandoverError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| HandoverError::HttpRequest {
            source: "status check timed out after 10s".into(),
        })?
        .map_err(|e| HandoverError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| HandoverError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(HandoverError::StatusCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let body_str = String::from_utf8_lossy(&body);
    match serde_json::from_str::<StatusResponse>(&body_str) {
        Ok(report) => {
            let uptime = format_uptime(report.uptime_seconds);
            println!("\u{2713} handover is {} ({})", report.status, args.url);
            println!("  version:       {} ({})", report.version, report.commit);
            println!("  uptime:        {uptime}");
            match &report.active {
                Some(active) => {
                    println!(
                        "  provider:      {} (payload {}, switched {}s ago)",
                        active.provider, active.payload_version, active.switched_ago_seconds
                    );
                    if let Some(ago) = active.last_health_check_ago_seconds {
                        println!("  last check:    {ago}s ago");
                    }
                }
                None => println!("  provider:      none"),
            }
            for provider in &report.providers {
                let detail = provider
                    .last_error
                    .as_deref()
                    .map(|e| format!(" \u{2014} {e}"))
                    .unwrap_or_default();
                println!("  {}:  {}{detail}", provider.id, provider.state);
            }
            println!(
                "  resolutions:   {} total, {} failovers, {} emergency",
                report.stats.resolutions, report.stats.failovers, report.stats.emergency_failovers
            );
        }
        Err(e) => {
            eprintln!("Failed to parse status response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
