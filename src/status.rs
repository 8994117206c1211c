//! `GET /status` endpoint handler.
//!
//! Returns a [`StatusResponse`] JSON payload containing the overall
//! condition, the active provider, per-provider availability, and
//! cumulative resolution statistics. Read-only: serving a status
//! request never triggers a resolution.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub commit: String,
    pub uptime_seconds: u64,
    pub active: Option<ActiveStatus>,
    pub providers: Vec<ProviderEntry>,
    pub stats: StatsEntry,
}

#[derive(Serialize, Deserialize)]
pub struct ActiveStatus {
    pub provider: String,
    pub payload_version: String,
    pub switched_ago_seconds: u64,
    pub last_health_check_ago_seconds: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct ProviderEntry {
    pub id: String,
    pub state: String,
    pub enabled: bool,
    pub last_checked_ago_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StatsEntry {
    pub resolutions: u64,
    pub failovers: u64,
    pub emergency_failovers: u64,
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.controller.snapshot().await;

    let active = snapshot.current_provider.as_ref().map(|provider| ActiveStatus {
        provider: provider.clone(),
        payload_version: snapshot.active_version.clone().unwrap_or_default(),
        switched_ago_seconds: snapshot.switched_ago.map_or(0, |d| d.as_secs()),
        last_health_check_ago_seconds: snapshot.last_health_check_ago.map(|d| d.as_secs()),
    });

    let providers = snapshot
        .providers
        .iter()
        .map(|p| ProviderEntry {
            id: p.id.clone(),
            state: p.state.to_string(),
            enabled: !p.disabled,
            last_checked_ago_seconds: p.last_checked_ago.map(|d| d.as_secs()),
            last_error: p.last_error.clone(),
        })
        .collect();

    Json(StatusResponse {
        status: snapshot.health().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("HANDOVER_GIT_SHORT").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active,
        providers,
        stats: StatsEntry {
            resolutions: snapshot.stats.resolutions,
            failovers: snapshot.stats.failovers,
            emergency_failovers: snapshot.stats.emergency_failovers,
        },
    })
}
