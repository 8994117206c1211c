//! Integration tests for the status endpoint.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use common::{build_controller, TestController};
use handover::server::{self, AppState};
use handover::status::StatusResponse;

async fn start_status_server(t: &TestController) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let state = Arc::new(AppState {
        controller: t.controller.clone(),
        start_time: Instant::now(),
    });
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

#[tokio::test]
async fn status_reports_active_provider() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();

    let (addr, shutdown) = start_status_server(&t).await;

    let body: StatusResponse = reqwest::get(format!("http://{addr}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.status, "active");
    let active = body.active.unwrap();
    assert_eq!(active.provider, "primary");
    assert_eq!(body.providers.len(), 2);
    assert_eq!(body.stats.resolutions, 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn status_reports_unavailable_before_first_resolution() {
    let t = build_controller(&["primary", "secondary"], None);

    let (addr, shutdown) = start_status_server(&t).await;

    let body: StatusResponse = reqwest::get(format!("http://{addr}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.status, "unavailable");
    assert!(body.active.is_none());
    assert!(body.providers.iter().all(|p| p.state == "unknown"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn status_reports_degraded_after_failover() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();
    t.probe.fail_provider("primary", "connection refused");
    t.controller.resolve().await.unwrap();

    let (addr, shutdown) = start_status_server(&t).await;

    let body: StatusResponse = reqwest::get(format!("http://{addr}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.status, "degraded");
    assert_eq!(body.active.unwrap().provider, "secondary");
    let primary = body.providers.iter().find(|p| p.id == "primary").unwrap();
    assert_eq!(primary.state, "unhealthy");
    assert!(primary.last_error.is_some());
    assert_eq!(body.stats.failovers, 1);

    let _ = shutdown.send(());
}
