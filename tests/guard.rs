//! Integration tests for the per-request guard: throttled lazy checks
//! and emergency failover.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::build_controller;
use handover::error::ResourceError;
use handover::guard::RequestGuard;

#[tokio::test]
async fn connectivity_error_triggers_failover_and_one_retry() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();

    // Primary goes dark between the resolution and the request.
    t.sources["primary"].fail_with("outage");

    let guard = RequestGuard::new(t.controller.clone(), Duration::from_secs(60));
    let attempts = Arc::new(AtomicUsize::new(0));

    let outcome = guard
        .run(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ResourceError::Database("server has gone away".into()))
                } else {
                    Ok("served")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome.value, "served");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(outcome.notice.as_deref().unwrap().contains("secondary"));
    assert_eq!(
        t.controller.current_provider().await.as_deref(),
        Some("secondary")
    );

    let snapshot = t.controller.snapshot().await;
    assert_eq!(snapshot.stats.emergency_failovers, 1);
}

#[tokio::test]
async fn non_connectivity_error_propagates_without_resolution() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();
    let resolutions_before = t.controller.snapshot().await.stats.resolutions;

    let guard = RequestGuard::new(t.controller.clone(), Duration::from_secs(60));
    let attempts = Arc::new(AtomicUsize::new(0));

    let err = guard
        .run(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ResourceError::Other("validation failed".into()))
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ResourceError::Other(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    let snapshot = t.controller.snapshot().await;
    assert_eq!(snapshot.stats.resolutions, resolutions_before);
    assert_eq!(snapshot.stats.emergency_failovers, 0);
}

#[tokio::test]
async fn retry_failure_surfaces_the_retry_error() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();

    let guard = RequestGuard::new(t.controller.clone(), Duration::from_secs(60));

    // Work that fails with a connectivity error every time.
    let err = guard
        .run(|| async {
            Err::<(), _>(ResourceError::Timeout("pool acquire timed out".into()))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ResourceError::Timeout(_)));
}

#[tokio::test]
async fn lazy_check_respects_throttle_window() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();
    let checks_after_resolve = t.probe.check_count();

    // Inside the window: no probe.
    let throttled = RequestGuard::new(t.controller.clone(), Duration::from_secs(60));
    throttled.run(|| async { Ok(()) }).await.unwrap();
    assert_eq!(t.probe.check_count(), checks_after_resolve);

    // Zero window: every request probes.
    let eager = RequestGuard::new(t.controller.clone(), Duration::ZERO);
    eager.run(|| async { Ok(()) }).await.unwrap();
    assert_eq!(t.probe.check_count(), checks_after_resolve + 1);
}

#[tokio::test]
async fn lazy_check_failure_switches_before_the_work_runs() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();

    // Active provider stops answering probes and fetches.
    t.probe.fail_provider("primary", "connection refused");
    t.sources["primary"].fail_with("outage");

    let guard = RequestGuard::new(t.controller.clone(), Duration::ZERO);
    let outcome = guard.run(|| async { Ok("served") }).await.unwrap();

    assert_eq!(outcome.value, "served");
    assert!(outcome.notice.as_deref().unwrap().contains("secondary"));
    assert_eq!(
        t.controller.current_provider().await.as_deref(),
        Some("secondary")
    );
}
