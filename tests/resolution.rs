//! Integration tests for resolution ordering, fallback, and recovery.

mod common;

use common::build_controller;
use handover::error::HandoverError;
use handover::registry::ProviderState;

fn provider_state(
    snapshot: &handover::controller::ControllerSnapshot,
    id: &str,
) -> ProviderState {
    snapshot
        .providers
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.state)
        .unwrap()
}

#[tokio::test]
async fn static_priority_wins_when_all_healthy() {
    let t = build_controller(&["primary", "secondary"], None);

    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "primary");
    assert!(resolution.switched_from.is_none());
    assert_eq!(
        t.controller.current_provider().await.as_deref(),
        Some("primary")
    );
    // The winner is installed without touching the runner-up.
    assert_eq!(t.sources["secondary"].fetch_count(), 0);
}

#[tokio::test]
async fn environment_hint_overrides_static_priority() {
    let t = build_controller(&["primary", "secondary"], Some("secondary"));

    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "secondary");
    assert_eq!(t.sources["primary"].fetch_count(), 0);
}

#[tokio::test]
async fn fetch_failure_falls_back_and_marks_unhealthy() {
    let t = build_controller(&["primary", "secondary"], None);
    t.sources["primary"].fail_with("store unreachable");

    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "secondary");

    let snapshot = t.controller.snapshot().await;
    assert_eq!(provider_state(&snapshot, "primary"), ProviderState::Unhealthy);
    assert_eq!(provider_state(&snapshot, "secondary"), ProviderState::Healthy);
    let primary = snapshot.providers.iter().find(|p| p.id == "primary").unwrap();
    assert!(primary.last_error.as_deref().unwrap().contains("store unreachable"));
}

#[tokio::test]
async fn probe_failure_falls_back() {
    let t = build_controller(&["primary", "secondary"], None);
    t.probe.fail_provider("primary", "connection refused");

    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "secondary");
    // Primary was fetched (then failed its probe), secondary passed both.
    assert_eq!(t.sources["primary"].fetch_count(), 1);
    assert_eq!(t.sources["secondary"].fetch_count(), 1);

    let snapshot = t.controller.snapshot().await;
    assert_eq!(provider_state(&snapshot, "primary"), ProviderState::Unhealthy);
}

#[tokio::test]
async fn all_failing_at_startup_leaves_nothing_installed() {
    let t = build_controller(&["primary", "secondary"], None);
    t.probe.fail_provider("primary", "timeout");
    t.probe.fail_provider("secondary", "timeout");

    let err = t.controller.resolve().await.unwrap_err();

    match err {
        HandoverError::AllProvidersUnavailable { attempted } => {
            assert_eq!(attempted, vec!["primary", "secondary"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(t.controller.active_config().await.is_none());
}

#[tokio::test]
async fn all_failing_later_keeps_stale_active() {
    let t = build_controller(&["primary", "secondary"], None);
    t.controller.resolve().await.unwrap();

    t.sources["primary"].fail_with("outage");
    t.sources["secondary"].fail_with("outage");

    let err = t.controller.resolve().await.unwrap_err();
    assert!(matches!(err, HandoverError::AllProvidersUnavailable { .. }));

    // Stale but present: dependents keep the last-known config.
    let active = t.controller.active_config().await.unwrap();
    assert_eq!(active.provider_id, "primary");
}

#[tokio::test]
async fn recovery_flips_provider_back_to_healthy() {
    let t = build_controller(&["primary", "secondary"], None);

    t.probe.fail_provider("primary", "connection refused");
    let resolution = t.controller.resolve().await.unwrap();
    assert_eq!(resolution.provider_id, "secondary");

    // Primary comes back; the next resolution prefers it again.
    t.probe.pass_provider("primary");
    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "primary");
    assert_eq!(resolution.switched_from.as_deref(), Some("secondary"));

    let snapshot = t.controller.snapshot().await;
    assert_eq!(provider_state(&snapshot, "primary"), ProviderState::Healthy);
}

#[tokio::test]
async fn disabled_provider_is_never_tried() {
    let specs = vec![common::spec("primary", false), common::spec("secondary", true)];
    let t = common::build_controller_with_specs(&specs, None);

    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "secondary");
    assert_eq!(t.sources["primary"].fetch_count(), 0);
}

#[tokio::test]
async fn hint_for_ineligible_provider_is_ignored() {
    let specs = vec![common::spec("primary", true), common::spec("secondary", false)];
    let t = common::build_controller_with_specs(&specs, Some("secondary"));

    let resolution = t.controller.resolve().await.unwrap();

    assert_eq!(resolution.provider_id, "primary");
    assert_eq!(t.sources["secondary"].fetch_count(), 0);
}

#[tokio::test]
async fn degraded_when_serving_beside_an_unhealthy_alternate() {
    let t = build_controller(&["primary", "secondary"], None);
    t.sources["primary"].fail_with("outage");
    t.controller.resolve().await.unwrap();

    let snapshot = t.controller.snapshot().await;
    assert_eq!(snapshot.health(), "degraded");
    assert_eq!(snapshot.current_provider.as_deref(), Some("secondary"));

    // Primary recovers; a later resolution restores full health.
    t.sources["primary"].succeed();
    t.controller.resolve().await.unwrap();
    let snapshot = t.controller.snapshot().await;
    assert_eq!(snapshot.health(), "active");
}
