//! HTTP readiness probe against in-process servers.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use fluentest_core::{LaunchPlan, ProbeError, ReadinessProbe};
use fluentest_runtime::HttpReadinessProbe;
use tokio_util::sync::CancellationToken;

fn plan_for(base: url::Url) -> LaunchPlan {
    LaunchPlan::new("server")
        .with_base_url(base)
        .with_poll_interval(Duration::from_millis(20))
}

#[tokio::test]
async fn test_ready_when_root_returns_200() {
    let base = common::serve(common::ok_root()).await;
    let probe = HttpReadinessProbe::new().unwrap();

    let ready = probe
        .wait_until_ready(
            &plan_for(base.clone()).with_startup_timeout(Duration::from_secs(5)),
            &CancellationToken::new(),
        )
        .await
        .expect("probe should succeed");

    assert_eq!(ready, base);
}

#[tokio::test]
async fn test_health_endpoint_is_enough_when_root_is_missing() {
    let app = Router::new().route("/health", get(|| async { StatusCode::NO_CONTENT }));
    let base = common::serve(app).await;
    let probe = HttpReadinessProbe::new().unwrap();

    let ready = probe
        .wait_until_ready(
            &plan_for(base.clone()).with_health_check_endpoint("/health"),
            &CancellationToken::new(),
        )
        .await
        .expect("probe should succeed");

    assert_eq!(ready, base.join("/health").unwrap());
}

#[tokio::test]
async fn test_non_success_responses_are_retried() {
    let (app, hits) = common::flaky_root(3);
    let base = common::serve(app).await;
    let probe = HttpReadinessProbe::new().unwrap();

    probe
        .wait_until_ready(&plan_for(base), &CancellationToken::new())
        .await
        .expect("probe should eventually succeed");

    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_unreachable_port_times_out() {
    let probe = HttpReadinessProbe::new().unwrap();
    let plan = plan_for(common::unreachable()).with_startup_timeout(Duration::from_millis(50));

    let err = probe
        .wait_until_ready(&plan, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ProbeError::Timeout { elapsed, attempts, .. } => {
            assert!(elapsed >= Duration::from_millis(50));
            assert!(attempts >= 1);
        }
        other => panic!("expected timeout, got {other}"),
    }
}

#[tokio::test]
async fn test_slow_endpoint_is_bounded_by_request_timeout() {
    let app = Router::new().route(
        "/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "late"
        }),
    );
    let base = common::serve(app).await;
    let probe = HttpReadinessProbe::new()
        .unwrap()
        .with_request_timeout(Duration::from_millis(100));
    let plan = plan_for(base).with_startup_timeout(Duration::from_millis(300));

    let started = std::time::Instant::now();
    let err = probe
        .wait_until_ready(&plan, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancellation_interrupts_polling() {
    let probe = HttpReadinessProbe::new().unwrap();
    let plan = plan_for(common::unreachable()).with_startup_timeout(Duration::from_secs(60));
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), probe.wait_until_ready(&plan, &cancel))
        .await
        .expect("cancellation was not prompt")
        .unwrap_err();

    assert!(matches!(err, ProbeError::Cancelled { .. }));
}
