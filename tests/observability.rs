//! Request metrics and trace correlation, driven through real routers.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::routing::{any, get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tower::ServiceExt;

use shipping_service::http::instrument;
use shipping_service::observability::{track_requests, Metrics};

use common::{app, get as send_get, request_count, sample};

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

/// A router with only the given routes, wrapped in the standard middleware stack.
fn instrumented(routes: Router, metrics: &Metrics) -> Router {
    instrument(routes, metrics.http().clone(), Duration::from_secs(5))
}

async fn boom() -> &'static str {
    panic!("handler exploded")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_balance_in_flight_gauge() {
    const REQUESTS: usize = 1000;

    let metrics = Metrics::new();
    let (open_tx, open_rx) = watch::channel(false);
    let routes = Router::new().route(
        "/gated",
        get(move || {
            let mut open = open_rx.clone();
            async move {
                let _ = open.wait_for(|open| *open).await;
                "done"
            }
        }),
    );
    let router = instrumented(routes, &metrics);

    let tasks: Vec<_> = (0..REQUESTS)
        .map(|_| {
            let router = router.clone();
            tokio::spawn(async move {
                router
                    .oneshot(Request::get("/gated").body(Body::empty()).unwrap())
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    while metrics.http().in_flight("GET", "/gated") < REQUESTS as i64 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    open_tx.send(true).unwrap();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(metrics.http().in_flight("GET", "/gated"), 0);
    assert_eq!(request_count(&metrics, "GET", "/gated", 200), REQUESTS as u64);
}

#[tokio::test]
async fn test_infrastructure_paths_are_not_recorded() {
    let (router, metrics) = app();

    for uri in ["/health", "/ready", "/metrics"] {
        let (status, _) = send_get(&router, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }

    let text = metrics.encode().unwrap();
    for path in ["/health", "/ready", "/metrics"] {
        assert!(!text.contains(&format!(r#"path="{path}""#)), "{path} was recorded");
    }
}

#[tokio::test]
async fn test_route_template_is_the_path_label() {
    let (router, metrics) = app();

    send_get(&router, "/api/v1/shipping/orders/1001").await;
    send_get(&router, "/api/v1/shipping/orders/1002").await;
    send_get(&router, "/api/v1/shipping/orders/9999").await;

    let text = metrics.encode().unwrap();
    assert!(!text.contains("/orders/1001"));
    assert_eq!(request_count(&metrics, "GET", "/api/v1/shipping/orders/{order_id}", 200), 2);
    assert_eq!(request_count(&metrics, "GET", "/api/v1/shipping/orders/{order_id}", 404), 1);
}

#[tokio::test]
async fn test_unmatched_route_is_labelled_unknown() {
    let (router, metrics) = app();

    let (status, _) = send_get(&router, "/api/v2/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(request_count(&metrics, "GET", "unknown", 404), 1);
    assert!(!metrics.encode().unwrap().contains("does-not-exist"));
}

#[tokio::test]
async fn test_nonstandard_method_is_bucketed() {
    let metrics = Metrics::new();
    let router = instrumented(Router::new().route("/any", any(|| async { "ok" })), &metrics);

    let req = Request::builder()
        .method(Method::from_bytes(b"PURGE").unwrap())
        .uri("/any")
        .body(Body::empty())
        .unwrap();
    router.oneshot(req).await.unwrap();

    assert_eq!(request_count(&metrics, "OTHER", "/any", 200), 1);
    assert!(!metrics.encode().unwrap().contains("PURGE"));
}

#[tokio::test]
async fn test_request_and_response_sizes() {
    let metrics = Metrics::new();
    let router = instrumented(
        Router::new().route("/echo", post(|body: String| async move { body })),
        &metrics,
    );

    let req = Request::post("/echo")
        .header("content-length", "5")
        .body(Body::from("hello"))
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let text = metrics.encode().unwrap();
    let labels = r#"{method="POST",path="/echo",code="200"}"#;
    assert_eq!(sample(&text, &format!("request_size_bytes_sum{labels}")), Some(5.0));
    assert_eq!(sample(&text, &format!("response_size_bytes_sum{labels}")), Some(5.0));
}

#[tokio::test]
async fn test_panic_in_full_stack_is_recorded_as_server_error() {
    let metrics = Metrics::new();
    let router = instrumented(Router::new().route("/boom", get(boom)), &metrics);

    let res = router
        .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"error":"Internal server error"}"#);
    assert_eq!(metrics.http().in_flight("GET", "/boom"), 0);
    assert_eq!(request_count(&metrics, "GET", "/boom", 500), 1);
}

#[tokio::test]
async fn test_panic_propagates_after_completion() {
    let metrics = Metrics::new();
    let router = Router::new()
        .route("/boom", get(boom))
        .layer(middleware::from_fn_with_state(metrics.http().clone(), track_requests));

    let outcome = tokio::spawn(router.oneshot(Request::get("/boom").body(Body::empty()).unwrap())).await;

    assert!(outcome.unwrap_err().is_panic());
    assert_eq!(metrics.http().in_flight("GET", "/boom"), 0);
    assert_eq!(request_count(&metrics, "GET", "/boom", 500), 1);
}

#[tokio::test]
async fn test_cancelled_request_completes() {
    let metrics = Metrics::new();
    let started = Arc::new(Notify::new());
    let handler_started = started.clone();
    let routes = Router::new().route(
        "/slow",
        get(move || {
            let started = handler_started.clone();
            async move {
                started.notify_one();
                std::future::pending::<()>().await;
                "unreachable"
            }
        }),
    );
    let router = instrumented(routes, &metrics);

    let task = tokio::spawn(router.oneshot(Request::get("/slow").body(Body::empty()).unwrap()));
    started.notified().await;
    assert_eq!(metrics.http().in_flight("GET", "/slow"), 1);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert_eq!(metrics.http().in_flight("GET", "/slow"), 0);
    assert_eq!(request_count(&metrics, "GET", "/slow", 499), 1);
}

#[tokio::test]
async fn test_traced_request_attaches_exemplar() {
    let (router, metrics) = app();

    let req = Request::get("/api/v1/shipping/estimate?origin=NY&destination=CA&weight=2")
        .header("traceparent", TRACEPARENT)
        .body(Body::empty())
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let text = metrics.encode().unwrap();
    assert!(text.contains(r#"# {traceID="4bf92f3577b34da6a3ce929d0e0e4736"}"#));
    assert!(!text.contains("trace_id"));
}

#[tokio::test]
async fn test_untraced_request_has_no_exemplar() {
    let (router, metrics) = app();

    let (status, _) =
        send_get(&router, "/api/v1/shipping/estimate?origin=NY&destination=CA&weight=2").await;
    assert_eq!(status, StatusCode::OK);

    let text = metrics.encode().unwrap();
    assert_eq!(request_count(&metrics, "GET", "/api/v1/shipping/estimate", 200), 1);
    assert!(!text.contains("traceID"));
}

#[tokio::test]
async fn test_malformed_traceparent_is_ignored() {
    let (router, metrics) = app();

    let req = Request::get("/api/v1/shipping/estimate?origin=NY&destination=CA&weight=2")
        .header("traceparent", "00-00000000000000000000000000000000-00f067aa0ba902b7-01")
        .body(Body::empty())
        .unwrap();
    let res = router.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(!metrics.encode().unwrap().contains("traceID"));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (router, _) = app();

    let req = Request::get("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let res = router.clone().oneshot(req).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-42");

    let res = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!res.headers()["x-request-id"].is_empty());
}
