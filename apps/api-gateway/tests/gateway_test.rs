//! Gateway forwarding tests against a stub strategy engine.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use api_gateway::{GatewayConfig, GatewayState, HttpAnalyticsBackend, create_router};

fn config_for(uri: &str) -> GatewayConfig {
    GatewayConfig {
        analytics_url: uri.to_string(),
        analyze_timeout: Duration::from_secs(5),
        health_timeout: Duration::from_secs(1),
        ..GatewayConfig::default()
    }
}

fn gateway(config: &GatewayConfig) -> axum::Router {
    let backend = HttpAnalyticsBackend::new(config).unwrap();
    create_router(GatewayState::new(Arc::new(backend)))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn analyze(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze/garch")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

const REQUEST: &str = r#"{"start_date": "2021-01-04", "end_date": "2021-03-31"}"#;

#[tokio::test]
async fn test_forwards_and_returns_engine_body() {
    let engine = MockServer::start().await;
    let report = json!({
        "daily_signals": [{"date": "2021-01-04", "signal_daily": 1, "predictions": 0.0002}],
        "strategy_returns": [{"date": "2021-01-04", "daily_return": 0.001}],
        "cumulative_return": 0.001
    });
    Mock::given(method("POST"))
        .and(path("/analyze/garch"))
        .and(body_json(json!({"start_date": "2021-01-04", "end_date": "2021-03-31"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(report.clone()))
        .expect(1)
        .mount(&engine)
        .await;

    let (status, body) = send(gateway(&config_for(&engine.uri())), analyze(REQUEST)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, report);
}

#[tokio::test]
async fn test_engine_error_body_passes_through() {
    let engine = MockServer::start().await;
    let error_body = json!({
        "status": "error",
        "message": "Invalid date: 'yesterday'",
        "code": "INVALID_REQUEST",
        "daily_signals": [],
        "strategy_returns": [],
        "cumulative_return": 0.0
    });
    Mock::given(method("POST"))
        .and(path("/analyze/garch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(error_body.clone()))
        .mount(&engine)
        .await;

    let (status, body) = send(
        gateway(&config_for(&engine.uri())),
        analyze(r#"{"start_date": "yesterday", "end_date": "2021-03-31"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, error_body);
}

#[tokio::test]
async fn test_missing_field_is_rejected_locally() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&engine)
        .await;

    let (status, body) = send(
        gateway(&config_for(&engine.uri())),
        analyze(r#"{"end_date": "2021-03-31"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("start_date"));
}

#[tokio::test]
async fn test_upstream_server_error_maps_to_bad_gateway() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/garch"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&engine)
        .await;

    let (status, body) = send(gateway(&config_for(&engine.uri())), analyze(REQUEST)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["detail"],
        "Analytics service unavailable: upstream returned HTTP 500"
    );
}

#[tokio::test]
async fn test_non_json_upstream_body_maps_to_bad_gateway() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/garch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&engine)
        .await;

    let (status, body) = send(gateway(&config_for(&engine.uri())), analyze(REQUEST)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Analytics service unavailable:")
    );
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let engine = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/garch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&engine)
        .await;

    let config = GatewayConfig {
        analyze_timeout: Duration::from_millis(200),
        ..config_for(&engine.uri())
    };
    let (status, body) = send(gateway(&config), analyze(REQUEST)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_upstream_maps_to_bad_gateway() {
    let uri = {
        let engine = MockServer::start().await;
        engine.uri()
    };

    let (status, body) = send(gateway(&config_for(&uri)), analyze(REQUEST)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Analytics service unavailable:")
    );
}

#[tokio::test]
async fn test_health_reports_engine_status() {
    let engine = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy", "version": "0.1.0"})),
        )
        .mount(&engine)
        .await;

    let (status, body) = send(gateway(&config_for(&engine.uri())), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"api": "healthy", "analytics_service": "healthy"}));
}

#[tokio::test]
async fn test_health_when_engine_is_down() {
    let engine = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&engine)
        .await;

    let (status, body) = send(gateway(&config_for(&engine.uri())), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "healthy");
    assert_eq!(body["analytics_service"], "unavailable");
    assert_eq!(body["error"], "upstream returned HTTP 503");
}

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(gateway(&GatewayConfig::default()), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
}
