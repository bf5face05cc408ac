//! HTTP Routes
//!
//! # Endpoints
//!
//! - `GET /` - Banner
//! - `POST /api/analyze/garch` - Forward a backtest request to the engine
//! - `GET /api/health` - Gateway and engine status
//!
//! Every route answers cross-origin requests from any origin, so a browser
//! frontend can call the gateway directly.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::application::{AnalyticsBackend, AnalyzeRequest};
use crate::error::GatewayError;

/// Shared state for gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    backend: Arc<dyn AnalyticsBackend>,
}

impl GatewayState {
    /// Create handler state around a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn AnalyticsBackend>) -> Self {
        Self { backend }
    }
}

/// Banner response.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Human-readable banner.
    pub message: String,
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Gateway status; always "healthy" when it can answer.
    pub api: String,
    /// Engine status, or "unavailable".
    pub analytics_service: String,
    /// Probe failure, when the engine is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create the gateway router.
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/analyze/garch", post(analyze_garch))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Volatility strategy API gateway".to_string(),
    })
}

async fn analyze_garch(
    State(state): State<GatewayState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected analysis request");
        GatewayError::InvalidRequest(rejection.body_text())
    })?;

    tracing::info!(
        start_date = %request.start_date,
        end_date = %request.end_date,
        "Forwarding analysis request"
    );

    match state.backend.analyze_garch(&request).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            tracing::error!(error = %e, "Analysis request failed");
            Err(e.into())
        }
    }
}

async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let response = match state.backend.health().await {
        Ok(status) => HealthResponse {
            api: "healthy".to_string(),
            analytics_service: status,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Analytics service health probe failed");
            HealthResponse {
                api: "healthy".to_string(),
                analytics_service: "unavailable".to_string(),
                error: Some(e.to_string()),
            }
        }
    };
    Json(response)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::application::{BackendError, MockAnalyticsBackend};

    fn router(backend: MockAnalyticsBackend) -> Router {
        create_router(GatewayState::new(Arc::new(backend)))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
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

    #[tokio::test]
    async fn forwards_request_fields() {
        let mut backend = MockAnalyticsBackend::new();
        backend
            .expect_analyze_garch()
            .withf(|req| req.start_date == "2021-01-01" && req.end_date == "2021-03-01")
            .times(1)
            .returning(|_| Ok(serde_json::json!({"cumulative_return": 0.1})));

        let (status, body) = call(
            router(backend),
            analyze(r#"{"start_date": "2021-01-01", "end_date": "2021-03-01"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cumulative_return"], 0.1);
    }

    #[tokio::test]
    async fn missing_field_never_reaches_backend() {
        let mut backend = MockAnalyticsBackend::new();
        backend.expect_analyze_garch().times(0);

        let (status, body) =
            call(router(backend), analyze(r#"{"start_date": "2021-01-01"}"#)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("end_date"));
    }

    #[tokio::test]
    async fn client_fault_is_internal_error() {
        let mut backend = MockAnalyticsBackend::new();
        backend
            .expect_analyze_garch()
            .returning(|_| Err(BackendError::Client("invalid header".into())));

        let (status, body) = call(
            router(backend),
            analyze(r#"{"start_date": "2021-01-01", "end_date": "2021-03-01"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Internal error: invalid header");
    }

    #[tokio::test]
    async fn health_reports_unavailable_engine() {
        let mut backend = MockAnalyticsBackend::new();
        backend
            .expect_health()
            .returning(|| Err(BackendError::Transport("connection refused".into())));

        let (status, body) = call(
            router(backend),
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["api"], "healthy");
        assert_eq!(body["analytics_service"], "unavailable");
        assert_eq!(body["error"], "connection refused");
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let mut backend = MockAnalyticsBackend::new();
        backend.expect_analyze_garch().times(0);

        let response = router(backend)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/analyze/garch")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.contains_key("access-control-allow-methods"));
    }

    #[tokio::test]
    async fn simple_request_carries_allow_origin() {
        let mut backend = MockAnalyticsBackend::new();
        backend
            .expect_health()
            .returning(|| Ok("healthy".to_string()));

        let response = router(backend)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn health_omits_error_when_engine_is_up() {
        let mut backend = MockAnalyticsBackend::new();
        backend
            .expect_health()
            .returning(|| Ok("healthy".to_string()));

        let (_, body) = call(
            router(backend),
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(body["analytics_service"], "healthy");
        assert!(body.get("error").is_none());
    }
}
