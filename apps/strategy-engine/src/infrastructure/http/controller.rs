//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that runs the strategy on a blocking thread.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info, warn};

use crate::backtest::IntradayVolatilityStrategy;
use crate::error::{ErrorCode, StrategyError};
use crate::observability::record_http_request;

use super::request::AnalyzeRequest;
use super::response::{AnalyzeErrorResponse, HealthResponse};

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Strategy run for each analysis request.
    pub strategy: Arc<IntradayVolatilityStrategy>,
    /// Application version.
    pub version: String,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub fn new(strategy: IntradayVolatilityStrategy) -> Self {
        Self {
            strategy: Arc::new(strategy),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze/garch", post(analyze_garch))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Strategy analysis endpoint.
///
/// Failures are reported with HTTP 200 and the error body.
async fn analyze_garch(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();

    let range = match payload {
        Ok(Json(request)) => request.date_range(),
        Err(rejection) => Err(StrategyError::invalid_request(rejection.body_text())),
    };
    let range = match range {
        Ok(range) => range,
        Err(e) => {
            warn!(error = %e, "Rejected analysis request");
            return error_response(&e, started);
        }
    };

    info!(start = %range.start, end = %range.end, "Running strategy");
    let strategy = Arc::clone(&state.strategy);
    let outcome = tokio::task::spawn_blocking(move || strategy.run(range))
        .await
        .map_err(|e| StrategyError::internal(e.to_string()))
        .and_then(|result| result);

    match outcome {
        Ok(report) => {
            record_http_request("/analyze/garch", "ok", started.elapsed());
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            if e.code() == ErrorCode::InternalError {
                error!(error = %e, "Strategy run failed");
            }
            error_response(&e, started)
        }
    }
}

fn error_response(err: &StrategyError, started: Instant) -> Response {
    record_http_request("/analyze/garch", err.code().reason(), started.elapsed());
    (StatusCode::OK, Json(AnalyzeErrorResponse::from(err))).into_response()
}
