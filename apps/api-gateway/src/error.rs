//! Gateway errors and their HTTP responses.
//!
//! Every error renders as `{"detail": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::application::BackendError;

/// Errors surfaced by gateway handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Request body is missing a field or is not valid JSON.
    #[error("{0}")]
    InvalidRequest(String),

    /// Strategy engine unreachable, slow or failing.
    #[error("Analytics service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Fault inside the gateway.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        if err.is_upstream() {
            Self::UpstreamUnavailable(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(BackendError::Transport("connection refused".into()), StatusCode::BAD_GATEWAY ; "transport")]
    #[test_case(BackendError::Status { status: 503 }, StatusCode::BAD_GATEWAY ; "status")]
    #[test_case(BackendError::Decode("eof".into()), StatusCode::BAD_GATEWAY ; "decode")]
    #[test_case(BackendError::Client("builder".into()), StatusCode::INTERNAL_SERVER_ERROR ; "client")]
    fn maps_backend_errors(err: BackendError, expected: StatusCode) {
        assert_eq!(GatewayError::from(err).status_code(), expected);
    }

    #[test]
    fn detail_carries_prefix() {
        let err = GatewayError::from(BackendError::Status { status: 500 });
        assert_eq!(
            err.to_string(),
            "Analytics service unavailable: upstream returned HTTP 500"
        );

        let err = GatewayError::Internal("boom".into());
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[tokio::test]
    async fn renders_detail_body() {
        let response =
            GatewayError::InvalidRequest("missing field `end_date`".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "missing field `end_date`");
    }
}
