//! Structured error handling for the strategy engine.
//!
//! Every failure that reaches the service boundary is a [`StrategyError`]
//! carrying a stable [`ErrorCode`]. Window-level fit failures never reach
//! this layer: they are absorbed into undefined forecasts by the worker pool.
//! Missing or empty price data is not an error either; the run returns an
//! empty report.
//!
//! | Code | Raised when | Boundary behavior |
//! |------|-------------|-------------------|
//! | `INVALID_REQUEST` | Missing or unparsable request fields | Error shape, pipeline not run |
//! | `INTERNAL_ERROR` | Blocking task failure | Error shape |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for the strategy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid request format or missing fields.
    InvalidRequest,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors surfaced by a strategy run.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The request was rejected before the pipeline ran.
    #[error("{message}")]
    InvalidRequest {
        /// Human-readable message.
        message: String,
    },

    /// Unexpected failure outside the pipeline stages.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable message.
        message: String,
    },
}

impl StrategyError {
    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }
}
