//! Port Interfaces
//!
//! ## Driven Ports (Outbound)
//!
//! - `AnalyticsBackend`: the strategy engine's analysis and health endpoints

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Analysis request body. Both fields must be present strings; their
/// content is validated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// First date of the backtest range.
    pub start_date: String,
    /// Last date of the backtest range.
    pub end_date: String,
}

/// Failure talking to the strategy engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Connection refused, reset or otherwise failed.
    #[error("{0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Engine answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Engine body was not valid JSON.
    #[error("invalid upstream body: {0}")]
    Decode(String),

    /// The request could not be built locally.
    #[error("{0}")]
    Client(String),
}

impl BackendError {
    /// Whether the fault lies with the engine or the network rather than
    /// the gateway itself.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        !matches!(self, Self::Client(_))
    }
}

/// Strategy engine operations used by the gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// Forward an analysis request and return the engine's JSON body.
    async fn analyze_garch(&self, request: &AnalyzeRequest) -> Result<Value, BackendError>;

    /// Probe the engine and return its reported `status`.
    async fn health(&self) -> Result<String, BackendError>;
}
