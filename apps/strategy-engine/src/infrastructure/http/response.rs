//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::backtest::{DailyReturn, DailySignalRecord};
use crate::error::{ErrorCode, StrategyError};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Failure body of `POST /analyze/garch`.
///
/// Carries the same series fields as a success, empty, so callers can read
/// either shape the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Stable error code.
    pub code: ErrorCode,
    /// Always empty.
    pub daily_signals: Vec<DailySignalRecord>,
    /// Always empty.
    pub strategy_returns: Vec<DailyReturn>,
    /// Always 0.
    pub cumulative_return: f64,
}

impl From<&StrategyError> for AnalyzeErrorResponse {
    fn from(err: &StrategyError) -> Self {
        Self {
            status: "error".to_string(),
            message: err.to_string(),
            code: err.code(),
            daily_signals: Vec::new(),
            strategy_returns: Vec::new(),
            cumulative_return: 0.0,
        }
    }
}
