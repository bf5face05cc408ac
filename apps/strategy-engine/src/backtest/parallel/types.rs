//! Core types for forecast windows and their results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One rolling estimation window.
///
/// Holds exactly the returns strictly preceding `target_date`; the fit never
/// sees the target day's own return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastWindow<'a> {
    /// Position of the window in the batch (and of the forecast in the
    /// trimmed daily series).
    pub index: usize,

    /// Day the forecast is for.
    pub target_date: NaiveDate,

    /// Trailing log returns, oldest first.
    pub returns: &'a [Option<f64>],
}

impl ForecastWindow<'_> {
    /// Returns as plain floats, or `None` if any observation is undefined.
    #[must_use]
    pub fn defined_returns(&self) -> Option<Vec<f64>> {
        self.returns.iter().copied().collect()
    }
}

/// Result of fitting one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastJobResult {
    /// Window index.
    pub index: usize,

    /// Day the forecast is for.
    pub target_date: NaiveDate,

    /// One-step-ahead variance forecast, absent on any failure.
    pub forecast: Option<f64>,

    /// Failure description, if any.
    pub error: Option<String>,

    /// Fit time in microseconds.
    pub execution_time_us: u64,
}

/// Results of one forecast batch, in window order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastBatch {
    /// Per-window results, positionally aligned with the submitted windows.
    pub results: Vec<ForecastJobResult>,

    /// Wall-clock time for the batch.
    pub total_time_ms: u64,

    /// Windows submitted.
    pub windows: u64,

    /// Windows that produced a forecast.
    pub succeeded: u64,

    /// Windows without a forecast.
    pub failed: u64,
}

impl ForecastBatch {
    /// Forecast values in window order.
    #[must_use]
    pub fn forecasts(&self) -> Vec<Option<f64>> {
        self.results.iter().map(|r| r.forecast).collect()
    }

    /// Fraction of windows with a forecast (1.0 for an empty batch).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f64 {
        if self.windows == 0 {
            1.0
        } else {
            self.succeeded as f64 / self.windows as f64
        }
    }
}
