//! Volatility forecaster configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtest::SimplexConfig;

/// Forecaster configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Estimation window in trading days, also used for realized variance.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Maximum simplex iterations per fit.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Convergence threshold on the negative log-likelihood.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Earliest daily row used for forecasting; `null` uses all history.
    #[serde(default = "default_history_start")]
    pub history_start: Option<NaiveDate>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            history_start: default_history_start(),
        }
    }
}

impl ForecastConfig {
    /// Simplex settings for the likelihood search.
    #[must_use]
    pub fn simplex(&self) -> SimplexConfig {
        SimplexConfig {
            max_iterations: self.max_iterations,
            f_tolerance: self.tolerance,
            ..SimplexConfig::default()
        }
    }
}

const fn default_window() -> usize {
    180
}

const fn default_max_iterations() -> usize {
    2000
}

const fn default_tolerance() -> f64 {
    1e-8
}

fn default_history_start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2020, 1, 1)
}
