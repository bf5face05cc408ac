//! Rolling-window layout for the volatility forecaster.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::parallel::ForecastWindow;
use super::series::DailyBar;

/// A daily bar with its one-step-ahead variance forecast attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastedDay {
    /// Trading date.
    pub date: NaiveDate,
    /// Trailing realized variance.
    pub realized_variance: Option<f64>,
    /// Forecast for this date, fitted on the preceding window only.
    pub forecast: Option<f64>,
}

/// Log returns of a daily series, index-aligned with it.
#[must_use]
pub fn daily_returns(series: &[DailyBar]) -> Vec<Option<f64>> {
    series.iter().map(|bar| bar.log_return).collect()
}

/// One window per day from index `width` onward, in date order.
///
/// `returns` must be index-aligned with `series`.
#[must_use]
pub fn build_windows<'a>(
    series: &[DailyBar],
    returns: &'a [Option<f64>],
    width: usize,
) -> Vec<ForecastWindow<'a>> {
    let len = series.len().min(returns.len());
    if width == 0 || len <= width {
        return Vec::new();
    }

    (width..len)
        .map(|i| ForecastWindow {
            index: i - width,
            target_date: series[i].date,
            returns: &returns[i - width..i],
        })
        .collect()
}

/// Drop the first `width` rows and attach forecasts by position.
#[must_use]
pub fn attach_forecasts(
    series: &[DailyBar],
    forecasts: &[Option<f64>],
    width: usize,
) -> Vec<ForecastedDay> {
    series
        .iter()
        .skip(width)
        .zip(forecasts)
        .map(|(bar, forecast)| ForecastedDay {
            date: bar.date,
            realized_variance: bar.realized_variance,
            forecast: *forecast,
        })
        .collect()
}
