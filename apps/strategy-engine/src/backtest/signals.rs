//! Daily volatility-premium and intraday band-break signals.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::forecaster::ForecastedDay;
use super::indicators::{bollinger_bands, rsi};
use super::math::rolling_sample_std;
use super::series::{IntradayBar, log_returns};

/// Directional signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// +1
    Long,
    /// -1
    Short,
}

impl Signal {
    /// Numeric value, +1 or -1.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
        }
    }

    /// Opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

/// Signal parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSettings {
    /// Trailing window for the premium's standard deviation.
    pub premium_std_window: usize,
    /// RSI smoothing period.
    pub rsi_period: usize,
    /// Overbought threshold.
    pub rsi_upper: f64,
    /// Oversold threshold.
    pub rsi_lower: f64,
    /// Bollinger moving-average period.
    pub band_period: usize,
    /// Bollinger band width in standard deviations.
    pub band_std_dev: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            premium_std_window: 180,
            rsi_period: 20,
            rsi_upper: 70.0,
            rsi_lower: 30.0,
            band_period: 20,
            band_std_dev: 2.0,
        }
    }
}

// ============================================================================
// Daily
// ============================================================================

/// One daily row after signal generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySignalRow {
    /// Trading date.
    pub date: NaiveDate,
    /// Variance forecast for the date.
    pub forecast: Option<f64>,
    /// Trailing realized variance.
    pub realized_variance: Option<f64>,
    /// Relative excess of the forecast over realized variance.
    pub premium: Option<f64>,
    /// Trailing sample standard deviation of `premium`.
    pub premium_std: Option<f64>,
    /// Signal in effect for the date, decided on the previous row.
    pub signal: Option<Signal>,
}

fn premium(forecast: Option<f64>, variance: Option<f64>) -> Option<f64> {
    match (forecast, variance) {
        (Some(f), Some(v)) if v != 0.0 => Some((f - v) / v).filter(|p| p.is_finite()),
        _ => None,
    }
}

pub(crate) fn raw_daily_signal(premium: Option<f64>, std: Option<f64>) -> Option<Signal> {
    let (p, s) = (premium?, std?);
    if p > s {
        Some(Signal::Long)
    } else if p < -s {
        Some(Signal::Short)
    } else {
        None
    }
}

/// Compute the lagged daily signal for each forecasted day.
///
/// The first row never carries a signal.
#[must_use]
pub fn compute_daily_signals(rows: &[ForecastedDay], std_window: usize) -> Vec<DailySignalRow> {
    let premiums: Vec<Option<f64>> = rows
        .iter()
        .map(|r| premium(r.forecast, r.realized_variance))
        .collect();
    let stds = rolling_sample_std(&premiums, std_window);

    let mut previous: Option<Signal> = None;
    rows.iter()
        .zip(premiums.iter().zip(&stds))
        .map(|(row, (premium, std))| {
            let signal = previous;
            previous = raw_daily_signal(*premium, *std);
            DailySignalRow {
                date: row.date,
                forecast: row.forecast,
                realized_variance: row.realized_variance,
                premium: *premium,
                premium_std: *std,
                signal,
            }
        })
        .collect()
}

// ============================================================================
// Intraday
// ============================================================================

/// One intraday bar after indicator computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradaySignalRow {
    /// Bar timestamp.
    pub timestamp: NaiveDateTime,
    /// Close price.
    pub close: f64,
    /// Relative strength index.
    pub rsi: Option<f64>,
    /// Upper Bollinger band.
    pub upper_band: Option<f64>,
    /// Lower Bollinger band.
    pub lower_band: Option<f64>,
    /// Band-break signal.
    pub signal: Option<Signal>,
    /// Log return against the previous bar.
    pub log_return: Option<f64>,
}

fn raw_intraday_signal(
    close: f64,
    rsi: Option<f64>,
    upper: Option<f64>,
    lower: Option<f64>,
    settings: &SignalSettings,
) -> Option<Signal> {
    let rsi = rsi?;
    if rsi > settings.rsi_upper && upper.is_some_and(|u| close > u) {
        Some(Signal::Long)
    } else if rsi < settings.rsi_lower && lower.is_some_and(|l| close < l) {
        Some(Signal::Short)
    } else {
        None
    }
}

/// Compute indicators, signals and log returns over the whole bar sequence.
///
/// Indicators run across day boundaries.
#[must_use]
pub fn compute_intraday_signals(
    bars: &[IntradayBar],
    settings: &SignalSettings,
) -> Vec<IntradaySignalRow> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let rsi_values = rsi(&closes, settings.rsi_period);
    let bands = bollinger_bands(&closes, settings.band_period, settings.band_std_dev);
    let returns = log_returns(&closes);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let (rsi, upper, lower) = (rsi_values[i], bands.upper[i], bands.lower[i]);
            IntradaySignalRow {
                timestamp: bar.timestamp,
                close: bar.close,
                rsi,
                upper_band: upper,
                lower_band: lower,
                signal: raw_intraday_signal(bar.close, rsi, upper, lower, settings),
                log_return: returns[i],
            }
        })
        .collect()
}
