//! Daily and intraday price series.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::math::rolling_sample_variance;

/// One row of daily price history as read from the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    /// Trading date.
    pub date: NaiveDate,
    /// Dividend- and split-adjusted close.
    pub adjusted_close: f64,
}

impl DailyPrice {
    /// Create a daily price row.
    #[must_use]
    pub const fn new(date: NaiveDate, adjusted_close: f64) -> Self {
        Self {
            date,
            adjusted_close,
        }
    }
}

/// A daily bar with derived return and realized variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date.
    pub date: NaiveDate,
    /// Adjusted close.
    pub adjusted_close: f64,
    /// Log return against the previous row; undefined for the first row.
    pub log_return: Option<f64>,
    /// Trailing sample variance of `log_return`.
    pub realized_variance: Option<f64>,
}

/// A single 5-minute bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradayBar {
    /// Bar timestamp.
    pub timestamp: NaiveDateTime,
    /// Close price.
    pub close: f64,
}

impl IntradayBar {
    /// Create an intraday bar.
    #[must_use]
    pub const fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// Calendar date of the bar.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Log returns of a price sequence, index-aligned with the input.
pub fn log_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }

    out.push(None);
    out.extend(
        prices
            .windows(2)
            .map(|w| Some(w[1].ln() - w[0].ln()).filter(|r| r.is_finite())),
    );
    out
}

/// Derive log returns and trailing realized variance over the full history.
pub fn build_daily_series(prices: &[DailyPrice], variance_window: usize) -> Vec<DailyBar> {
    let closes: Vec<f64> = prices.iter().map(|p| p.adjusted_close).collect();
    let returns = log_returns(&closes);
    let variances = rolling_sample_variance(&returns, variance_window);

    prices
        .iter()
        .zip(returns)
        .zip(variances)
        .map(|((price, log_return), realized_variance)| DailyBar {
            date: price.date,
            adjusted_close: price.adjusted_close,
            log_return,
            realized_variance,
        })
        .collect()
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First included date.
    pub start: NaiveDate,
    /// Last included date.
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a date range. A start after the end selects nothing.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Keep the daily bars inside the range.
    #[must_use]
    pub fn clip_daily(&self, bars: &[DailyBar]) -> Vec<DailyBar> {
        bars.iter()
            .filter(|b| self.contains(b.date))
            .copied()
            .collect()
    }

    /// Keep the intraday bars between midnight of the start date and
    /// midnight of the end date, both inclusive.
    ///
    /// Session bars on the end date itself fall after its midnight and are
    /// excluded; the daily clip still keeps the end date.
    #[must_use]
    pub fn clip_intraday(&self, bars: &[IntradayBar]) -> Vec<IntradayBar> {
        let from = self.start.and_time(NaiveTime::MIN);
        let until = self.end.and_time(NaiveTime::MIN);
        bars.iter()
            .filter(|b| from <= b.timestamp && b.timestamp <= until)
            .copied()
            .collect()
    }
}
