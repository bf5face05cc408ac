//! Output records and performance summary of a strategy run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::merge::MergedBar;
use super::returns::DailyReturn;
use super::signals::DailySignalRow;

/// Daily signal as reported to callers. Undefined values are reported as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySignalRecord {
    /// Trading date.
    pub date: NaiveDate,
    /// Effective signal: 1, -1 or 0.
    pub signal_daily: i8,
    /// Variance forecast, or 0.
    pub predictions: f64,
}

impl From<&DailySignalRow> for DailySignalRecord {
    fn from(row: &DailySignalRow) -> Self {
        Self {
            date: row.date,
            signal_daily: row.signal.map_or(0, |s| s.value()),
            predictions: row.forecast.filter(|f| f.is_finite()).unwrap_or(0.0),
        }
    }
}

/// Headline statistics of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Calendar days in the return series.
    pub trading_days: usize,
    /// Intraday bars holding a position.
    pub active_bars: usize,
    /// Forecast windows fitted.
    pub forecast_windows: usize,
    /// Fraction of windows with a forecast.
    pub forecast_coverage: f64,
    /// Final compounded return.
    pub total_return: f64,
    /// Largest peak-to-trough decline of the compounded equity curve.
    pub max_drawdown: f64,
    /// Positive days over days with a non-zero return.
    pub win_rate: f64,
    /// Look-ahead violations found by the audit.
    pub look_ahead_violations: usize,
}

impl PerformanceSummary {
    /// Summarize a run.
    #[must_use]
    pub fn compute(
        daily: &[DailyReturn],
        curve: &[f64],
        bars: &[MergedBar],
        forecast_windows: usize,
        forecast_coverage: f64,
        look_ahead_violations: usize,
    ) -> Self {
        Self {
            trading_days: daily.len(),
            active_bars: bars.iter().filter(|b| b.position.is_some()).count(),
            forecast_windows,
            forecast_coverage,
            total_return: super::returns::final_cumulative(curve),
            max_drawdown: max_drawdown(curve),
            win_rate: win_rate(daily),
            look_ahead_violations,
        }
    }
}

/// Maximum drawdown of `1 + curve`, starting from an equity of 1.
#[must_use]
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;
    for equity in curve.iter().map(|c| 1.0 + c).filter(|e| e.is_finite()) {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            worst = worst.max((peak - equity) / peak);
        }
    }
    worst
}

#[allow(clippy::cast_precision_loss)]
fn win_rate(daily: &[DailyReturn]) -> f64 {
    let traded = daily.iter().filter(|d| d.daily_return != 0.0).count();
    if traded == 0 {
        return 0.0;
    }
    let winners = daily.iter().filter(|d| d.daily_return > 0.0).count();
    winners as f64 / traded as f64
}

/// Result of one strategy run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    /// One record per forecasted day.
    pub daily_signals: Vec<DailySignalRecord>,
    /// One record per calendar day spanned by the intraday bars.
    pub strategy_returns: Vec<DailyReturn>,
    /// Compounded return after each day.
    #[serde(skip)]
    pub cumulative_curve: Vec<f64>,
    /// Final compounded return; always finite.
    pub cumulative_return: f64,
    /// Headline statistics.
    pub summary: PerformanceSummary,
}

impl StrategyReport {
    /// Report for a run with no data.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the run produced any rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily_signals.is_empty() && self.strategy_returns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::signals::Signal;

    fn day(d: u32, r: f64) -> DailyReturn {
        DailyReturn {
            date: NaiveDate::from_ymd_opt(2021, 5, d).unwrap(),
            daily_return: r,
        }
    }

    #[test]
    fn test_record_maps_undefined_to_zero() {
        let row = DailySignalRow {
            date: NaiveDate::from_ymd_opt(2021, 5, 3).unwrap(),
            forecast: Some(f64::INFINITY),
            realized_variance: None,
            premium: None,
            premium_std: None,
            signal: None,
        };
        let record = DailySignalRecord::from(&row);
        assert_eq!(record.signal_daily, 0);
        assert_eq!(record.predictions, 0.0);

        let row = DailySignalRow {
            forecast: Some(0.0004),
            signal: Some(Signal::Short),
            ..row
        };
        let record = DailySignalRecord::from(&row);
        assert_eq!(record.signal_daily, -1);
        assert_eq!(record.predictions, 0.0004);
    }

    #[test]
    fn test_max_drawdown() {
        // equity: 1.1, 0.55, 0.66
        let curve = [0.1, -0.45, -0.34];
        assert!((max_drawdown(&curve) - 0.5).abs() < 1e-12);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_win_rate_ignores_flat_days() {
        let daily = [day(3, 0.01), day(4, 0.0), day(5, -0.02), day(6, 0.03)];
        assert!((win_rate(&daily) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(win_rate(&[day(3, 0.0)]), 0.0);
    }

    #[test]
    fn test_report_serializes_without_curve() {
        let report = StrategyReport {
            strategy_returns: vec![day(3, 0.01)],
            cumulative_curve: vec![0.01],
            cumulative_return: 0.01,
            ..StrategyReport::empty()
        };
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("cumulative_curve").is_none());
        assert_eq!(json["strategy_returns"][0]["date"], "2021-05-03");
        assert_eq!(json["strategy_returns"][0]["daily_return"], 0.01);
        assert_eq!(json["summary"]["trading_days"], 0);
    }
}
