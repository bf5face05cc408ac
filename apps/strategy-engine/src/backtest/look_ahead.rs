//! Look-ahead bias audit for a completed run.
//!
//! Every decision in the pipeline may only use information available when
//! it is taken:
//!
//! - a variance forecast is fitted on returns strictly before its day
//! - the daily signal in effect on a day was decided on the previous row
//! - a bar's strategy return is realized on a strictly later bar
//!
//! The audit re-checks these relationships on the produced rows.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use super::merge::MergedBar;
use super::parallel::ForecastWindow;
use super::series::DailyBar;
use super::signals::{DailySignalRow, raw_daily_signal};

/// A detected use of future information.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookAheadError {
    /// A forecast window reaches the day it forecasts.
    #[error("FUTURE_WINDOW: window for {target_date} includes data through {last_date}")]
    FutureWindow {
        /// Day being forecast.
        target_date: NaiveDate,
        /// Date of the last observation in the window.
        last_date: NaiveDate,
    },

    /// A daily signal does not match the previous row's decision.
    #[error("UNLAGGED_SIGNAL: signal on {date} does not originate from an earlier row")]
    UnlaggedSignal {
        /// Day the signal is in effect.
        date: NaiveDate,
    },

    /// A bar return is not realized on a later bar.
    #[error("FUTURE_RETURN: return for bar {timestamp} is not taken from a later bar")]
    FutureReturn {
        /// Bar carrying the return.
        timestamp: NaiveDateTime,
    },
}

/// Outcome of the audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookAheadAudit {
    /// Relationships checked.
    pub checks: u64,
    /// Violations found.
    pub violations: Vec<LookAheadError>,
}

impl LookAheadAudit {
    /// Whether no violation was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Check that every window ends strictly before its target day.
    ///
    /// `series` is the daily series the windows were cut from.
    pub fn check_windows(
        &mut self,
        series: &[DailyBar],
        windows: &[ForecastWindow<'_>],
        width: usize,
    ) {
        for window in windows {
            self.checks += 1;
            let last_index = (window.index + width).checked_sub(1);
            let Some(last) = last_index.and_then(|i| series.get(i)) else {
                continue;
            };
            if last.date >= window.target_date {
                self.record(LookAheadError::FutureWindow {
                    target_date: window.target_date,
                    last_date: last.date,
                });
            }
        }
    }

    /// Check that each effective signal is the previous row's decision.
    pub fn check_daily_signals(&mut self, rows: &[DailySignalRow]) {
        if let Some(first) = rows.first() {
            self.checks += 1;
            if first.signal.is_some() {
                self.record(LookAheadError::UnlaggedSignal { date: first.date });
            }
        }

        for pair in rows.windows(2) {
            self.checks += 1;
            let (previous, current) = (&pair[0], &pair[1]);
            let decided = raw_daily_signal(previous.premium, previous.premium_std);
            if previous.date >= current.date || current.signal != decided {
                self.record(LookAheadError::UnlaggedSignal { date: current.date });
            }
        }
    }

    /// Check that each defined bar return has a strictly later source bar.
    pub fn check_bar_returns(&mut self, bars: &[MergedBar], returns: &[Option<f64>]) {
        for (i, (bar, value)) in bars.iter().zip(returns).enumerate() {
            if value.is_none() {
                continue;
            }
            self.checks += 1;
            let later = bars.get(i + 1).is_some_and(|next| next.timestamp > bar.timestamp);
            if !later {
                self.record(LookAheadError::FutureReturn {
                    timestamp: bar.timestamp,
                });
            }
        }
    }

    fn record(&mut self, violation: LookAheadError) {
        error!(%violation, "Look-ahead violation");
        self.violations.push(violation);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::backtest::signals::Signal;

    fn date(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() + Duration::days(i)
    }

    fn signal_row(
        i: i64,
        premium: Option<f64>,
        std: Option<f64>,
        signal: Option<Signal>,
    ) -> DailySignalRow {
        DailySignalRow {
            date: date(i),
            forecast: None,
            realized_variance: None,
            premium,
            premium_std: std,
            signal,
        }
    }

    fn merged(minute: i64) -> MergedBar {
        MergedBar {
            timestamp: date(0).and_hms_opt(9, 30, 0).unwrap() + Duration::minutes(minute),
            close: 1.0,
            daily_signal: None,
            intraday_signal: None,
            position: None,
            log_return: None,
        }
    }

    #[test]
    fn test_lagged_signals_pass() {
        let rows = vec![
            signal_row(0, Some(2.0), Some(1.0), None),
            signal_row(1, Some(0.0), Some(1.0), Some(Signal::Long)),
            signal_row(2, None, None, None),
        ];
        let mut audit = LookAheadAudit::default();
        audit.check_daily_signals(&rows);

        assert!(audit.is_clean());
        assert_eq!(audit.checks, 3);
    }

    #[test]
    fn test_same_day_signal_is_flagged() {
        let rows = vec![
            signal_row(0, Some(0.0), Some(1.0), None),
            signal_row(1, Some(2.0), Some(1.0), Some(Signal::Long)),
        ];
        let mut audit = LookAheadAudit::default();
        audit.check_daily_signals(&rows);

        assert_eq!(audit.violations, vec![LookAheadError::UnlaggedSignal { date: date(1) }]);
    }

    #[test]
    fn test_window_reaching_target_is_flagged() {
        let series: Vec<DailyBar> = (0..4)
            .map(|i| DailyBar {
                date: date(i),
                adjusted_close: 1.0,
                log_return: Some(0.0),
                realized_variance: None,
            })
            .collect();
        let returns = vec![Some(0.0); 4];
        let good = ForecastWindow {
            index: 0,
            target_date: date(2),
            returns: &returns[0..2],
        };
        let bad = ForecastWindow {
            index: 1,
            target_date: date(2),
            returns: &returns[1..3],
        };

        let mut audit = LookAheadAudit::default();
        audit.check_windows(&series, &[good, bad], 2);

        assert_eq!(audit.checks, 2);
        assert_eq!(audit.violations.len(), 1);
    }

    #[test]
    fn test_return_on_last_bar_is_flagged() {
        let bars = vec![merged(0), merged(5)];
        let mut audit = LookAheadAudit::default();

        audit.check_bar_returns(&bars, &[Some(0.01), None]);
        assert!(audit.is_clean());

        audit.check_bar_returns(&bars, &[None, Some(0.01)]);
        assert_eq!(audit.violations.len(), 1);
    }
}
