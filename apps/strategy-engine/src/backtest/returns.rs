//! Bar-level strategy returns, daily aggregation and compounding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::merge::MergedBar;

/// Strategy return summed over one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    /// Calendar date.
    pub date: NaiveDate,
    /// Sum of the day's bar returns; 0 for days without positions.
    pub daily_return: f64,
}

/// Per-bar strategy return: the next bar's log return times the position.
///
/// The last bar has no next bar and so no return. The next bar may belong
/// to the following day.
#[must_use]
pub fn bar_strategy_returns(bars: &[MergedBar]) -> Vec<Option<f64>> {
    let mut out: Vec<Option<f64>> = bars
        .windows(2)
        .map(|pair| {
            let sign = f64::from(pair[0].position?.value());
            pair[1].log_return.map(|r| r * sign)
        })
        .collect();
    if !bars.is_empty() {
        out.push(None);
    }
    out
}

/// Sum bar returns per calendar day over every day from the first bar's
/// date to the last bar's date. Undefined and non-finite sums become 0.
#[must_use]
pub fn aggregate_daily_returns(bars: &[MergedBar], returns: &[Option<f64>]) -> Vec<DailyReturn> {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Vec::new();
    };

    let mut days: Vec<DailyReturn> = first
        .date()
        .iter_days()
        .take_while(|d| *d <= last.date())
        .map(|date| DailyReturn {
            date,
            daily_return: 0.0,
        })
        .collect();

    let mut slot = 0;
    for (bar, value) in bars.iter().zip(returns) {
        while slot < days.len() && days[slot].date < bar.date() {
            slot += 1;
        }
        if let (Some(day), Some(value)) = (days.get_mut(slot), value) {
            day.daily_return += value;
        }
    }

    for day in &mut days {
        if !day.daily_return.is_finite() {
            day.daily_return = 0.0;
        }
    }
    days
}

/// Compounded cumulative return after each day: `exp(Σ ln(1 + r)) − 1`.
#[must_use]
pub fn cumulative_curve(daily: &[DailyReturn]) -> Vec<f64> {
    daily
        .iter()
        .scan(0.0_f64, |log_sum, day| {
            *log_sum += day.daily_return.ln_1p();
            Some(log_sum.exp() - 1.0)
        })
        .collect()
}

/// Final value of the curve; 0 when empty or non-finite.
#[must_use]
pub fn final_cumulative(curve: &[f64]) -> f64 {
    curve
        .last()
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};

    use super::*;
    use crate::backtest::signals::Signal;

    fn ts(day: u32, minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            + Duration::minutes(minute)
    }

    fn bar(
        timestamp: NaiveDateTime,
        position: Option<Signal>,
        log_return: Option<f64>,
    ) -> MergedBar {
        MergedBar {
            timestamp,
            close: 100.0,
            daily_signal: None,
            intraday_signal: None,
            position,
            log_return,
        }
    }

    fn day(d: u32, r: f64) -> DailyReturn {
        DailyReturn {
            date: NaiveDate::from_ymd_opt(2021, 3, d).unwrap(),
            daily_return: r,
        }
    }

    #[test]
    fn test_bar_returns_use_next_bar() {
        let bars = vec![
            bar(ts(1, 0), Some(Signal::Short), None),
            bar(ts(1, 5), Some(Signal::Long), Some(0.01)),
            bar(ts(1, 10), None, Some(0.02)),
        ];
        let returns = bar_strategy_returns(&bars);

        assert_eq!(returns, vec![Some(-0.01), Some(0.02), None]);
    }

    #[test]
    fn test_last_bar_of_day_uses_next_day_open() {
        let bars = vec![
            bar(ts(1, 0), Some(Signal::Long), None),
            bar(ts(2, 0), None, Some(0.03)),
        ];
        assert_eq!(bar_strategy_returns(&bars)[0], Some(0.03));
    }

    #[test]
    fn test_aggregation_fills_calendar_gaps() {
        let bars = vec![
            bar(ts(1, 0), None, None),
            bar(ts(1, 5), None, None),
            bar(ts(4, 0), None, None),
        ];
        let daily = aggregate_daily_returns(&bars, &[Some(0.01), Some(0.02), None]);

        assert_eq!(daily.len(), 4);
        assert!((daily[0].daily_return - 0.03).abs() < 1e-12);
        assert_eq!(daily[1].daily_return, 0.0);
        assert_eq!(daily[3].date, NaiveDate::from_ymd_opt(2021, 3, 4).unwrap());
        assert_eq!(daily[3].daily_return, 0.0);
    }

    #[test]
    fn test_aggregation_sanitizes_non_finite() {
        let bars = vec![bar(ts(1, 0), None, None)];
        let daily = aggregate_daily_returns(&bars, &[Some(f64::INFINITY)]);

        assert_eq!(daily[0].daily_return, 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(bar_strategy_returns(&[]).is_empty());
        assert!(aggregate_daily_returns(&[], &[]).is_empty());
        assert_eq!(final_cumulative(&cumulative_curve(&[])), 0.0);
    }

    #[test]
    fn test_cumulative_compounds() {
        let curve = cumulative_curve(&[day(1, 0.1), day(2, -0.5), day(3, 0.0)]);

        assert!((curve[0] - 0.1).abs() < 1e-12);
        assert!((curve[1] - (1.1 * 0.5 - 1.0)).abs() < 1e-12);
        assert!((final_cumulative(&curve) - (-0.45)).abs() < 1e-12);
    }

    #[test]
    fn test_total_loss_is_guarded() {
        let curve = cumulative_curve(&[day(1, -1.5), day(2, 0.1)]);
        assert_eq!(final_cumulative(&curve), 0.0);
    }
}
