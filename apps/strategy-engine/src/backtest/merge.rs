//! Alignment of daily signals onto intraday bars.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::signals::{DailySignalRow, IntradaySignalRow, Signal};

/// An intraday bar carrying both signals and the resulting position sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedBar {
    /// Bar timestamp.
    pub timestamp: NaiveDateTime,
    /// Close price.
    pub close: f64,
    /// Daily signal for the bar's calendar date.
    pub daily_signal: Option<Signal>,
    /// Intraday band-break signal.
    pub intraday_signal: Option<Signal>,
    /// Position sign after the fade rule and the per-day forward fill.
    pub position: Option<Signal>,
    /// Log return against the previous bar.
    pub log_return: Option<f64>,
}

impl MergedBar {
    /// Calendar date of the bar.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Position implied by a pair of agreeing signals.
///
/// Agreement is faded: both long opens a short, both short opens a long.
#[must_use]
pub fn combined_sign(daily: Option<Signal>, intraday: Option<Signal>) -> Option<Signal> {
    match (daily?, intraday?) {
        (Signal::Long, Signal::Long) => Some(Signal::Short),
        (Signal::Short, Signal::Short) => Some(Signal::Long),
        _ => None,
    }
}

/// Left-join intraday rows to daily signals on calendar date and apply the
/// fade rule. Bars whose date has no daily row get no daily signal.
#[must_use]
pub fn merge_signals(daily: &[DailySignalRow], intraday: &[IntradaySignalRow]) -> Vec<MergedBar> {
    let by_date: HashMap<NaiveDate, Option<Signal>> =
        daily.iter().map(|row| (row.date, row.signal)).collect();

    let mut merged: Vec<MergedBar> = intraday
        .iter()
        .map(|row| {
            let daily_signal = by_date.get(&row.timestamp.date()).copied().flatten();
            MergedBar {
                timestamp: row.timestamp,
                close: row.close,
                daily_signal,
                intraday_signal: row.signal,
                position: combined_sign(daily_signal, row.signal),
                log_return: row.log_return,
            }
        })
        .collect();

    forward_fill_within_day(&mut merged);
    merged
}

/// Carry each position forward to later bars of the same calendar day.
/// Nothing crosses midnight.
pub fn forward_fill_within_day(bars: &mut [MergedBar]) {
    let mut current: Option<(NaiveDate, Signal)> = None;
    for bar in bars.iter_mut() {
        let date = bar.date();
        if current.is_some_and(|(d, _)| d != date) {
            current = None;
        }
        match bar.position {
            Some(sign) => current = Some((date, sign)),
            None => bar.position = current.map(|(_, sign)| sign),
        }
    }
}
