//! HTTP request DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtest::DateRange;
use crate::backtest::data_source::parse_datetime;
use crate::error::StrategyError;

/// Request to run the strategy over a date range.
///
/// Both fields are optional at the wire level so a missing field produces
/// the structured error shape rather than a bare rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// First date, ISO-8601.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last date, ISO-8601.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl AnalyzeRequest {
    /// Validate and convert to an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::InvalidRequest`] if a field is missing or
    /// not a date.
    pub fn date_range(&self) -> Result<DateRange, StrategyError> {
        let (Some(start), Some(end)) = (self.start_date.as_deref(), self.end_date.as_deref()) else {
            return Err(StrategyError::invalid_request(
                "start_date and end_date are required",
            ));
        };
        Ok(DateRange::new(parse_request_date(start)?, parse_request_date(end)?))
    }
}

fn parse_request_date(value: &str) -> Result<NaiveDate, StrategyError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(value).map(|dt| dt.date()))
        .ok_or_else(|| StrategyError::invalid_request(format!("Invalid date: '{value}'")))
}
