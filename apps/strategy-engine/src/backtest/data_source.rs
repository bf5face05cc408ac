//! Price history sources.
//!
//! Provides the [`PriceDataSource`] port and two adapters:
//!
//! - [`CsvDataSource`]: reads the daily and 5-minute CSV files on every call
//! - [`InMemoryDataSource`]: fixed rows, used by tests and fixtures
//!
//! # CSV Layout
//!
//! Daily files carry a `Date` column (`YYYY-MM-DD`) and an `Adj Close`
//! column. Intraday files carry a `datetime` column
//! (`YYYY-MM-DD HH:MM:SS`) and a `close` column. Other columns are ignored.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::series::{DailyPrice, IntradayBar};

/// Errors raised while loading price history.
#[derive(Debug, Error)]
pub enum DataError {
    /// Source could not be opened or read.
    #[error("Price data unavailable at '{path}': {message}")]
    Unavailable {
        /// Source location.
        path: String,
        /// Underlying failure.
        message: String,
    },

    /// Source contained no usable rows.
    #[error("Price data at '{path}' contains no usable rows")]
    Empty {
        /// Source location.
        path: String,
    },
}

/// Source of daily and intraday price history.
pub trait PriceDataSource: Send + Sync {
    /// Load daily prices in ascending date order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the source is missing, unreadable or empty.
    fn load_daily(&self) -> Result<Vec<DailyPrice>, DataError>;

    /// Load intraday bars in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the source is missing, unreadable or empty.
    fn load_intraday(&self) -> Result<Vec<IntradayBar>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}

// ============================================
// CSV Source
// ============================================

const DAILY_COLUMNS: [&str; 2] = ["Date", "Adj Close"];
const INTRADAY_COLUMNS: [&str; 2] = ["datetime", "close"];

#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Adj Close")]
    adj_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IntradayRow {
    datetime: String,
    close: Option<f64>,
}

/// CSV-backed price history.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    daily_path: PathBuf,
    intraday_path: PathBuf,
}

impl CsvDataSource {
    /// Create a CSV data source.
    #[must_use]
    pub fn new(daily_path: impl Into<PathBuf>, intraday_path: impl Into<PathBuf>) -> Self {
        Self {
            daily_path: daily_path.into(),
            intraday_path: intraday_path.into(),
        }
    }

    /// Path of the daily file.
    #[must_use]
    pub fn daily_path(&self) -> &Path {
        &self.daily_path
    }

    /// Path of the intraday file.
    #[must_use]
    pub fn intraday_path(&self) -> &Path {
        &self.intraday_path
    }
}

impl PriceDataSource for CsvDataSource {
    fn load_daily(&self) -> Result<Vec<DailyPrice>, DataError> {
        let rows: Vec<DailyRow> = read_rows(&self.daily_path, &DAILY_COLUMNS)?;
        let total = rows.len();

        let mut prices: Vec<DailyPrice> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let date = parse_date(&row.date);
                let price = row.adj_close.filter(|p| p.is_finite() && *p > 0.0);
                match (date, price) {
                    (Some(date), Some(price)) => Some(DailyPrice::new(date, price)),
                    _ => {
                        debug!(row = i + 1, date = %row.date, "Skipping unusable daily row");
                        None
                    }
                }
            })
            .collect();

        prices.sort_by_key(|p| p.date);
        finish_load(&self.daily_path, "daily", total, prices)
    }

    fn load_intraday(&self) -> Result<Vec<IntradayBar>, DataError> {
        let rows: Vec<IntradayRow> = read_rows(&self.intraday_path, &INTRADAY_COLUMNS)?;
        let total = rows.len();

        let mut bars: Vec<IntradayBar> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let timestamp = parse_datetime(&row.datetime);
                let close = row.close.filter(|p| p.is_finite() && *p > 0.0);
                match (timestamp, close) {
                    (Some(ts), Some(close)) => Some(IntradayBar::new(ts, close)),
                    _ => {
                        debug!(
                            row = i + 1,
                            datetime = %row.datetime,
                            "Skipping unusable intraday row"
                        );
                        None
                    }
                }
            })
            .collect();

        bars.sort_by_key(|b| b.timestamp);
        finish_load(&self.intraday_path, "intraday", total, bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

fn read_rows<T>(path: &Path, required: &[&str]) -> Result<Vec<T>, DataError>
where
    T: for<'de> Deserialize<'de>,
{
    let unavailable = |message: String| DataError::Unavailable {
        path: path.display().to_string(),
        message,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| unavailable(e.to_string()))?;

    let headers = reader.headers().map_err(|e| unavailable(e.to_string()))?;
    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(unavailable(format!("missing column '{missing}'")));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(unavailable(e.to_string())),
            Err(e) => {
                debug!(row = i + 1, error = %e, "Skipping malformed row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped malformed rows");
    }

    Ok(rows)
}

fn finish_load<T>(
    path: &Path,
    kind: &str,
    total: usize,
    rows: Vec<T>,
) -> Result<Vec<T>, DataError> {
    if rows.is_empty() {
        return Err(DataError::Empty {
            path: path.display().to_string(),
        });
    }

    info!(
        path = %path.display(),
        kind,
        rows = rows.len(),
        dropped = total.saturating_sub(rows.len()),
        "Loaded price history"
    );
    Ok(rows)
}

/// Parse a calendar date, accepting a trailing time component.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Parse an intraday timestamp.
pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// ============================================
// In-Memory Source
// ============================================

/// Fixed price history held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    daily: Vec<DailyPrice>,
    intraday: Vec<IntradayBar>,
}

impl InMemoryDataSource {
    /// Create an in-memory source. Rows are sorted on construction.
    #[must_use]
    pub fn new(mut daily: Vec<DailyPrice>, mut intraday: Vec<IntradayBar>) -> Self {
        daily.sort_by_key(|p| p.date);
        intraday.sort_by_key(|b| b.timestamp);
        Self { daily, intraday }
    }
}

impl PriceDataSource for InMemoryDataSource {
    fn load_daily(&self) -> Result<Vec<DailyPrice>, DataError> {
        if self.daily.is_empty() {
            return Err(DataError::Empty {
                path: "memory://daily".to_string(),
            });
        }
        Ok(self.daily.clone())
    }

    fn load_intraday(&self) -> Result<Vec<IntradayBar>, DataError> {
        if self.intraday.is_empty() {
            return Err(DataError::Empty {
                path: "memory://intraday".to_string(),
            });
        }
        Ok(self.intraday.clone())
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}
