//! Backtest pipeline for the intraday volatility strategy.
//!
//! # Stages
//!
//! | Stage | Module |
//! |-------|--------|
//! | Load and clip price history | [`data_source`], [`series`] |
//! | Rolling GARCH forecasts | [`forecaster`], [`garch`], [`parallel`] |
//! | Daily premium signal | [`signals`] |
//! | Intraday RSI/Bollinger signal | [`indicators`], [`signals`] |
//! | Join, fade rule, returns | [`merge`], [`returns`] |
//! | Audit and report | [`look_ahead`], [`report`] |
//!
//! [`IntradayVolatilityStrategy`] runs all stages for a date range.

pub mod data_source;
pub mod forecaster;
pub mod garch;
pub mod indicators;
pub mod look_ahead;
pub mod math;
pub mod merge;
pub mod optimizer;
pub mod parallel;
pub mod pipeline;
pub mod report;
pub mod returns;
pub mod series;
pub mod signals;

pub use data_source::{CsvDataSource, DataError, InMemoryDataSource, PriceDataSource};
pub use forecaster::{ForecastedDay, attach_forecasts, build_windows, daily_returns};
pub use garch::{FitError, GarchFit, GarchModel, GarchParams};
pub use look_ahead::{LookAheadAudit, LookAheadError};
pub use merge::{MergedBar, combined_sign, forward_fill_within_day, merge_signals};
pub use optimizer::SimplexConfig;
pub use parallel::{
    ForecastBatch, ForecastExecutor, ForecastJobResult, ForecastWindow, ParallelConfig,
    ParallelError,
};
pub use pipeline::{IntradayVolatilityStrategy, StrategySettings};
pub use report::{DailySignalRecord, PerformanceSummary, StrategyReport};
pub use returns::{DailyReturn, aggregate_daily_returns, bar_strategy_returns, cumulative_curve};
pub use series::{DailyBar, DailyPrice, DateRange, IntradayBar, build_daily_series};
pub use signals::{
    DailySignalRow, IntradaySignalRow, Signal, SignalSettings, compute_daily_signals,
    compute_intraday_signals,
};
