// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Strategy Engine - Volatility Forecast Backtest Library
//!
//! Backtests an intraday strategy that combines a daily volatility-premium
//! signal with intraday overbought/oversold signals.
//!
//! # Pipeline
//!
//! - **Series Loader**: daily and 5-minute price history, log returns,
//!   trailing realized variance, inclusive date clipping
//! - **Volatility Forecaster**: rolling 180-day GARCH(1,3) fits dispatched
//!   across a rayon worker pool, reassembled in window order
//! - **Daily Signals**: forecast premium over realized variance against its
//!   own trailing dispersion, lagged one trading day
//! - **Intraday Signals**: RSI(20) with Bollinger(20, 2.0) band breaks
//! - **Aggregator**: left join on calendar date, fade rule, per-day
//!   forward fill, next-bar returns, daily sums and compounded curve
//!
//! # Layers
//!
//! - `backtest`: pure data transforms and the forecast worker pool
//! - `infrastructure`: HTTP adapter exposing `POST /analyze/garch`
//! - `config`, `telemetry`, `observability`: ambient service concerns

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Backtest pipeline: loading, forecasting, signals and aggregation.
pub mod backtest;

/// Configuration loading and validation.
pub mod config;

/// Structured error types.
pub mod error;

/// Infrastructure layer - HTTP adapter.
pub mod infrastructure;

/// Prometheus metrics.
pub mod observability;

/// Tracing and OpenTelemetry setup.
pub mod telemetry;

pub use backtest::{
    DateRange, IntradayVolatilityStrategy, PriceDataSource, StrategyReport,
};
pub use config::{Config, ConfigError, load_config, load_config_from_string};
pub use error::{ErrorCode, StrategyError};
pub use infrastructure::http::{AppState, create_router};
