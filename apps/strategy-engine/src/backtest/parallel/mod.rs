//! Parallel forecasting infrastructure using Rayon.
//!
//! Every rolling window is an independent task: the executor fans the
//! windows out over a thread pool it owns, waits for all of them, and
//! reassembles the results by window index. A failing or panicking fit
//! only loses its own forecast.
//!
//! # Example
//!
//! ```ignore
//! use strategy_engine::backtest::parallel::{ForecastExecutor, ParallelConfig};
//! use strategy_engine::backtest::GarchModel;
//!
//! let executor = ForecastExecutor::new(ParallelConfig::default(), GarchModel::default())?;
//! let batch = executor.run(&windows);
//! let forecasts = batch.forecasts();
//! ```

mod config;
mod error;
mod executor;
mod progress;
mod types;

pub use config::ParallelConfig;
pub use error::ParallelError;
pub use executor::ForecastExecutor;
pub use progress::{Progress, ProgressTracker};
pub use types::{ForecastBatch, ForecastJobResult, ForecastWindow};
