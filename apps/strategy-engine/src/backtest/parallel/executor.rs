//! Forecast executor backed by a dedicated rayon pool.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{Level, debug, info, span};

use crate::backtest::garch::{FitError, GarchModel};
use crate::observability::record_forecast_batch;

use super::config::ParallelConfig;
use super::error::ParallelError;
use super::progress::ProgressTracker;
use super::types::{ForecastBatch, ForecastJobResult, ForecastWindow};

/// Fits every window of a batch independently on a worker pool.
pub struct ForecastExecutor {
    config: ParallelConfig,
    model: GarchModel,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for ForecastExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastExecutor")
            .field("config", &self.config)
            .field("model", &self.model)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl ForecastExecutor {
    /// Build the executor and its thread pool.
    ///
    /// # Errors
    ///
    /// Returns error if the thread pool cannot be built.
    pub fn new(config: ParallelConfig, model: GarchModel) -> Result<Self, ParallelError> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("forecast-worker-{i}"));
        if config.max_threads > 0 {
            builder = builder.num_threads(config.max_threads);
        }
        let pool = builder.build().map_err(|e| ParallelError::ThreadPoolError {
            message: e.to_string(),
        })?;

        Ok(Self {
            config,
            model,
            pool,
        })
    }

    /// Fit all windows and return one result per window, in window order.
    ///
    /// Individual failures (including panics inside a fit) become absent
    /// forecasts; the batch itself never fails.
    #[allow(clippy::cast_possible_truncation)]
    pub fn run(&self, windows: &[ForecastWindow<'_>]) -> ForecastBatch {
        if windows.is_empty() {
            debug!("No forecast windows to fit");
            return ForecastBatch::default();
        }

        let tracker = Arc::new(ProgressTracker::new(windows.len() as u64));
        let start_time = Instant::now();

        info!(
            windows = windows.len(),
            threads = self.effective_thread_count(),
            "Starting forecast batch"
        );

        let mut results: Vec<ForecastJobResult> = if windows.len() >= self.config.min_parallel_jobs
        {
            self.pool.install(|| self.run_parallel(windows, &tracker))
        } else {
            self.run_sequential(windows, &tracker)
        };
        results.sort_by_key(|r| r.index);

        let elapsed = start_time.elapsed();
        let final_progress = tracker.progress();

        info!(
            succeeded = final_progress.succeeded(),
            total = final_progress.total,
            elapsed_secs = elapsed.as_secs_f64(),
            windows_per_sec = final_progress.windows_per_sec,
            "Forecast batch complete"
        );

        let batch = ForecastBatch {
            results,
            total_time_ms: elapsed.as_millis() as u64,
            windows: windows.len() as u64,
            succeeded: final_progress.succeeded(),
            failed: final_progress.failed,
        };
        record_forecast_batch(&batch, elapsed);
        batch
    }

    fn run_parallel(
        &self,
        windows: &[ForecastWindow<'_>],
        tracker: &Arc<ProgressTracker>,
    ) -> Vec<ForecastJobResult> {
        windows
            .par_iter()
            .map(|window| self.execute_tracked(window, tracker))
            .collect()
    }

    fn run_sequential(
        &self,
        windows: &[ForecastWindow<'_>],
        tracker: &Arc<ProgressTracker>,
    ) -> Vec<ForecastJobResult> {
        windows
            .iter()
            .map(|window| self.execute_tracked(window, tracker))
            .collect()
    }

    fn execute_tracked(
        &self,
        window: &ForecastWindow<'_>,
        tracker: &ProgressTracker,
    ) -> ForecastJobResult {
        let result = self.execute_window(window);
        let completed = tracker.window_completed(result.forecast.is_some());

        if self.config.track_progress && tracker.is_milestone(completed) {
            let progress = tracker.progress();
            debug!(
                "Forecast progress: {:.1}% ({}/{}) - ETA: {}s",
                progress.percentage(),
                progress.completed,
                progress.total,
                progress.eta_secs
            );
        }

        result
    }

    #[allow(clippy::cast_possible_truncation)]
    fn execute_window(&self, window: &ForecastWindow<'_>) -> ForecastJobResult {
        let _span = span!(Level::DEBUG, "forecast_window", index = window.index).entered();
        let start = Instant::now();

        let outcome = match window.defined_returns() {
            Some(returns) => catch_unwind(AssertUnwindSafe(|| self.model.forecast(&returns)))
                .unwrap_or_else(|_| {
                    Err(FitError::Numerical {
                        reason: "panic during fit".to_string(),
                    })
                }),
            None => Err(FitError::InvalidInput {
                reason: "window contains undefined returns".to_string(),
            }),
        };

        let (forecast, error) = match outcome {
            Ok(value) if value.is_finite() => (Some(value), None),
            Ok(value) => (None, Some(format!("non-finite forecast {value}"))),
            Err(e) => {
                debug!(target_date = %window.target_date, error = %e, "Window fit failed");
                (None, Some(e.to_string()))
            }
        };

        ForecastJobResult {
            index: window.index,
            target_date: window.target_date,
            forecast,
            error,
            execution_time_us: start.elapsed().as_micros() as u64,
        }
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Executor configuration.
    #[must_use]
    pub const fn config(&self) -> &ParallelConfig {
        &self.config
    }
}
