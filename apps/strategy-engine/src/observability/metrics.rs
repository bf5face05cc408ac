//! Prometheus metrics for the strategy engine.
//!
//! # Example
//!
//! ```ignore
//! use strategy_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::backtest::ForecastBatch;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for durations (in seconds).
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Single fits take milliseconds; full runs take tens of seconds.
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.duration_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Forecast Metrics
// ============================================================================

/// Record a finished forecast batch.
pub fn record_forecast_batch(batch: &ForecastBatch, elapsed: Duration) {
    counter!("forecast_fits_total", "outcome" => "success").increment(batch.succeeded);
    counter!("forecast_fits_total", "outcome" => "failure").increment(batch.failed);
    histogram!("forecast_batch_seconds").record(elapsed.as_secs_f64());
}

// ============================================================================
// Strategy Run Metrics
// ============================================================================

/// Record a strategy run.
///
/// # Arguments
///
/// * `status` - Outcome (e.g., "success", "empty", "error")
/// * `elapsed` - Wall-clock duration of the run
pub fn record_strategy_run(status: &str, elapsed: Duration) {
    counter!("strategy_runs_total", "status" => status.to_string()).increment(1);
    histogram!("strategy_run_seconds").record(elapsed.as_secs_f64());
}

/// Record an HTTP request handled by the service.
pub fn record_http_request(route: &'static str, status: &str, elapsed: Duration) {
    counter!(
        "http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_seconds", "route" => route).record(elapsed.as_secs_f64());
}
