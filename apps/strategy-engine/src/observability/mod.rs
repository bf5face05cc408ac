//! Observability module for metrics.
//!
//! Prometheus counters and histograms for forecast batches and strategy
//! runs. Recording is a no-op until [`init_metrics`] installs the exporter.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_forecast_batch, record_http_request,
    record_strategy_run,
};
