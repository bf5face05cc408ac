//! Infrastructure Layer
//!
//! - `analytics_client`: reqwest adapter for the `AnalyticsBackend` port
//! - `routes`: axum router and handlers
//! - `telemetry`: tracing subscriber and optional OTLP export

pub mod analytics_client;
pub mod routes;
pub mod telemetry;
