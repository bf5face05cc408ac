#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! API Gateway
//!
//! Thin HTTP front door for the strategy engine. It checks that analysis
//! requests carry a start and end date, forwards them unchanged and
//! returns the engine's JSON body. Transport faults become 502 responses.
//!
//! # Layers (inside → outside)
//!
//! - **Application**: the `AnalyticsBackend` port and request/response types
//! - **Infrastructure**: reqwest adapter, axum routes, telemetry
//!
//! # Request Flow
//!
//! ```text
//! Client ──► POST /api/analyze/garch ──► AnalyticsBackend ──► strategy-engine
//!                                                 │
//!        ◄──────── engine JSON / 502 ◄────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Use cases and port definitions.
pub mod application;

/// Gateway configuration from environment variables.
pub mod config;

/// Gateway error type and its HTTP mapping.
pub mod error;

/// Adapters: HTTP client, routes and telemetry.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::{AnalyticsBackend, AnalyzeRequest, BackendError};
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use infrastructure::analytics_client::HttpAnalyticsBackend;
pub use infrastructure::routes::{GatewayState, create_router};
