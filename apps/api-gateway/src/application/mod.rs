//! Application Layer
//!
//! The outbound port to the strategy engine and the request types the
//! gateway validates before forwarding.

mod ports;

pub use ports::{AnalyticsBackend, AnalyzeRequest, BackendError};

#[cfg(test)]
pub use ports::MockAnalyticsBackend;
