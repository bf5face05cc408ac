//! Error types for the forecast worker pool.

use thiserror::Error;

/// Errors from the forecast worker pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParallelError {
    /// Thread pool initialization failed.
    #[error("Failed to initialize forecast thread pool: {message}")]
    ThreadPoolError {
        /// Error message.
        message: String,
    },
}
