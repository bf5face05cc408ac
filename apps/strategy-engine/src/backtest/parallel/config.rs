//! Worker pool configuration for forecast batches.

use serde::{Deserialize, Serialize};

/// Configuration for the forecast worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Number of worker threads (0 = one per available core).
    pub max_threads: usize,

    /// Whether to log per-window progress at debug level.
    pub track_progress: bool,

    /// Batches smaller than this run on the calling thread.
    pub min_parallel_jobs: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            track_progress: true,
            min_parallel_jobs: 4,
        }
    }
}
