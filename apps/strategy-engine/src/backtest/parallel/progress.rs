//! Progress tracking for forecast batches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Lock-free progress counters shared by the workers of one batch.
#[derive(Debug)]
pub struct ProgressTracker {
    total_windows: u64,
    completed_windows: AtomicU64,
    failed_windows: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    #[must_use]
    pub fn new(total_windows: u64) -> Self {
        Self {
            total_windows,
            completed_windows: AtomicU64::new(0),
            failed_windows: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished window. Returns the completed count after this one.
    pub fn window_completed(&self, forecast_defined: bool) -> u64 {
        if !forecast_defined {
            self.failed_windows.fetch_add(1, Ordering::Relaxed);
        }
        self.completed_windows.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Whether `completed` crosses a 10% step, used to throttle progress logs.
    #[must_use]
    pub const fn is_milestone(&self, completed: u64) -> bool {
        let step = self.total_windows / 10;
        step == 0 || completed % step == 0 || completed == self.total_windows
    }

    /// Get current progress.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn progress(&self) -> Progress {
        let completed = self.completed_windows.load(Ordering::Relaxed);
        let failed = self.failed_windows.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let windows_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let remaining = self.total_windows.saturating_sub(completed);
        let eta_secs = if windows_per_sec > 0.0 {
            (remaining as f64 / windows_per_sec) as u64
        } else {
            0
        };

        Progress {
            total: self.total_windows,
            completed,
            failed,
            elapsed_ms: elapsed.as_millis() as u64,
            eta_secs,
            windows_per_sec,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Windows in the batch.
    pub total: u64,
    /// Windows finished, with or without a forecast.
    pub completed: u64,
    /// Windows that finished without a forecast.
    pub failed: u64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Estimated time remaining in seconds.
    pub eta_secs: u64,
    /// Throughput.
    pub windows_per_sec: f64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Windows that produced a forecast.
    #[must_use]
    pub const fn succeeded(&self) -> u64 {
        self.completed - self.failed
    }
}
