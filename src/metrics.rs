// Performance metrics module
//
// Lightweight lock-free counters for monitoring rotation runs.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Global performance metrics, tracked with atomics so workers can update
/// them without locks. Logged on shutdown for performance analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Files successfully rotated
    pub files_rotated: AtomicUsize,

    /// Files that failed to decode or save
    pub files_failed: AtomicUsize,

    /// Runs cancelled by the user
    pub runs_cancelled: AtomicUsize,

    /// Total time spent inside rotation batches, in milliseconds
    pub total_rotation_time_ms: AtomicU64,

    /// UI updates marshalled to the event loop
    pub ui_updates: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            files_rotated: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            runs_cancelled: AtomicUsize::new(0),
            total_rotation_time_ms: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_file_rotated(&self) {
        self.files_rotated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_cancelled(&self) {
        self.runs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rotation_time(&self, duration: Duration) {
        self.total_rotation_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Total uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average batch time per rotated file, in milliseconds.
    pub fn avg_rotation_time_ms(&self) -> f64 {
        let total = self.total_rotation_time_ms.load(Ordering::Relaxed);
        let count = self.files_rotated.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log a metrics summary.
    pub fn log_summary(&self) {
        tracing::info!("=== Performance Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Files: {} rotated, {} failed; runs cancelled: {}",
            self.files_rotated.load(Ordering::Relaxed),
            self.files_failed.load(Ordering::Relaxed),
            self.runs_cancelled.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Rotation time: {:.2}s total (avg: {:.2}ms per file)",
            self.total_rotation_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_rotation_time_ms()
        );
        tracing::info!(
            "UI updates: {}",
            self.ui_updates.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
