//! Logger metrics for observability
//!
//! Counters shared by a logger and every logger derived from it. Emission
//! never reports sink failures to the caller, so these counters are the
//! place to look for lost records.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_log_facade::{Level, Logger, MemorySink};
///
/// let logger = Logger::new(MemorySink::new(), Level::Info, []);
/// logger.info("cache warmed", &[]);
/// logger.debug("filtered out", &[]);
///
/// assert_eq!(logger.metrics().total_logged(), 1);
/// assert_eq!(logger.metrics().dropped_count(), 0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records written to the sink
    total_logged: AtomicU64,

    /// Records lost to encoding or sink write failures
    dropped_count: AtomicU64,

    /// Sync calls issued against the sink
    sync_count: AtomicU64,

    /// Sync calls that returned an error
    sync_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            sync_count: AtomicU64::new(0),
            sync_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sync_count(&self) -> u64 {
        self.sync_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sync_failures(&self) -> u64 {
        self.sync_failures.load(Ordering::Relaxed)
    }

    /// Record a written entry, returning the previous count
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped entry, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sync(&self, ok: bool) {
        self.sync_count.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.sync_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no logs have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            total_logged: AtomicU64::new(self.total_logged()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            sync_count: AtomicU64::new(self.sync_count()),
            sync_failures: AtomicU64::new(self.sync_failures()),
        }
    }
}
