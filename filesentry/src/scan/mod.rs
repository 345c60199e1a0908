pub mod pool;
pub mod single;
pub mod walker;

pub use pool::WorkerPool;
pub use single::SingleWalker;
pub use walker::{WalkOutcome, WalkStats, WalkStatus, Walker};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared counters describing scan activity.
///
/// These exist for end-of-scan notices and for tests observing controller
/// lifecycles from the outside; matches themselves are reported and dropped,
/// never collected.
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    scans_started: Arc<AtomicU64>,
    scans_completed: Arc<AtomicU64>,
    scans_aborted: Arc<AtomicU64>,
    entries_examined: Arc<AtomicU64>,
    matches_reported: Arc<AtomicU64>,
    subtrees_skipped: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scan_started(&self) {
        self.scans_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_completed(&self) {
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_aborted(&self) {
        self.scans_aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// Folds one traversal's counters into the running totals.
    pub fn record_walk(&self, stats: &WalkStats) {
        self.entries_examined
            .fetch_add(stats.entries_examined, Ordering::Relaxed);
        self.matches_reported
            .fetch_add(stats.matches_reported, Ordering::Relaxed);
        self.subtrees_skipped
            .fetch_add(stats.subtrees_skipped, Ordering::Relaxed);
    }

    pub fn scans_started(&self) -> u64 {
        self.scans_started.load(Ordering::Relaxed)
    }

    pub fn scans_completed(&self) -> u64 {
        self.scans_completed.load(Ordering::Relaxed)
    }

    pub fn scans_aborted(&self) -> u64 {
        self.scans_aborted.load(Ordering::Relaxed)
    }

    pub fn entries_examined(&self) -> u64 {
        self.entries_examined.load(Ordering::Relaxed)
    }

    pub fn matches_reported(&self) -> u64 {
        self.matches_reported.load(Ordering::Relaxed)
    }

    pub fn subtrees_skipped(&self) -> u64 {
        self.subtrees_skipped.load(Ordering::Relaxed)
    }

    /// Logs current totals at debug level.
    pub fn log_stats(&self) {
        debug!(
            "Scan totals: {} started, {} completed, {} aborted, {} entries, {} matches, {} subtrees skipped",
            self.scans_started(),
            self.scans_completed(),
            self.scans_aborted(),
            self.entries_examined(),
            self.matches_reported(),
            self.subtrees_skipped(),
        );
    }
}
