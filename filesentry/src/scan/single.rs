use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::control::ScanSignals;
use crate::errors::ScanResult;
use crate::matcher::PatternSet;
use crate::reporter;
use crate::scan::walker::{WalkStatus, Walker};
use crate::scan::ScanMetrics;

/// Single-walker scan controller.
///
/// One thread of control alternating between an idle sleep and one full
/// traversal over the whole pattern set, so two traversals can never overlap.
/// The controller is either idle or scanning; a stop request is an abort
/// intent observed while scanning, not a resting state of its own.
///
/// Every cycle ends by re-arming the next scan, which makes start-scan an
/// accelerator for an already-recurring cadence rather than an on/off
/// toggle. The inter-cycle sleep is polled once per poll interval so an
/// incoming start-scan cuts it short. A start-scan that arrives while a
/// traversal is running does not abort it; the intent stays pending and
/// shortens the following sleep instead.
pub struct SingleWalker {
    config: ScanConfig,
    patterns: PatternSet,
    signals: Arc<ScanSignals>,
    metrics: ScanMetrics,
}

impl SingleWalker {
    pub fn new(config: ScanConfig, signals: Arc<ScanSignals>) -> ScanResult<Self> {
        let patterns = config.pattern_set()?;
        Ok(Self {
            config,
            patterns,
            signals,
            metrics: ScanMetrics::new(),
        })
    }

    /// Shared handle onto this controller's counters.
    pub fn metrics(&self) -> ScanMetrics {
        self.metrics.clone()
    }

    /// Runs scan cycles until shutdown is requested.
    pub fn run(&self) {
        let walker = Walker::new(&self.patterns, self.config.verbose, self.config.max_depth);

        loop {
            if self.signals.shutdown_requested() {
                info!("Controller shutting down");
                return;
            }

            if self.signals.take_scan_request() {
                self.scan_once(&walker);
            }

            if self.sleep_between_cycles() {
                info!("Controller shutting down");
                return;
            }

            // Re-arm unconditionally: the next cycle scans again, and any
            // stop intent from this cycle is spent.
            self.signals.rearm();
        }
    }

    fn scan_once(&self, walker: &Walker<'_>) {
        info!("Scan started");
        self.metrics.record_scan_started();

        let outcome = walker.walk(
            &self.config.root_path,
            &|| self.signals.abort_requested(),
            &mut |path, pattern| reporter::report(path, pattern),
        );
        self.metrics.record_walk(&outcome.stats);

        match outcome.status {
            WalkStatus::Completed => {
                self.metrics.record_scan_completed();
                info!(
                    "Scan complete: {} entries examined, {} matches",
                    outcome.stats.entries_examined, outcome.stats.matches_reported
                );
            }
            WalkStatus::Cancelled => {
                self.metrics.record_scan_aborted();
                info!(
                    "Scan aborted after {} entries",
                    outcome.stats.entries_examined
                );
            }
        }
    }

    /// Sleeps for the configured interval, polling so that a start-scan
    /// shortens the wait. Returns true if shutdown was requested.
    fn sleep_between_cycles(&self) -> bool {
        debug!("Sleeping for {} seconds", self.config.interval_secs);

        let deadline = Instant::now() + self.config.interval();
        let poll = self.config.poll_interval();
        loop {
            if self.signals.shutdown_requested() {
                return true;
            }
            if self.signals.scan_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(poll.min(deadline - now));
        }
    }
}
