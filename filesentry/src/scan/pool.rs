use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

use crate::config::{RescanPolicy, ScanConfig};
use crate::control::ScanSignals;
use crate::errors::ScanResult;
use crate::matcher::PatternSet;
use crate::reporter;
use crate::scan::walker::{WalkStatus, Walker};
use crate::scan::ScanMetrics;

/// Worker-pool scan controller: one traversal thread per pattern.
///
/// Each worker independently walks the whole tree matching only its own
/// pattern, so the per-pattern traversals proceed concurrently and in no
/// coordinated order. Workers idle-poll the shared scan flag; a stop-scan
/// halts every running traversal within one entry-processing step and no
/// worker resumes until the next start-scan.
///
/// What happens after a worker finishes a traversal while the scan flag is
/// still raised is a policy choice (see [`RescanPolicy`]): `Continuous`
/// starts the next traversal immediately, `Gated` waits for a fresh
/// start-scan signal, distinguished by the start generation counter.
pub struct WorkerPool {
    config: ScanConfig,
    patterns: PatternSet,
    signals: Arc<ScanSignals>,
    metrics: ScanMetrics,
}

impl WorkerPool {
    pub fn new(config: ScanConfig, signals: Arc<ScanSignals>) -> ScanResult<Self> {
        let patterns = config.pattern_set()?;
        Ok(Self {
            config,
            patterns,
            signals,
            metrics: ScanMetrics::new(),
        })
    }

    /// Shared handle onto this pool's counters.
    pub fn metrics(&self) -> ScanMetrics {
        self.metrics.clone()
    }

    /// Spawns one worker per pattern and blocks until all of them have
    /// observed shutdown and returned.
    pub fn run(&self) {
        info!(
            "Worker pool active: {} workers, {} rescan",
            self.patterns.len(),
            self.config.rescan
        );

        thread::scope(|scope| {
            for pattern in self.patterns.iter() {
                scope.spawn(move || self.worker_loop(pattern));
            }
        });

        info!("Worker pool stopped");
    }

    fn worker_loop(&self, pattern: &str) {
        let set = PatternSet::single(pattern);
        let walker = Walker::new(&set, self.config.verbose, self.config.max_depth);
        let poll = self.config.poll_interval();
        let mut served_generation = 0u64;

        loop {
            // Idle until a start intent this worker should serve.
            loop {
                if self.signals.shutdown_requested() {
                    debug!("Worker for pattern {pattern} shutting down");
                    return;
                }
                if self.signals.scan_requested() && !self.signals.stop_requested() {
                    match self.config.rescan {
                        RescanPolicy::Continuous => break,
                        RescanPolicy::Gated => {
                            let generation = self.signals.generation();
                            if generation != served_generation {
                                served_generation = generation;
                                break;
                            }
                        }
                    }
                }
                thread::sleep(poll);
            }

            debug!("Worker for pattern {pattern} started scanning");
            self.metrics.record_scan_started();

            let outcome = walker.walk(
                &self.config.root_path,
                &|| self.signals.abort_requested(),
                &mut |path, matched| reporter::report(path, matched),
            );
            self.metrics.record_walk(&outcome.stats);

            match outcome.status {
                WalkStatus::Completed => {
                    self.metrics.record_scan_completed();
                    debug!("Worker for pattern {pattern} finished scanning");
                }
                WalkStatus::Cancelled => {
                    self.metrics.record_scan_aborted();
                    debug!("Worker for pattern {pattern} stopped scanning");
                }
            }
        }
    }
}
