//! Scan-control state shared between the signal watcher, the supervisor and
//! the traversal threads.
//!
//! Signals never touch scan state directly. The watcher thread translates
//! each delivered signal into a [`ControlEvent`] and sends it over a channel;
//! the supervisor is the only writer of the shared [`ScanSignals`] flags, and
//! every walker observes them at bounded polling points. Stores use release
//! ordering and loads acquire ordering, so a worker that sees a flag flip
//! also sees everything the supervisor wrote before flipping it.

use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// Tagged command delivered from the signal watcher to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Begin (or accelerate) scanning.
    StartScan,
    /// Abort in-flight traversals and return to idle.
    StopScan,
    /// Terminate the daemon cleanly.
    Shutdown,
}

/// Shared scan-lifecycle flags observed by every traversal thread.
#[derive(Debug, Default)]
pub struct ScanSignals {
    scan_requested: AtomicBool,
    stop_requested: AtomicBool,
    shutdown: AtomicBool,
    generation: AtomicU64,
}

impl ScanSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a start-scan intent: clears any stop intent, raises the scan
    /// flag and bumps the start generation so signal-gated workers can tell
    /// a fresh start apart from one they have already served.
    pub fn request_start(&self) {
        self.stop_requested.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.scan_requested.store(true, Ordering::Release);
    }

    /// Records a stop-scan intent observed by walker cancellation checks.
    pub fn request_stop(&self) {
        self.scan_requested.store(false, Ordering::Release);
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn scan_requested(&self) -> bool {
        self.scan_requested.load(Ordering::Acquire)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Number of start-scan intents recorded so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Consumes a pending start intent, if any. Used by the single-walker
    /// controller when it enters a scan cycle.
    pub fn take_scan_request(&self) -> bool {
        self.scan_requested.swap(false, Ordering::AcqRel)
    }

    /// Re-arms the next cycle: schedules another scan and clears the abort
    /// intent regardless of signal history. Called by the single-walker
    /// controller at the end of every cycle.
    pub fn rearm(&self) {
        self.stop_requested.store(false, Ordering::Release);
        self.scan_requested.store(true, Ordering::Release);
    }

    /// Cancellation predicate handed to walkers: abort on a stop intent and
    /// on shutdown, so a terminating daemon never finishes a long traversal.
    pub fn abort_requested(&self) -> bool {
        self.stop_requested() || self.shutdown_requested()
    }
}

/// Runs the supervisor loop until a shutdown event arrives or the sending
/// side hangs up. This is the sole writer of `signals`; all transition
/// logging happens here, on an ordinary thread, never in signal context.
pub fn run_supervisor(events: Receiver<ControlEvent>, signals: &ScanSignals) {
    for event in events.iter() {
        match event {
            ControlEvent::StartScan => {
                debug!("start-scan received: scan requested");
                signals.request_start();
            }
            ControlEvent::StopScan => {
                debug!("stop-scan received: abort requested");
                signals.request_stop();
            }
            ControlEvent::Shutdown => {
                info!("shutdown requested");
                signals.request_shutdown();
                return;
            }
        }
    }
    // Sender dropped without an explicit shutdown; treat it the same so
    // traversal threads are not left polling forever.
    signals.request_shutdown();
}
