//! Backend Statistics
//!
//! Lock-free counters shared by the poller thread and the consumer thread.
//! Every count only ever goes up; take a [`StatsSnapshot`] to read them.

use crate::input::translator::DropReason;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for one backend instance
#[derive(Debug)]
pub struct BackendStats {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    dropped_no_root: AtomicU64,
    dropped_uninitialized: AtomicU64,
    discarded_no_callback: AtomicU64,
    throttled: AtomicU64,
    ignored: AtomicU64,
    drains_scheduled: AtomicU64,
    start_time: Instant,
}

impl BackendStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped_no_root: AtomicU64::new(0),
            dropped_uninitialized: AtomicU64::new(0),
            discarded_no_callback: AtomicU64::new(0),
            throttled: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            drains_scheduled: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drain_scheduled(&self) {
        self.drains_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_uninitialized(&self) {
        self.dropped_uninitialized.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded_no_callback.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self, reason: DropReason) {
        let counter = match reason {
            DropReason::NoInputRoot => &self.dropped_no_root,
            DropReason::Throttled => &self.throttled,
            DropReason::Ignored => &self.ignored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.start_time.elapsed(),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped_no_root: self.dropped_no_root.load(Ordering::Relaxed),
            dropped_uninitialized: self.dropped_uninitialized.load(Ordering::Relaxed),
            discarded_no_callback: self.discarded_no_callback.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            drains_scheduled: self.drains_scheduled.load(Ordering::Relaxed),
        }
    }
}

impl Default for BackendStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`BackendStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Time since the backend was created
    pub uptime: Duration,
    /// Events pushed onto the pending queue
    pub enqueued: u64,
    /// Events handed to the input callback
    pub delivered: u64,
    /// Events discarded because no input root was set
    pub dropped_no_root: u64,
    /// Native events read before a screen provider was registered
    pub dropped_uninitialized: u64,
    /// Queued events the drain found no callback for
    pub discarded_no_callback: u64,
    /// Relative moves suppressed by the throttle
    pub throttled: u64,
    /// Native events with no meaning for this pipeline
    pub ignored: u64,
    /// Drain tasks posted to the scheduler
    pub drains_scheduled: u64,
}

impl StatsSnapshot {
    /// Events enqueued but not yet delivered or discarded by the drain
    pub fn in_flight(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.delivered)
            .saturating_sub(self.discarded_no_callback)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enqueued={} delivered={} drains={} no_root={} uninitialized={} no_callback={} \
             throttled={} ignored={}",
            self.enqueued,
            self.delivered,
            self.drains_scheduled,
            self.dropped_no_root,
            self.dropped_uninitialized,
            self.discarded_no_callback,
            self.throttled,
            self.ignored
        )
    }
}
