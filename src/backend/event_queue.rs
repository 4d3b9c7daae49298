//! Cross-Thread Input Event Queue
//!
//! Bridges the poller thread and the consumer's [`Scheduler`].
//!
//! ```text
//! poller thread                      consumer thread
//! ━━━━━━━━━━━━━                      ━━━━━━━━━━━━━━━
//! enqueue(ev) ──lock──> [pending] <──lock── drain job
//!    │  0 → 1 transition                │  run jobs above Input
//!    └──post(Input, drain) ────────────>│  pop one, unlock
//!                                       │  callback(ev)
//!                                       └─ repeat until empty
//! ```
//!
//! Exactly one drain job is posted per empty-to-nonempty transition, and the
//! post happens under the queue lock so two producers can never both see the
//! transition. The drain yields to higher-priority work between events and
//! never holds the lock while the callback runs.

use crate::backend::dispatcher::{Priority, Scheduler};
use crate::backend::stats::BackendStats;
use crate::input::events::RawInputEvent;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Consumer-side input callback
pub type InputCallback = Arc<dyn Fn(RawInputEvent) + Send + Sync>;

/// Pending event queue plus its drain trampoline
pub struct InputEventQueue {
    pending: Mutex<VecDeque<RawInputEvent>>,
    scheduler: Arc<dyn Scheduler>,
    callback: RwLock<Option<InputCallback>>,
    stats: Arc<BackendStats>,
}

impl InputEventQueue {
    /// Create an empty queue draining on `scheduler`
    pub fn new(scheduler: Arc<dyn Scheduler>, stats: Arc<BackendStats>) -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(VecDeque::new()),
            scheduler,
            callback: RwLock::new(None),
            stats,
        })
    }

    /// Install the callback invoked for each drained event
    pub fn set_callback(&self, callback: InputCallback) {
        *self.callback.write() = Some(callback);
    }

    /// Whether a callback has been installed
    pub fn has_callback(&self) -> bool {
        self.callback.read().is_some()
    }

    /// Queue an event for delivery; callable from any thread
    pub fn enqueue(self: &Arc<Self>, event: RawInputEvent) {
        let mut pending = self.pending.lock();
        pending.push_back(event);
        self.stats.record_enqueued();

        if pending.len() == 1 {
            let queue = Arc::clone(self);
            self.scheduler
                .post(Priority::Input, Box::new(move || queue.drain()));
            self.stats.record_drain_scheduled();
            trace!("Input drain scheduled");
        }
    }

    fn drain(&self) {
        loop {
            self.scheduler.run_jobs(Priority::Input.next_higher());

            let Some(event) = self.pending.lock().pop_front() else {
                return;
            };

            let callback = self.callback.read().clone();
            match callback {
                Some(callback) => {
                    callback(event);
                    self.stats.record_delivered();
                }
                None => {
                    trace!("No input callback installed, discarding {:?}", event.event_type);
                    self.stats.record_discarded();
                }
            }
        }
    }

    /// Events waiting for the drain
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether no events are waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for InputEventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputEventQueue")
            .field("pending", &self.len())
            .field("has_callback", &self.has_callback())
            .finish_non_exhaustive()
    }
}
