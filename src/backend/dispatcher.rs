//! Priority Job Dispatcher
//!
//! The consumer side of the pipeline is a single-threaded loop that runs
//! posted jobs by priority. [`Scheduler`] is the contract the event queue
//! relies on; [`Dispatcher`] is the implementation the binary and the tests
//! run on.
//!
//! # Ordering
//!
//! ```text
//! Send      ← highest
//! Normal
//! Render
//! Loaded
//! Input     ← input drain runs here and yields to everything above
//! Background
//! ```
//!
//! Jobs run highest priority first, FIFO within a priority. The queue lock is
//! never held while a job runs, so jobs may post or run other jobs.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Job priority, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Idle-time work
    Background,
    /// Input delivery
    Input,
    /// Post-load notifications
    Loaded,
    /// Rendering
    Render,
    /// Ordinary application work
    Normal,
    /// Synchronous cross-thread calls
    Send,
}

impl Priority {
    /// The next priority up; `Send` saturates
    pub fn next_higher(self) -> Self {
        match self {
            Priority::Background => Priority::Input,
            Priority::Input => Priority::Loaded,
            Priority::Loaded => Priority::Render,
            Priority::Render => Priority::Normal,
            Priority::Normal | Priority::Send => Priority::Send,
        }
    }
}

/// Unit of work posted to a scheduler
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling contract of the consumer thread
pub trait Scheduler: Send + Sync {
    /// Queue `job` at `priority`; callable from any thread
    fn post(&self, priority: Priority, job: Job);

    /// Run queued jobs with priority `>= min_priority` until none remain
    ///
    /// Called from the consumer thread, including from inside a running job.
    fn run_jobs(&self, min_priority: Priority);
}

/// Reference [`Scheduler`] with blocking run loops
pub struct Dispatcher {
    queues: Mutex<BTreeMap<Priority, VecDeque<Job>>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    shutdown: AtomicBool,
    jobs_run: AtomicU64,
}

impl Dispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        // One pending wake-up is enough: every wake drains all queues
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            queues: Mutex::new(BTreeMap::new()),
            wake_tx,
            wake_rx,
            shutdown: AtomicBool::new(false),
            jobs_run: AtomicU64::new(0),
        }
    }

    fn wake(&self) {
        // Full means a wake-up is already pending
        let _ = self.wake_tx.try_send(());
    }

    fn pop_job(&self, min_priority: Priority) -> Option<Job> {
        let mut queues = self.queues.lock();
        queues
            .range_mut(min_priority..)
            .rev()
            .find_map(|(_, queue)| queue.pop_front())
    }

    /// Run every queued job regardless of priority
    pub fn run_until_idle(&self) {
        self.run_jobs(Priority::Background);
    }

    /// Run jobs as they arrive until `duration` elapses or [`shutdown`](Self::shutdown)
    pub fn run_for(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            self.run_until_idle();
            if self.is_shutdown() {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.wake_rx.recv_timeout(deadline - now) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    self.run_until_idle();
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Run jobs as they arrive until [`shutdown`](Self::shutdown)
    pub fn run_forever(&self) {
        debug!("Dispatcher loop started");
        loop {
            self.run_until_idle();
            if self.is_shutdown() {
                break;
            }
            if self.wake_rx.recv().is_err() {
                break;
            }
        }
        debug!(
            "Dispatcher loop stopped after {} job(s)",
            self.jobs_run.load(Ordering::Relaxed)
        );
    }

    /// Make blocking loops return after their current job
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.wake();
    }

    /// Whether [`shutdown`](Self::shutdown) was called
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Jobs waiting to run
    pub fn pending(&self) -> usize {
        self.queues.lock().values().map(VecDeque::len).sum()
    }

    /// Jobs run so far
    pub fn jobs_run(&self) -> u64 {
        self.jobs_run.load(Ordering::Relaxed)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for Dispatcher {
    fn post(&self, priority: Priority, job: Job) {
        self.queues.lock().entry(priority).or_default().push_back(job);
        trace!("Job posted at {:?}", priority);
        self.wake();
    }

    fn run_jobs(&self, min_priority: Priority) {
        while let Some(job) = self.pop_job(min_priority) {
            job();
            self.jobs_run.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending())
            .field("shutdown", &self.is_shutdown())
            .field("jobs_run", &self.jobs_run())
            .finish()
    }
}
