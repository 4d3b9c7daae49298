//! Relative Motion Throttle
//!
//! Relative pointer devices report at up to 1 kHz. Delivering every report to
//! a single-threaded UI loop buys nothing but queue growth, so relative moves
//! are admitted at most once per window. Absolute moves, buttons and touch
//! never go through here.
//!
//! Time comes from a [`Clock`] so the policy can be exercised without sleeping.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default minimum spacing between delivered relative moves
pub const DEFAULT_MOTION_THROTTLE: Duration = Duration::from_millis(40);

/// Monotonic time source
pub trait Clock: Send {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall-clock backed [`Clock`] using [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced [`Clock`]
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Jump to an absolute time
    pub fn set(&self, at: Duration) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Minimum-interval gate for relative pointer motion
#[derive(Debug, Clone)]
pub struct MotionThrottle {
    interval: Duration,
    last_admitted: Option<Duration>,
    suppressed: u64,
}

impl MotionThrottle {
    /// Create a throttle with the given window; a zero window admits everything
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: None,
            suppressed: 0,
        }
    }

    /// Decide whether a move observed at `now` is delivered
    ///
    /// The first move is always admitted. The window restarts only when a
    /// move is admitted, so a continuous stream yields one move per window.
    pub fn admit(&mut self, now: Duration) -> bool {
        let admitted = match self.last_admitted {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        };

        if admitted {
            self.last_admitted = Some(now);
        } else {
            self.suppressed += 1;
        }
        admitted
    }

    /// Configured window
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Moves rejected so far
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

impl Default for MotionThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MOTION_THROTTLE)
    }
}
