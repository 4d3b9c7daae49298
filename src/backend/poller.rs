//! Device Poll Loop
//!
//! Runs on the dedicated poller thread and owns everything that is not
//! thread-safe: the native source and all tracker state. Each iteration
//! dispatches, drains every pending native event through the translator,
//! then blocks on the source descriptor for at most the poll timeout.

use crate::backend::error::{BackendError, Result};
use crate::backend::event_queue::InputEventQueue;
use crate::backend::stats::BackendStats;
use crate::backend::SharedState;
use crate::input::translator::{InputTranslator, Translation, TranslationContext};
use crate::native::{InputSource, NativeEvent};
use nix::poll::{poll, PollFd, PollFlags};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Default bound on one blocking wait, in milliseconds
pub const DEFAULT_POLL_TIMEOUT_MS: u16 = 10;

/// Poll loop state
pub struct Poller<S: InputSource> {
    source: S,
    translator: InputTranslator,
    shared: Arc<SharedState>,
    queue: Arc<InputEventQueue>,
    stats: Arc<BackendStats>,
    poll_timeout_ms: u16,
}

impl<S: InputSource> Poller<S> {
    pub(crate) fn new(
        source: S,
        translator: InputTranslator,
        shared: Arc<SharedState>,
        queue: Arc<InputEventQueue>,
        stats: Arc<BackendStats>,
        poll_timeout_ms: u16,
    ) -> Self {
        Self {
            source,
            translator,
            shared,
            queue,
            stats,
            poll_timeout_ms,
        }
    }

    /// Dispatch and drain every pending native event
    ///
    /// The source is re-dispatched after each event so events that arrive
    /// during the drain are picked up in the same pass. Returns the number of
    /// native events handled.
    pub fn run_once(&mut self) -> Result<usize> {
        self.source.dispatch().map_err(BackendError::Dispatch)?;

        let mut handled = 0;
        while let Some(event) = self.source.next_event() {
            self.handle_event(&event);
            handled += 1;
            self.source.dispatch().map_err(BackendError::Dispatch)?;
        }

        if handled > 0 {
            trace!("Drained {} native event(s)", handled);
        }
        Ok(handled)
    }

    fn handle_event(&mut self, event: &NativeEvent) {
        // Nothing is translated before a screen provider is registered
        let Some(screen) = self.shared.screen() else {
            self.stats.record_uninitialized();
            return;
        };

        let ctx = TranslationContext {
            screen: screen.scaled_size(),
            root: self.shared.input_root(),
        };

        match self.translator.translate(event, &ctx) {
            Translation::Emit(raw) => self.queue.enqueue(raw),
            Translation::Dropped(reason) => self.stats.record_drop(reason),
        }
    }

    /// Block until the source is readable or the poll timeout passes
    ///
    /// Returns `true` if the descriptor became readable.
    pub fn wait_readable(&self) -> Result<bool> {
        let mut fds = [PollFd::new(self.source.fd(), PollFlags::POLLIN)];
        let ready = poll(&mut fds, self.poll_timeout_ms)?;
        Ok(ready > 0)
    }

    fn iterate(&mut self) -> Result<()> {
        self.run_once()?;
        self.wait_readable()?;
        Ok(())
    }

    /// Loop until stop is requested or a fatal error occurs
    pub fn run(mut self) -> Result<()> {
        debug!("Poll loop running (timeout {} ms)", self.poll_timeout_ms);

        while !self.shared.stop_requested() {
            if let Err(e) = self.iterate() {
                if e.is_transient() {
                    warn!("Transient poll loop error, retrying: {}", e);
                    continue;
                }
                return Err(e);
            }
        }

        debug!(
            "Poll loop stopped after {} native event(s)",
            self.translator.events_processed()
        );
        Ok(())
    }

    /// Translator state
    pub fn translator(&self) -> &InputTranslator {
        &self.translator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dispatcher::Dispatcher;
    use crate::input::coordinates::{FixedScreen, Point, Size};
    use crate::input::events::{InputRootId, RawEventType, RawInputEvent};
    use crate::native::{NativePointerEvent, NativeTouchEvent, PointerKind, TouchPhase};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::io;
    use std::os::fd::{AsFd, BorrowedFd};
    use std::os::unix::net::UnixStream;
    use std::path::Path;

    struct ScriptedSource {
        events: VecDeque<NativeEvent>,
        dispatches: usize,
        fail_dispatch: bool,
        fd: UnixStream,
        _peer: UnixStream,
    }

    impl ScriptedSource {
        fn new(events: Vec<NativeEvent>) -> Self {
            let (fd, peer) = UnixStream::pair().unwrap();
            Self {
                events: events.into(),
                dispatches: 0,
                fail_dispatch: false,
                fd,
                _peer: peer,
            }
        }
    }

    impl InputSource for ScriptedSource {
        fn add_device(&mut self, _path: &Path) -> bool {
            true
        }

        fn fd(&self) -> BorrowedFd<'_> {
            self.fd.as_fd()
        }

        fn dispatch(&mut self) -> io::Result<()> {
            self.dispatches += 1;
            if self.fail_dispatch {
                return Err(io::Error::from_raw_os_error(libc::ENODEV));
            }
            Ok(())
        }

        fn next_event(&mut self) -> Option<NativeEvent> {
            self.events.pop_front()
        }
    }

    struct Harness {
        dispatcher: Arc<Dispatcher>,
        shared: Arc<SharedState>,
        stats: Arc<BackendStats>,
        seen: Arc<Mutex<Vec<RawInputEvent>>>,
        queue: Arc<InputEventQueue>,
    }

    impl Harness {
        fn new() -> Self {
            let dispatcher = Arc::new(Dispatcher::new());
            let stats = Arc::new(BackendStats::new());
            let queue = InputEventQueue::new(dispatcher.clone(), Arc::clone(&stats));
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            queue.set_callback(Arc::new(move |ev: RawInputEvent| sink.lock().push(ev)));
            Self {
                dispatcher,
                shared: Arc::new(SharedState::new()),
                stats,
                seen,
                queue,
            }
        }

        fn poller(&self, events: Vec<NativeEvent>) -> Poller<ScriptedSource> {
            Poller::new(
                ScriptedSource::new(events),
                InputTranslator::new(),
                Arc::clone(&self.shared),
                Arc::clone(&self.queue),
                Arc::clone(&self.stats),
                DEFAULT_POLL_TIMEOUT_MS,
            )
        }

        fn initialize(&self) {
            self.shared
                .set_screen(Arc::new(FixedScreen(Size::new(800.0, 600.0))));
            self.shared.set_input_root(Some(InputRootId(9)));
        }
    }

    fn touch_down(slot: u32) -> NativeEvent {
        NativeEvent::Touch(NativeTouchEvent {
            phase: TouchPhase::Down,
            slot: Some(slot),
            time_usec: 1_000,
            position: Some(Point::new(0.5, 0.5)),
        })
    }

    fn abs_move() -> NativeEvent {
        NativeEvent::Pointer(NativePointerEvent {
            time_usec: 2_000,
            kind: PointerKind::MotionAbsolute {
                position: Point::new(0.25, 0.25),
            },
        })
    }

    #[test]
    fn test_run_once_drains_and_redispatches() {
        let harness = Harness::new();
        harness.initialize();
        let mut poller = harness.poller(vec![touch_down(0), NativeEvent::Other, abs_move()]);

        assert_eq!(poller.run_once().unwrap(), 3);
        // One initial dispatch plus one after each event
        assert_eq!(poller.source.dispatches, 4);

        harness.dispatcher.run_until_idle();
        let seen = harness.seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].event_type, RawEventType::TouchBegin);
        assert_eq!(seen[1].event_type, RawEventType::Move);
        assert_eq!(seen[1].root, InputRootId(9));

        let snap = harness.stats.snapshot();
        assert_eq!(snap.ignored, 1);
        assert_eq!(snap.drains_scheduled, 1);
        assert_eq!(poller.translator().events_processed(), 3);
    }

    #[test]
    fn test_events_before_initialize_are_counted() {
        let harness = Harness::new();
        let mut poller = harness.poller(vec![touch_down(1), abs_move()]);

        assert_eq!(poller.run_once().unwrap(), 2);
        assert!(harness.queue.is_empty());
        assert_eq!(harness.stats.snapshot().dropped_uninitialized, 2);
    }

    #[test]
    fn test_uncategorized_event_before_initialize() {
        let harness = Harness::new();
        let mut poller = harness.poller(vec![NativeEvent::Other]);

        poller.run_once().unwrap();
        let snap = harness.stats.snapshot();
        assert_eq!(snap.dropped_uninitialized, 1);
        assert_eq!(snap.ignored, 0);
        assert_eq!(poller.translator().events_processed(), 0);
    }

    #[test]
    fn test_events_without_root_are_counted() {
        let harness = Harness::new();
        harness.initialize();
        harness.shared.set_input_root(None);
        let mut poller = harness.poller(vec![touch_down(1)]);

        poller.run_once().unwrap();
        assert!(harness.queue.is_empty());
        assert_eq!(harness.stats.snapshot().dropped_no_root, 1);
        assert_eq!(poller.translator().touch().active_contacts(), 1);
    }

    #[test]
    fn test_dispatch_failure_is_fatal() {
        let harness = Harness::new();
        let mut poller = harness.poller(Vec::new());
        poller.source.fail_dispatch = true;

        let err = poller.run_once().unwrap_err();
        assert!(matches!(err, BackendError::Dispatch(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_wait_readable_times_out() {
        let harness = Harness::new();
        let poller = harness.poller(Vec::new());
        assert!(!poller.wait_readable().unwrap());
    }

    #[test]
    fn test_run_exits_on_stop() {
        let harness = Harness::new();
        harness.shared.request_stop();
        let poller = harness.poller(vec![abs_move()]);
        assert!(poller.run().is_ok());
    }
}
