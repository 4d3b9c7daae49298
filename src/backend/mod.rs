//! libinput Capture Backend
//!
//! Captures touch and pointer input on a dedicated poller thread and delivers
//! it to a single-threaded consumer through its [`Scheduler`].
//!
//! # Problem Statement
//!
//! A libinput context is `!Send`, and the UI loop that consumes input must
//! never block on device I/O. The native side and the consumer side therefore
//! live on different threads and share only the pending event queue and a few
//! read-mostly configuration slots.
//!
//! # Architecture
//!
//! ```text
//! Consumer thread                     Poller thread ("libinput-poller")
//! ━━━━━━━━━━━━━━━                     ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//!
//! LibinputBackend::start() ──spawn──> factory() → InputSource
//!       │ <────── startup result ────────┤
//!       │                                ├─ dispatch / drain / poll
//! initialize(screen, callback) ──┐       │    └─ InputTranslator
//! set_input_root(root) ──────────┤       │         (touch + pointer state)
//!                                ▼       │
//!                          SharedState <─┤ read per event
//!                                        │
//! Scheduler ◄── post(Input, drain) ── InputEventQueue::enqueue
//!   └─ drain → callback(RawInputEvent)
//! ```
//!
//! The source is built by a factory that runs on the poller thread, so a
//! native context never crosses threads. Startup waits for the factory's
//! result and returns its error, if any.

pub mod dispatcher;
pub mod error;
pub mod event_queue;
pub mod poller;
pub mod stats;

pub use dispatcher::{Dispatcher, Job, Priority, Scheduler};
pub use error::{BackendError, Result};
pub use event_queue::{InputCallback, InputEventQueue};
pub use poller::{Poller, DEFAULT_POLL_TIMEOUT_MS};
pub use stats::{BackendStats, StatsSnapshot};

use crate::config::Config;
use crate::input::coordinates::{ClampPolicy, ScreenInfoProvider};
use crate::input::events::{InputRootId, RawInputEvent};
use crate::input::throttle::{Clock, MonotonicClock, DEFAULT_MOTION_THROTTLE};
use crate::input::translator::InputTranslator;
use crate::native::{InputSource, LibinputSource};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info};

/// Poller thread name
const POLLER_THREAD_NAME: &str = "libinput-poller";

/// Startup parameters for [`LibinputBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    /// Directory scanned for device nodes
    pub device_dir: PathBuf,
    /// Device node name prefix
    pub device_prefix: String,
    /// Bound on one blocking wait, in milliseconds
    pub poll_timeout_ms: u16,
    /// Relative motion throttle window
    pub throttle: Duration,
    /// Clamp applied after relative motion
    pub clamp_policy: ClampPolicy,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev/input"),
            device_prefix: "event".to_string(),
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            throttle: DEFAULT_MOTION_THROTTLE,
            clamp_policy: ClampPolicy::default(),
        }
    }
}

impl From<&Config> for BackendSettings {
    fn from(config: &Config) -> Self {
        Self {
            device_dir: config.devices.directory.clone(),
            device_prefix: config.devices.prefix.clone(),
            poll_timeout_ms: config.polling.timeout_ms,
            throttle: config.throttle_interval(),
            clamp_policy: config.pointer.clamp_policy,
        }
    }
}

/// State written by the consumer side and read by the poller per event
pub(crate) struct SharedState {
    screen: RwLock<Option<Arc<dyn ScreenInfoProvider>>>,
    root: RwLock<Option<InputRootId>>,
    stop: AtomicBool,
    running: AtomicBool,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self {
            screen: RwLock::new(None),
            root: RwLock::new(None),
            stop: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    pub(crate) fn screen(&self) -> Option<Arc<dyn ScreenInfoProvider>> {
        self.screen.read().clone()
    }

    pub(crate) fn set_screen(&self, screen: Arc<dyn ScreenInfoProvider>) {
        *self.screen.write() = Some(screen);
    }

    pub(crate) fn input_root(&self) -> Option<InputRootId> {
        *self.root.read()
    }

    pub(crate) fn set_input_root(&self, root: Option<InputRootId>) {
        *self.root.write() = root;
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Capture backend handle
pub struct LibinputBackend {
    shared: Arc<SharedState>,
    queue: Arc<InputEventQueue>,
    stats: Arc<BackendStats>,
    thread: Option<JoinHandle<()>>,
}

impl LibinputBackend {
    /// Open the configured devices with libinput and start polling
    pub fn start(settings: BackendSettings, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        let device_dir = settings.device_dir.clone();
        let device_prefix = settings.device_prefix.clone();

        Self::start_with_source(
            settings,
            scheduler,
            Box::new(MonotonicClock::new()),
            move || LibinputSource::open(&device_dir, &device_prefix),
        )
    }

    /// Start polling a source built by `factory` on the poller thread
    pub fn start_with_source<S, F>(
        settings: BackendSettings,
        scheduler: Arc<dyn Scheduler>,
        clock: Box<dyn Clock>,
        factory: F,
    ) -> Result<Self>
    where
        S: InputSource + 'static,
        F: FnOnce() -> Result<S> + Send + 'static,
    {
        let stats = Arc::new(BackendStats::new());
        let shared = Arc::new(SharedState::new());
        let queue = InputEventQueue::new(scheduler, Arc::clone(&stats));

        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<()>>(1);

        let thread_shared = Arc::clone(&shared);
        let thread_queue = Arc::clone(&queue);
        let thread_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(POLLER_THREAD_NAME.to_string())
            .spawn(move || {
                let source = match factory() {
                    Ok(source) => source,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let translator =
                    InputTranslator::with_settings(settings.throttle, settings.clamp_policy, clock);
                let poller = Poller::new(
                    source,
                    translator,
                    Arc::clone(&thread_shared),
                    thread_queue,
                    thread_stats,
                    settings.poll_timeout_ms,
                );

                thread_shared.running.store(true, Ordering::Release);
                let _ = ready_tx.send(Ok(()));

                if let Err(e) = poller.run() {
                    error!("Input poller stopped: {}", e);
                }
                thread_shared.running.store(false, Ordering::Release);
            })
            .map_err(BackendError::ThreadSpawn)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("Input capture backend started");
                Ok(Self {
                    shared,
                    queue,
                    stats,
                    thread: Some(handle),
                })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(BackendError::StartupAborted)
            }
        }
    }

    /// Register the screen provider and the input callback
    ///
    /// Events read before this call are dropped and counted.
    pub fn initialize<F>(&self, screen: Arc<dyn ScreenInfoProvider>, on_input: F)
    where
        F: Fn(RawInputEvent) + Send + Sync + 'static,
    {
        // Callback first: once the screen is visible the poller starts enqueueing
        self.queue.set_callback(Arc::new(on_input));
        self.shared.set_screen(screen);
        info!("Input capture backend initialized");
    }

    /// Set or clear the delivery target
    pub fn set_input_root(&self, root: Option<InputRootId>) {
        self.shared.set_input_root(root);
    }

    /// Current delivery target
    pub fn input_root(&self) -> Option<InputRootId> {
        self.shared.input_root()
    }

    /// Read the backend counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Whether the poller thread is still looping
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stop the poller thread and wait for it to exit
    pub fn stop(&mut self) {
        self.shared.request_stop();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!("Input poller thread panicked");
            }
            info!("Input capture backend stopped");
        }
    }
}

impl Drop for LibinputBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for LibinputBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibinputBackend")
            .field("running", &self.is_running())
            .field("input_root", &self.input_root())
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::coordinates::{Point, Size};
    use crate::input::events::RawEventType;
    use crate::input::throttle::ManualClock;
    use crate::native::{NativeEvent, NativePointerEvent, PointerKind};
    use mockall::mock;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::io;
    use std::os::fd::{AsFd, BorrowedFd};
    use std::os::unix::net::UnixStream;
    use std::path::Path;

    mock! {
        Screen {}
        impl ScreenInfoProvider for Screen {
            fn scaled_size(&self) -> Size;
        }
    }

    /// Source fed from the test through a shared queue
    struct FeedSource {
        feed: Arc<Mutex<VecDeque<NativeEvent>>>,
        fd: UnixStream,
        _peer: UnixStream,
    }

    impl InputSource for FeedSource {
        fn add_device(&mut self, _path: &Path) -> bool {
            true
        }

        fn fd(&self) -> BorrowedFd<'_> {
            self.fd.as_fd()
        }

        fn dispatch(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn next_event(&mut self) -> Option<NativeEvent> {
            self.feed.lock().pop_front()
        }
    }

    fn start_fed(
        dispatcher: Arc<Dispatcher>,
    ) -> (LibinputBackend, Arc<Mutex<VecDeque<NativeEvent>>>) {
        let feed = Arc::new(Mutex::new(VecDeque::new()));
        let source_feed = Arc::clone(&feed);
        let backend = LibinputBackend::start_with_source(
            BackendSettings::default(),
            dispatcher,
            Box::new(ManualClock::new()),
            move || {
                let (fd, peer) = UnixStream::pair().map_err(BackendError::Dispatch)?;
                Ok(FeedSource {
                    feed: source_feed,
                    fd,
                    _peer: peer,
                })
            },
        )
        .unwrap();
        (backend, feed)
    }

    fn click() -> NativeEvent {
        NativeEvent::Pointer(NativePointerEvent {
            time_usec: 77_000,
            kind: PointerKind::Button {
                code: crate::input::mouse::BTN_RIGHT,
                pressed: true,
            },
        })
    }

    fn wait_for(mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not met in time");
    }

    #[test]
    fn test_factory_error_is_returned() {
        let result = LibinputBackend::start_with_source(
            BackendSettings::default(),
            Arc::new(Dispatcher::new()),
            Box::new(ManualClock::new()),
            || -> Result<FeedSource> {
                Err(BackendError::DeviceDirectory {
                    path: "/nonexistent".into(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                })
            },
        );
        assert!(matches!(result, Err(BackendError::DeviceDirectory { .. })));
    }

    #[test]
    fn test_delivery_through_backend() {
        let dispatcher = Arc::new(Dispatcher::new());
        let (mut backend, feed) = start_fed(Arc::clone(&dispatcher));
        assert!(backend.is_running());

        let mut screen = MockScreen::new();
        screen
            .expect_scaled_size()
            .returning(|| Size::new(640.0, 480.0));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        backend.initialize(Arc::new(screen), move |ev| sink.lock().push(ev));
        backend.set_input_root(Some(InputRootId(42)));

        feed.lock().push_back(click());
        wait_for(|| backend.stats().enqueued == 1);
        dispatcher.run_until_idle();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_type, RawEventType::RightButtonDown);
        assert_eq!(seen[0].position, Point::new(320.0, 240.0));
        assert_eq!(seen[0].timestamp_ms, 77);
        assert_eq!(seen[0].root, InputRootId(42));
        drop(seen);

        backend.stop();
        assert!(!backend.is_running());
    }

    #[test]
    fn test_events_before_initialize_dropped() {
        let dispatcher = Arc::new(Dispatcher::new());
        let (backend, feed) = start_fed(Arc::clone(&dispatcher));

        feed.lock().push_back(click());
        wait_for(|| backend.stats().dropped_uninitialized == 1);
        assert_eq!(backend.stats().enqueued, 0);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.pointer.throttle_ms = 15;
        config.pointer.clamp_policy = ClampPolicy::Legacy;

        let settings = BackendSettings::from(&config);
        assert_eq!(settings.throttle, Duration::from_millis(15));
        assert_eq!(settings.clamp_policy, ClampPolicy::Legacy);
        assert_eq!(settings.poll_timeout_ms, 10);
        assert_eq!(settings.device_dir, PathBuf::from("/dev/input"));
    }
}
