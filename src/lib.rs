//! # lamco-input-capture
//!
//! libinput capture-and-dispatch backend for single-threaded UI event loops
//! running directly on Linux input devices.
//!
//! A background thread polls every `/dev/input/event*` node through a
//! libinput path context, tracks touch contacts and the pointer, and hands
//! device-agnostic [`RawInputEvent`](input::RawInputEvent)s to the UI thread
//! through its scheduler.
//!
//! # Architecture
//!
//! ```text
//! lamco-input-capture
//!   ├─> native   (libinput path context, device discovery)
//!   ├─> input    (classification, touch slots, pointer state, throttle)
//!   ├─> backend  (poller thread, cross-thread queue, dispatcher, stats)
//!   └─> config   (TOML configuration)
//! ```
//!
//! # Data Flow
//!
//! **Input Path:** evdev → libinput → Poller → InputTranslator →
//! InputEventQueue → Scheduler (Input priority) → callback
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lamco_input_capture::backend::{BackendSettings, Dispatcher, LibinputBackend};
//! use lamco_input_capture::input::{FixedScreen, InputRootId, Size};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Arc::new(Dispatcher::new());
//! let backend = LibinputBackend::start(BackendSettings::default(), dispatcher.clone())?;
//!
//! backend.initialize(Arc::new(FixedScreen(Size::new(800.0, 600.0))), |event| {
//!     println!("{:?} at {}", event.event_type, event.position);
//! });
//! backend.set_input_root(Some(InputRootId(1)));
//!
//! dispatcher.run_forever();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Capture backend: poller thread, event queue, dispatcher
pub mod backend;

/// Configuration
pub mod config;

/// Event translation and tracker state
pub mod input;

/// libinput bindings and device discovery
pub mod native;

pub use backend::{BackendError, LibinputBackend};
pub use input::{InputRootId, RawEventType, RawInputEvent};
