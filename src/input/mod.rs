//! Input Event Handling
//!
//! Turns native touch and pointer events into [`RawInputEvent`]s for the UI
//! layer. Everything here runs on the poller thread and is plain owned state:
//! no locks, no native handles.
//!
//! # Architecture
//!
//! ```text
//! NativeEvent
//!       ↓
//! ┌─────────────────────────┐
//! │  InputTranslator        │ ← classify + route
//! └─────────────────────────┘
//!       ↓                ↓
//! ┌──────────────┐ ┌──────────────┐
//! │ TouchHandler │ │ MouseHandler │
//! │  slot table  │ │ position,    │
//! │              │ │ clamp,       │
//! │              │ │ throttle     │
//! └──────────────┘ └──────────────┘
//!       ↓                ↓
//! Translation::Emit(RawInputEvent) | Translation::Dropped(reason)
//! ```
//!
//! # Coordinates
//!
//! Device positions arrive normalized and are scaled by the screen size
//! passed in the [`TranslationContext`] for that event. Relative pointer
//! motion is clamped according to [`ClampPolicy`].

pub mod coordinates;
pub mod events;
pub mod mouse;
pub mod throttle;
pub mod touch;
pub mod translator;

pub use coordinates::{ClampPolicy, FixedScreen, Point, ScreenInfoProvider, Size};
pub use events::{DeviceKind, InputRootId, RawEventType, RawInputEvent};
pub use mouse::{MouseButton, MouseHandler};
pub use throttle::{Clock, ManualClock, MonotonicClock, MotionThrottle};
pub use touch::TouchHandler;
pub use translator::{
    classify, DropReason, EventCategory, InputTranslator, Translation, TranslationContext,
};
