//! Mouse Event Handling
//!
//! Tracks the pointer position across absolute and relative motion, maps
//! evdev button codes to logical button events, and throttles relative
//! motion.

use crate::input::coordinates::{clamp_to_screen, scale_to_screen, ClampPolicy, Point, Size};
use crate::input::events::{usec_to_ms, RawEventType, RawInputEvent};
use crate::input::throttle::{Clock, MonotonicClock, MotionThrottle};
use crate::input::translator::{DropReason, Translation, TranslationContext};
use crate::native::{NativePointerEvent, PointerKind};
use std::time::Duration;
use tracing::trace;

/// evdev `BTN_LEFT`
pub const BTN_LEFT: u32 = 0x110;
/// evdev `BTN_RIGHT`
pub const BTN_RIGHT: u32 = 0x111;
/// evdev `BTN_MIDDLE`
pub const BTN_MIDDLE: u32 = 0x112;

/// Mouse button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Convert from Linux button code; side and extra buttons are not mapped
    pub fn from_linux_button(code: u32) -> Option<Self> {
        match code {
            BTN_LEFT => Some(MouseButton::Left),
            BTN_RIGHT => Some(MouseButton::Right),
            BTN_MIDDLE => Some(MouseButton::Middle),
            _ => None,
        }
    }

    /// Logical event for a press or release of this button
    pub fn event_type(&self, pressed: bool) -> RawEventType {
        match (self, pressed) {
            (MouseButton::Left, true) => RawEventType::LeftButtonDown,
            (MouseButton::Left, false) => RawEventType::LeftButtonUp,
            (MouseButton::Right, true) => RawEventType::RightButtonDown,
            (MouseButton::Right, false) => RawEventType::RightButtonUp,
            (MouseButton::Middle, true) => RawEventType::MiddleButtonDown,
            (MouseButton::Middle, false) => RawEventType::MiddleButtonUp,
        }
    }
}

/// Mouse event handler
pub struct MouseHandler {
    /// Current pointer position; `None` until a screen size is first seen
    position: Option<Point>,

    /// Clamp applied after relative motion
    clamp_policy: ClampPolicy,

    /// Relative motion gate
    throttle: MotionThrottle,

    /// Time source for the throttle
    clock: Box<dyn Clock>,
}

impl MouseHandler {
    /// Create a handler with the default 40 ms throttle and per-axis clamping
    pub fn new() -> Self {
        Self::with_settings(
            MotionThrottle::default().interval(),
            ClampPolicy::default(),
            Box::new(MonotonicClock::new()),
        )
    }

    /// Create a handler with explicit throttle window, clamp policy and clock
    pub fn with_settings(
        throttle_interval: Duration,
        clamp_policy: ClampPolicy,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            position: None,
            clamp_policy,
            throttle: MotionThrottle::new(throttle_interval),
            clock,
        }
    }

    /// Process one pointer event
    pub fn handle(&mut self, event: &NativePointerEvent, ctx: &TranslationContext) -> Translation {
        let timestamp_ms = usec_to_ms(event.time_usec);

        match event.kind {
            PointerKind::MotionAbsolute { position } => {
                let position = scale_to_screen(position, ctx.screen);
                self.position = Some(position);
                self.emit(RawEventType::Move, position, timestamp_ms, ctx)
            }

            PointerKind::Motion { dx, dy } => {
                let position = self.handle_relative_move(dx, dy, ctx.screen);
                // Moves dropped for lack of a root must not open a throttle window
                if ctx.root.is_some() && !self.throttle.admit(self.clock.now()) {
                    return Translation::Dropped(DropReason::Throttled);
                }
                self.emit(RawEventType::Move, position, timestamp_ms, ctx)
            }

            PointerKind::Button { code, pressed } => {
                let Some(button) = MouseButton::from_linux_button(code) else {
                    trace!("Ignoring button code 0x{:x}", code);
                    return Translation::Dropped(DropReason::Ignored);
                };
                let position = self.current_or_center(ctx.screen);
                self.emit(button.event_type(pressed), position, timestamp_ms, ctx)
            }

            PointerKind::Axis => Translation::Dropped(DropReason::Ignored),
        }
    }

    /// Accumulate a relative delta and clamp the result to the screen
    fn handle_relative_move(&mut self, dx: f64, dy: f64, screen: Size) -> Point {
        let moved = self.current_or_center(screen).translate(dx, dy);
        let clamped = clamp_to_screen(moved, screen, self.clamp_policy);
        self.position = Some(clamped);
        clamped
    }

    fn current_or_center(&mut self, screen: Size) -> Point {
        *self.position.get_or_insert_with(|| screen.center())
    }

    fn emit(
        &self,
        event_type: RawEventType,
        position: Point,
        timestamp_ms: u64,
        ctx: &TranslationContext,
    ) -> Translation {
        match ctx.root {
            Some(root) => Translation::Emit(RawInputEvent::pointer(
                event_type,
                position,
                timestamp_ms,
                root,
            )),
            None => {
                trace!("Pointer {:?} dropped: no input root", event_type);
                Translation::Dropped(DropReason::NoInputRoot)
            }
        }
    }

    /// Current pointer position, if one has been established
    pub fn current_position(&self) -> Option<Point> {
        self.position
    }

    /// Relative moves suppressed by the throttle so far
    pub fn throttled_moves(&self) -> u64 {
        self.throttle.suppressed()
    }
}

impl Default for MouseHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MouseHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MouseHandler")
            .field("position", &self.position)
            .field("clamp_policy", &self.clamp_policy)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}
