//! Input Event Translator
//!
//! Routes each native event to the touch or pointer handler and reports what
//! became of it. Runs on the poller thread and owns all tracker state.

use crate::input::coordinates::{ClampPolicy, Size};
use crate::input::events::{InputRootId, RawInputEvent};
use crate::input::mouse::MouseHandler;
use crate::input::throttle::{Clock, MonotonicClock, DEFAULT_MOTION_THROTTLE};
use crate::input::touch::TouchHandler;
use crate::native::NativeEvent;
use std::time::Duration;
use tracing::trace;

/// Category of a native event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Touchscreen contact event
    Touch,
    /// Pointer motion or button event
    Pointer,
    /// Anything else; discarded
    Other,
}

/// Classify a native event
pub fn classify(event: &NativeEvent) -> EventCategory {
    match event {
        NativeEvent::Touch(_) => EventCategory::Touch,
        NativeEvent::Pointer(_) => EventCategory::Pointer,
        NativeEvent::Other => EventCategory::Other,
    }
}

/// Per-event inputs that live outside the translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationContext {
    /// Screen size at the time the event is handled
    pub screen: Size,
    /// Current delivery target
    pub root: Option<InputRootId>,
}

/// Why an event produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// No input root registered
    NoInputRoot,
    /// Relative motion inside the throttle window
    Throttled,
    /// Category or payload this pipeline does not handle
    Ignored,
}

/// Outcome of translating one native event
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// Event to enqueue for delivery
    Emit(RawInputEvent),
    /// Event consumed without output
    Dropped(DropReason),
}

/// Input event translator
#[derive(Debug)]
pub struct InputTranslator {
    /// Touch slot tracker
    touch: TouchHandler,

    /// Pointer state tracker
    mouse: MouseHandler,

    /// Total events processed
    events_processed: u64,
}

impl InputTranslator {
    /// Create a translator with default pointer settings
    pub fn new() -> Self {
        Self::with_settings(
            DEFAULT_MOTION_THROTTLE,
            ClampPolicy::default(),
            Box::new(MonotonicClock::new()),
        )
    }

    /// Create a translator with explicit pointer settings
    pub fn with_settings(
        throttle_interval: Duration,
        clamp_policy: ClampPolicy,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            touch: TouchHandler::new(),
            mouse: MouseHandler::with_settings(throttle_interval, clamp_policy, clock),
            events_processed: 0,
        }
    }

    /// Translate one native event
    pub fn translate(&mut self, event: &NativeEvent, ctx: &TranslationContext) -> Translation {
        self.events_processed += 1;

        match (classify(event), event) {
            (EventCategory::Touch, NativeEvent::Touch(touch)) => self.touch.handle(touch, ctx),
            (EventCategory::Pointer, NativeEvent::Pointer(pointer)) => {
                self.mouse.handle(pointer, ctx)
            }
            _ => {
                trace!("Discarding uncategorized native event");
                Translation::Dropped(DropReason::Ignored)
            }
        }
    }

    /// Get total events processed
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Touch tracker state
    pub fn touch(&self) -> &TouchHandler {
        &self.touch
    }

    /// Pointer tracker state
    pub fn mouse(&self) -> &MouseHandler {
        &self.mouse
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::coordinates::Point;
    use crate::input::events::RawEventType;
    use crate::input::mouse::BTN_LEFT;
    use crate::native::{NativePointerEvent, NativeTouchEvent, PointerKind, TouchPhase};

    fn ctx() -> TranslationContext {
        TranslationContext {
            screen: Size::new(1000.0, 500.0),
            root: Some(InputRootId(3)),
        }
    }

    #[test]
    fn test_translator_creation() {
        let translator = InputTranslator::new();
        assert_eq!(translator.events_processed(), 0);
        assert_eq!(translator.mouse().current_position(), None);
    }

    #[test]
    fn test_classify() {
        let touch = NativeEvent::Touch(NativeTouchEvent {
            phase: TouchPhase::Frame,
            slot: None,
            time_usec: 0,
            position: None,
        });
        let pointer = NativeEvent::Pointer(NativePointerEvent {
            time_usec: 0,
            kind: PointerKind::Axis,
        });
        assert_eq!(classify(&touch), EventCategory::Touch);
        assert_eq!(classify(&pointer), EventCategory::Pointer);
        assert_eq!(classify(&NativeEvent::Other), EventCategory::Other);
    }

    #[test]
    fn test_other_events_dropped() {
        let mut translator = InputTranslator::new();
        let t = translator.translate(&NativeEvent::Other, &ctx());
        assert_eq!(t, Translation::Dropped(DropReason::Ignored));
        assert_eq!(translator.events_processed(), 1);
    }

    #[test]
    fn test_routes_touch_and_pointer() {
        let mut translator = InputTranslator::new();
        let ctx = ctx();

        let down = NativeEvent::Touch(NativeTouchEvent {
            phase: TouchPhase::Down,
            slot: Some(4),
            time_usec: 2_000,
            position: Some(Point::new(0.5, 0.5)),
        });
        let click = NativeEvent::Pointer(NativePointerEvent {
            time_usec: 3_000,
            kind: PointerKind::Button {
                code: BTN_LEFT,
                pressed: true,
            },
        });

        match translator.translate(&down, &ctx) {
            Translation::Emit(ev) => {
                assert_eq!(ev.event_type, RawEventType::TouchBegin);
                assert_eq!(ev.position, Point::new(500.0, 250.0));
            }
            other => panic!("Expected touch event, got {:?}", other),
        }
        assert_eq!(translator.touch().active_contacts(), 1);

        match translator.translate(&click, &ctx) {
            Translation::Emit(ev) => assert_eq!(ev.event_type, RawEventType::LeftButtonDown),
            other => panic!("Expected button event, got {:?}", other),
        }
        assert_eq!(translator.events_processed(), 2);
    }
}
