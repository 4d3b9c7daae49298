//! Raw Input Events
//!
//! The device-agnostic events this crate delivers to the UI layer. They carry
//! only what routing needs: what happened, where, when, and which touch
//! contact it belongs to.

use crate::input::coordinates::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for the delivery target (typically a top-level surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRootId(pub u64);

impl fmt::Display for InputRootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

/// Device family an event originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Touchscreen contact
    Touch,
    /// Mouse, touchpad or absolute pointer
    Pointer,
}

/// Logical action of a raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawEventType {
    /// A touch contact went down
    TouchBegin,
    /// A touch contact moved
    TouchUpdate,
    /// A touch contact lifted
    TouchEnd,
    /// A touch contact was cancelled by the device
    TouchCancel,
    /// Pointer moved
    Move,
    /// Left button pressed
    LeftButtonDown,
    /// Left button released
    LeftButtonUp,
    /// Middle button pressed
    MiddleButtonDown,
    /// Middle button released
    MiddleButtonUp,
    /// Right button pressed
    RightButtonDown,
    /// Right button released
    RightButtonUp,
}

impl RawEventType {
    /// Device family this action belongs to
    pub fn device_kind(self) -> DeviceKind {
        match self {
            RawEventType::TouchBegin
            | RawEventType::TouchUpdate
            | RawEventType::TouchEnd
            | RawEventType::TouchCancel => DeviceKind::Touch,
            _ => DeviceKind::Pointer,
        }
    }
}

/// Event handed to the input callback on the consumer thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    /// What happened
    pub event_type: RawEventType,
    /// Position in scaled screen coordinates
    pub position: Point,
    /// Device timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Delivery target
    pub root: InputRootId,
    /// Touch slot, for correlating begin/update/end of one contact
    pub touch_id: Option<u32>,
}

impl RawInputEvent {
    /// Build a pointer event
    pub fn pointer(
        event_type: RawEventType,
        position: Point,
        timestamp_ms: u64,
        root: InputRootId,
    ) -> Self {
        Self {
            event_type,
            position,
            timestamp_ms,
            root,
            touch_id: None,
        }
    }

    /// Build a touch event for `slot`
    pub fn touch(
        event_type: RawEventType,
        position: Point,
        timestamp_ms: u64,
        root: InputRootId,
        slot: u32,
    ) -> Self {
        Self {
            event_type,
            position,
            timestamp_ms,
            root,
            touch_id: Some(slot),
        }
    }

    /// Device family of this event
    pub fn device_kind(&self) -> DeviceKind {
        self.event_type.device_kind()
    }
}

/// Convert a libinput microsecond timestamp to the millisecond clock
#[inline]
pub fn usec_to_ms(time_usec: u64) -> u64 {
    time_usec / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind() {
        assert_eq!(RawEventType::TouchCancel.device_kind(), DeviceKind::Touch);
        assert_eq!(RawEventType::Move.device_kind(), DeviceKind::Pointer);
        assert_eq!(
            RawEventType::MiddleButtonUp.device_kind(),
            DeviceKind::Pointer
        );
    }

    #[test]
    fn test_usec_to_ms_truncates() {
        assert_eq!(usec_to_ms(1_999), 1);
        assert_eq!(usec_to_ms(42_000_500), 42_000);
    }
}
