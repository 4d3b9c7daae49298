//! Native Input Layer
//!
//! Everything that touches libinput lives under this module. The rest of the
//! crate sees only the [`InputSource`] trait and the plain value types below:
//! native event objects are converted into [`NativeEvent`] and released
//! before they leave the source.
//!
//! Positions are captured in normalized `[0, 1]` device space (libinput's
//! transform with a unit extent). The trackers scale them to whatever the
//! screen size is at handling time.

pub mod discovery;
pub mod libinput;

pub use discovery::discover_devices;
pub use libinput::LibinputSource;

use crate::input::coordinates::Point;
use std::io;
use std::os::fd::BorrowedFd;
use std::path::Path;

/// Phase of a touch contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// Contact went down
    Down,
    /// Contact lifted
    Up,
    /// Contact moved
    Motion,
    /// Contact cancelled by the device
    Cancel,
    /// End of a set of simultaneous contact updates
    Frame,
}

/// Touch event as read from the device
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTouchEvent {
    /// Contact phase
    pub phase: TouchPhase,
    /// Multi-touch slot, `None` on single-touch devices
    pub slot: Option<u32>,
    /// Device timestamp in microseconds
    pub time_usec: u64,
    /// Normalized position, present for down and motion only
    pub position: Option<Point>,
}

/// Pointer event payload
#[derive(Debug, Clone, PartialEq)]
pub enum PointerKind {
    /// Relative motion in device-accelerated units
    Motion {
        /// Horizontal delta
        dx: f64,
        /// Vertical delta
        dy: f64,
    },
    /// Absolute motion (tablets, touchscreens in pointer emulation, VMs)
    MotionAbsolute {
        /// Normalized position
        position: Point,
    },
    /// Button state change
    Button {
        /// evdev button code (`BTN_*`)
        code: u32,
        /// `true` on press
        pressed: bool,
    },
    /// Scroll axis event
    Axis,
}

/// Pointer event as read from the device
#[derive(Debug, Clone, PartialEq)]
pub struct NativePointerEvent {
    /// Device timestamp in microseconds
    pub time_usec: u64,
    /// Payload
    pub kind: PointerKind,
}

/// Safe copy of one libinput event
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// Touchscreen event
    Touch(NativeTouchEvent),
    /// Pointer event
    Pointer(NativePointerEvent),
    /// Any other libinput category (device added, keyboard, gesture, ...)
    Other,
}

/// Pollable source of native input events
///
/// Mirrors the path-context libinput workflow: add devices by node, wait on
/// one fd, dispatch, then pull events until none remain.
pub trait InputSource {
    /// Register a device node; returns `false` if it could not be opened
    fn add_device(&mut self, path: &Path) -> bool;

    /// Descriptor that becomes readable when events are pending
    fn fd(&self) -> BorrowedFd<'_>;

    /// Read pending kernel events into the internal queue
    fn dispatch(&mut self) -> io::Result<()>;

    /// Take the next queued event
    fn next_event(&mut self) -> Option<NativeEvent>;
}
