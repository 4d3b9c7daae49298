//! libinput path-context source
//!
//! Opens evdev nodes directly (no seat, no udev) and converts libinput events
//! into [`NativeEvent`] values. The context is not `Send`; it has to be
//! created on the thread that polls it.

use super::{
    discover_devices, InputSource, NativeEvent, NativePointerEvent, NativeTouchEvent, PointerKind,
    TouchPhase,
};
use crate::backend::error::Result;
use crate::input::coordinates::Point;
use ::input::event::pointer::{ButtonState, PointerEvent, PointerEventTrait};
use ::input::event::touch::{TouchEvent, TouchEventPosition, TouchEventSlot, TouchEventTrait};
use ::input::event::Event;
use ::input::{Libinput, LibinputInterface};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Opens device nodes with the access mode libinput asks for
///
/// The process needs read access to the nodes (root or the `input` group).
#[derive(Debug, Default)]
pub struct RestrictedInterface;

impl LibinputInterface for RestrictedInterface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> std::result::Result<OwnedFd, i32> {
        let access = flags & libc::O_ACCMODE;
        OpenOptions::new()
            .custom_flags(flags)
            .read(access == libc::O_RDONLY || access == libc::O_RDWR)
            .write(access == libc::O_WRONLY || access == libc::O_RDWR)
            .open(path)
            .map(OwnedFd::from)
            .map_err(|err| {
                debug!("open {} failed: {}", path.display(), err);
                err.raw_os_error().unwrap_or(libc::EIO)
            })
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        drop(File::from(fd));
    }
}

/// [`InputSource`] backed by a libinput path context
pub struct LibinputSource {
    context: Libinput,
    devices: usize,
}

impl LibinputSource {
    /// Create a context with no devices
    pub fn new() -> Self {
        Self {
            context: Libinput::new_from_path(RestrictedInterface),
            devices: 0,
        }
    }

    /// Create a context and register every node under `dir` starting with `prefix`
    ///
    /// Nodes that cannot be opened are skipped with a warning. An unreadable
    /// directory is an error.
    pub fn open(dir: &Path, prefix: &str) -> Result<Self> {
        let mut source = Self::new();

        for path in discover_devices(dir, prefix)? {
            if !source.add_device(&path) {
                warn!("Skipping input device {}", path.display());
            }
        }

        info!(
            "libinput context ready with {} device(s) from {}",
            source.devices,
            dir.display()
        );
        Ok(source)
    }

    /// Number of devices successfully registered
    pub fn device_count(&self) -> usize {
        self.devices
    }
}

impl Default for LibinputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for LibinputSource {
    fn add_device(&mut self, path: &Path) -> bool {
        let Some(path_str) = path.to_str() else {
            return false;
        };

        match self.context.path_add_device(path_str) {
            Some(device) => {
                debug!("Added input device {} ({})", path.display(), device.name());
                self.devices += 1;
                true
            }
            None => false,
        }
    }

    fn fd(&self) -> BorrowedFd<'_> {
        self.context.as_fd()
    }

    fn dispatch(&mut self) -> io::Result<()> {
        self.context.dispatch()
    }

    fn next_event(&mut self) -> Option<NativeEvent> {
        // The libinput event is dropped (and unref'd) at the end of this call
        self.context.next().map(convert_event)
    }
}

fn convert_event(event: Event) -> NativeEvent {
    match event {
        Event::Touch(touch) => NativeEvent::Touch(convert_touch(&touch)),
        Event::Pointer(pointer) => NativeEvent::Pointer(convert_pointer(&pointer)),
        _ => NativeEvent::Other,
    }
}

fn normalized_touch<E: TouchEventPosition>(event: &E) -> Point {
    Point::new(event.x_transformed(1), event.y_transformed(1))
}

fn convert_touch(event: &TouchEvent) -> NativeTouchEvent {
    match event {
        TouchEvent::Down(e) => NativeTouchEvent {
            phase: TouchPhase::Down,
            slot: e.slot(),
            time_usec: e.time_usec(),
            position: Some(normalized_touch(e)),
        },
        TouchEvent::Motion(e) => NativeTouchEvent {
            phase: TouchPhase::Motion,
            slot: e.slot(),
            time_usec: e.time_usec(),
            position: Some(normalized_touch(e)),
        },
        TouchEvent::Up(e) => NativeTouchEvent {
            phase: TouchPhase::Up,
            slot: e.slot(),
            time_usec: e.time_usec(),
            position: None,
        },
        TouchEvent::Cancel(e) => NativeTouchEvent {
            phase: TouchPhase::Cancel,
            slot: e.slot(),
            time_usec: e.time_usec(),
            position: None,
        },
        TouchEvent::Frame(e) => NativeTouchEvent {
            phase: TouchPhase::Frame,
            slot: None,
            time_usec: e.time_usec(),
            position: None,
        },
        _ => NativeTouchEvent {
            phase: TouchPhase::Frame,
            slot: None,
            time_usec: 0,
            position: None,
        },
    }
}

fn convert_pointer(event: &PointerEvent) -> NativePointerEvent {
    match event {
        PointerEvent::Motion(e) => NativePointerEvent {
            time_usec: e.time_usec(),
            kind: PointerKind::Motion {
                dx: e.dx(),
                dy: e.dy(),
            },
        },
        PointerEvent::MotionAbsolute(e) => NativePointerEvent {
            time_usec: e.time_usec(),
            kind: PointerKind::MotionAbsolute {
                position: Point::new(e.absolute_x_transformed(1), e.absolute_y_transformed(1)),
            },
        },
        PointerEvent::Button(e) => NativePointerEvent {
            time_usec: e.time_usec(),
            kind: PointerKind::Button {
                code: e.button(),
                pressed: e.button_state() == ButtonState::Pressed,
            },
        },
        #[allow(deprecated)]
        PointerEvent::Axis(e) => NativePointerEvent {
            time_usec: e.time_usec(),
            kind: PointerKind::Axis,
        },
        _ => NativePointerEvent {
            time_usec: 0,
            kind: PointerKind::Axis,
        },
    }
}
