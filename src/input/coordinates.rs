//! Screen Geometry and Clamping
//!
//! Screen-space points and sizes, the provider trait the UI layer implements
//! to report its current scaled size, and the clamp applied to the pointer
//! after every relative movement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in scaled screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this point by a relative delta
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Screen size in scaled device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in scaled pixels
    pub width: f64,
    /// Height in scaled pixels
    pub height: f64,
}

impl Size {
    /// Create a new size
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of a screen with this size
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Width as the integer pixel range libinput transforms into
    pub fn width_px(&self) -> u32 {
        self.width.max(0.0) as u32
    }

    /// Height as the integer pixel range libinput transforms into
    pub fn height_px(&self) -> u32 {
        self.height.max(0.0) as u32
    }
}

/// Source of the current screen size
///
/// Queried once per handled event and never cached, so resolution changes
/// take effect on the next device event.
pub trait ScreenInfoProvider: Send + Sync {
    /// Current screen size in scaled device pixels
    fn scaled_size(&self) -> Size;
}

/// Fixed-size screen, mostly useful for headless runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedScreen(pub Size);

impl ScreenInfoProvider for FixedScreen {
    fn scaled_size(&self) -> Size {
        self.0
    }
}

/// How the pointer is kept inside the screen after a relative move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Each axis is clamped into its own `[0, extent]` range.
    #[default]
    PerAxis,

    /// Bit-for-bit compatibility with the framebuffer backend this pipeline
    /// replaces: an X overflow writes the screen *width* into Y and leaves X
    /// unclamped. Kept only for replaying recorded sessions.
    Legacy,
}

/// Clamp a pointer position to the screen
pub fn clamp_to_screen(point: Point, screen: Size, policy: ClampPolicy) -> Point {
    match policy {
        ClampPolicy::PerAxis => Point::new(
            point.x.clamp(0.0, screen.width.max(0.0)),
            point.y.clamp(0.0, screen.height.max(0.0)),
        ),
        ClampPolicy::Legacy => {
            let mut clamped = point;
            if clamped.x < 0.0 {
                clamped.x = 0.0;
            }
            if clamped.y < 0.0 {
                clamped.y = 0.0;
            }
            if clamped.x > screen.width {
                clamped.y = screen.width;
            }
            if clamped.y > screen.height {
                clamped.y = screen.height;
            }
            clamped
        }
    }
}

/// Scale a normalized `[0, 1]` device position to the screen
pub fn scale_to_screen(normalized: Point, screen: Size) -> Point {
    Point::new(
        normalized.x * screen.width_px() as f64,
        normalized.y * screen.height_px() as f64,
    )
}
