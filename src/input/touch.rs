//! Touch Slot Tracking
//!
//! libinput only reports a position on down and motion. Release and cancel
//! events need the contact's last known position, so this handler keeps one
//! entry per active slot for the contact's lifetime.

use crate::input::coordinates::{scale_to_screen, Point};
use crate::input::events::{usec_to_ms, RawEventType, RawInputEvent};
use crate::input::translator::{DropReason, Translation, TranslationContext};
use crate::native::{NativeTouchEvent, TouchPhase};
use std::collections::HashMap;
use tracing::trace;

/// Per-slot touch state
#[derive(Debug, Default)]
pub struct TouchHandler {
    /// Last known position of every active contact, keyed by slot
    slots: HashMap<u32, Point>,
}

impl TouchHandler {
    /// Create a handler with no active contacts
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one touch event
    ///
    /// The slot table is updated before the input root is checked, so a
    /// contact that began while no root was set still ends cleanly.
    pub fn handle(&mut self, event: &NativeTouchEvent, ctx: &TranslationContext) -> Translation {
        let event_type = match event.phase {
            TouchPhase::Down => RawEventType::TouchBegin,
            TouchPhase::Motion => RawEventType::TouchUpdate,
            TouchPhase::Up => RawEventType::TouchEnd,
            TouchPhase::Cancel => RawEventType::TouchCancel,
            TouchPhase::Frame => return Translation::Dropped(DropReason::Ignored),
        };

        // Single-touch devices report no slot
        let slot = event.slot.unwrap_or(0);

        let position = match event.phase {
            TouchPhase::Down | TouchPhase::Motion => {
                let normalized = event.position.unwrap_or_default();
                let position = scale_to_screen(normalized, ctx.screen);
                self.slots.insert(slot, position);
                position
            }
            _ => self.slots.remove(&slot).unwrap_or_default(),
        };

        let Some(root) = ctx.root else {
            trace!("Touch {:?} slot {} dropped: no input root", event_type, slot);
            return Translation::Dropped(DropReason::NoInputRoot);
        };

        Translation::Emit(RawInputEvent::touch(
            event_type,
            position,
            usec_to_ms(event.time_usec),
            root,
            slot,
        ))
    }

    /// Last known position of an active contact
    pub fn slot_position(&self, slot: u32) -> Option<Point> {
        self.slots.get(&slot).copied()
    }

    /// Number of contacts currently down
    pub fn active_contacts(&self) -> usize {
        self.slots.len()
    }
}
