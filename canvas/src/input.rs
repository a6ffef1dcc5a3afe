//! Input model: modifier keys, mouse buttons, and the gesture state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. Exactly one gesture can be active, so dragging and box
//! selection exclude each other by construction. Each variant records the
//! pointer that owns it; events from any other pointer are ignored.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use crate::camera::Point;
use crate::doc::ObjectId;
use crate::drag::DragSession;
use crate::hit::SelectionBox;

/// Browser pointer id (`PointerEvent.pointerId`).
pub type PointerId = i32;

/// Modifier keys reported with a pointer or key event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Extends or toggles the selection.
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer button; only `Primary` starts a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Scroll delta of a wheel event, in CSS pixels.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive scrolls down, which zooms out.
    pub dy: f64,
}

/// Persistent UI state visible to the renderer and the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Selected object ids.
    pub selection: BTreeSet<ObjectId>,
    /// Object whose drag just ended with movement; its next click is swallowed.
    pub just_dragged: Option<ObjectId>,
    /// Set when a box selection completes; the next background click is swallowed.
    pub suppress_background_click: bool,
}

impl UiState {
    /// Take the one-shot drag suppression if it names `id`.
    pub fn take_just_dragged(&mut self, id: &ObjectId) -> bool {
        if self.just_dragged.as_ref() == Some(id) {
            self.just_dragged = None;
            return true;
        }
        false
    }

    /// Take the one-shot background click suppression.
    pub fn take_background_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_background_click)
    }
}

/// The gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// Plain drag on empty background pans the view.
    Panning {
        pointer_id: PointerId,
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// One object or the whole selection is being moved.
    DraggingObjects(DragSession),
    /// Shift-drag on empty background draws a selection box.
    BoxSelecting { pointer_id: PointerId, rect: SelectionBox },
}

impl InputState {
    /// Pointer that owns the active gesture.
    #[must_use]
    pub fn pointer_id(&self) -> Option<PointerId> {
        match self {
            Self::Idle => None,
            Self::Panning { pointer_id, .. } | Self::BoxSelecting { pointer_id, .. } => Some(*pointer_id),
            Self::DraggingObjects(session) => Some(session.pointer_id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
