//! Drag sessions: one pointer moving one object or a rigid group.
//!
//! A session snapshots every member's start position in its authoring frame
//! at pointer-down. Each move recomputes positions from those snapshots and
//! the total pointer displacement, so rounding never accumulates and a zoom
//! change mid-drag takes effect on the next move.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::camera::Point;
use crate::doc::ObjectId;
use crate::input::PointerId;

/// How a canvas-space displacement applies to a member's authoring frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragFrame {
    /// Authored directly in canvas space.
    Canvas,
    /// Satellite authored in its owner's local frame; canvas = local × `scale`.
    Orbit { scale: f64 },
    /// Satellite whose owner is also being dragged. Its local position does
    /// not change; it follows the owner.
    FollowsOwner,
}

impl DragFrame {
    fn local_delta(self, canvas_delta: Point) -> Point {
        match self {
            Self::Canvas => canvas_delta,
            Self::Orbit { scale } if scale > 0.0 => canvas_delta / scale,
            Self::Orbit { .. } | Self::FollowsOwner => Point::default(),
        }
    }
}

/// One object taking part in a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMember {
    pub id: ObjectId,
    /// Position at pointer-down, in the member's authoring frame.
    pub start: Point,
    pub frame: DragFrame,
}

/// An in-progress drag owned by a single pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The pressed object.
    pub object_id: ObjectId,
    pub pointer_id: PointerId,
    /// Screen position of the pointer at pointer-down.
    pub start_pointer: Point,
    /// The pressed object first, then the rest of the group.
    pub members: Vec<DragMember>,
    pub has_moved: bool,
}

impl DragSession {
    /// Start a session. `members` must lead with the pressed object.
    #[must_use]
    pub fn new(pointer_id: PointerId, start_pointer: Point, members: Vec<DragMember>) -> Option<Self> {
        let object_id = members.first()?.id;
        Some(Self { object_id, pointer_id, start_pointer, members, has_moved: false })
    }

    /// Start position of the pressed object.
    #[must_use]
    pub fn start_pos(&self) -> Point {
        self.members.first().map(|m| m.start).unwrap_or_default()
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.members.len() > 1
    }

    /// Authoring-frame positions of every member after a total canvas-space
    /// displacement of `canvas_delta` since pointer-down.
    #[must_use]
    pub fn positions_for(&self, canvas_delta: Point) -> Vec<(ObjectId, Point)> {
        self.members
            .iter()
            .map(|m| (m.id, m.start + m.frame.local_delta(canvas_delta)))
            .collect()
    }
}
