//! Screen-space hit testing: point picks and box selection.
//!
//! Everything here works on screen rectangles derived by the engine from
//! object positions and the current viewport, so the functions are pure and
//! need no knowledge of view contexts or edit state.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::BTreeSet;

use crate::camera::Point;
use crate::doc::ObjectId;

/// An axis-aligned screen rectangle with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ScreenRect {
    /// Normalize two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { min_x: a.x.min(b.x), min_y: a.y.min(b.y), max_x: a.x.max(b.x), max_y: a.y.max(b.y) }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Strict overlap: rectangles that only touch on an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &ScreenRect) -> bool {
        other.min_x < self.max_x && other.max_x > self.min_x && other.min_y < self.max_y && other.max_y > self.min_y
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// The rubber band of an active box selection, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub start: Point,
    pub end: Point,
}

impl SelectionBox {
    #[must_use]
    pub fn at(p: Point) -> Self {
        Self { start: p, end: p }
    }

    #[must_use]
    pub fn rect(&self) -> ScreenRect {
        ScreenRect::from_corners(self.start, self.end)
    }
}

/// A circular object as it currently appears on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub id: ObjectId,
    pub center: Point,
    /// Radius in screen pixels.
    pub radius: f64,
}

impl ScreenBounds {
    /// Bounding box: `center ± radius`.
    #[must_use]
    pub fn rect(&self) -> ScreenRect {
        ScreenRect {
            min_x: self.center.x - self.radius,
            min_y: self.center.y - self.radius,
            max_x: self.center.x + self.radius,
            max_y: self.center.y + self.radius,
        }
    }

    fn contains(&self, p: Point) -> bool {
        let d = p - self.center;
        d.x * d.x + d.y * d.y <= self.radius * self.radius
    }
}

/// Ids whose bounding boxes overlap `rect`, never including `anchor`.
#[must_use]
pub fn box_select(rect: &ScreenRect, bounds: &[ScreenBounds], anchor: Option<ObjectId>) -> BTreeSet<ObjectId> {
    bounds
        .iter()
        .filter(|b| Some(b.id) != anchor)
        .filter(|b| rect.overlaps(&b.rect()))
        .map(|b| b.id)
        .collect()
}

/// Topmost object under `screen`. `bounds` is in draw order (last is topmost).
#[must_use]
pub fn hit_test_point(screen: Point, bounds: &[ScreenBounds]) -> Option<ObjectId> {
    bounds.iter().rev().find(|b| b.contains(screen)).map(|b| b.id)
}
