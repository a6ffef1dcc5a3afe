//! Viewport transform: pan/zoom camera and screen ↔ canvas conversions.
//!
//! The on-screen transform composes, in order:
//!
//! 1. translate to the container center,
//! 2. apply the camera pan (`pan_x`, `pan_y`, CSS pixels),
//! 3. apply the camera zoom,
//! 4. draw the fixed-size virtual canvas scaled by the scale-to-fit factor,
//!    with the canvas center at the origin.
//!
//! So a canvas point `p` lands on screen at
//! `container_center + pan + (p - canvas_center) * fit * zoom`, and hit-testing
//! inverts exactly that.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_SENSITIVITY};
use crate::fit::fit_scale;

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Center of the virtual canvas, in canvas units.
pub const CANVAS_CENTER: Point = Point::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);

/// Camera state for pan/zoom over the virtual canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom), always within `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Add `delta` to the zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom in response to a wheel event. Positive `dy` (scrolling down) zooms out.
    pub fn zoom_by_wheel(&mut self, dy: f64) {
        self.zoom_by(-dy * WHEEL_ZOOM_SENSITIVITY);
    }

    /// Set the zoom from a slider position in `[0, 1]`, mapped linearly onto the zoom range.
    pub fn set_zoom_from_slider(&mut self, t: f64) {
        if !t.is_finite() {
            return;
        }
        let t = t.clamp(0.0, 1.0);
        self.zoom = (MIN_ZOOM + t * (MAX_ZOOM - MIN_ZOOM)).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Slider position in `[0, 1]` that corresponds to the current zoom.
    #[must_use]
    pub fn slider_value(&self) -> f64 {
        (self.zoom - MIN_ZOOM) / (MAX_ZOOM - MIN_ZOOM)
    }

    /// Accumulate a pan offset in CSS pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Return to the centered, unzoomed view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A measured container plus the camera looking into it.
///
/// This is the full transform needed to convert between screen and canvas
/// space. It is cheap to build and is derived per interaction rather than
/// cached, so it always reflects the latest container size and camera.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Container width in CSS pixels.
    pub width: f64,
    /// Container height in CSS pixels.
    pub height: f64,
    /// Scale-to-fit factor for this container.
    pub fit: f64,
    pub camera: Camera,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64, camera: Camera) -> Self {
        Self { width, height, fit: fit_scale(width, height), camera }
    }

    /// Canvas units to screen pixels: scale-to-fit × zoom.
    #[must_use]
    pub fn effective_scale(&self) -> f64 {
        self.fit * self.camera.zoom
    }

    /// False until the container has a usable measurement.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.effective_scale() > 0.0
    }

    /// Screen-space center of the container.
    #[must_use]
    pub fn container_center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Convert a canvas-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let pan = Point::new(self.camera.pan_x, self.camera.pan_y);
        self.container_center() + pan + (canvas - CANVAS_CENTER) * self.effective_scale()
    }

    /// Convert a screen-space point to canvas coordinates.
    ///
    /// Returns `None` while the viewport is not ready.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Option<Point> {
        if !self.is_ready() {
            return None;
        }
        let pan = Point::new(self.camera.pan_x, self.camera.pan_y);
        Some(CANVAS_CENTER + (screen - self.container_center() - pan) / self.effective_scale())
    }

    /// Convert a screen-space displacement to a canvas-space displacement.
    ///
    /// Pan does not affect displacements. Returns `None` while not ready.
    #[must_use]
    pub fn screen_delta_to_canvas(&self, delta: Point) -> Option<Point> {
        if !self.is_ready() {
            return None;
        }
        Some(delta / self.effective_scale())
    }

    /// Convert a canvas-space length to screen pixels.
    #[must_use]
    pub fn canvas_dist_to_screen(&self, dist: f64) -> f64 {
        dist * self.effective_scale()
    }
}
