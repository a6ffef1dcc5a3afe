//! Scale-to-fit: how far the fixed virtual canvas shrinks to fit its container.
//!
//! The virtual canvas never distorts. One uniform factor is chosen so the whole
//! canvas is visible, which means at least one axis fills the container exactly.
//! A container that has not been measured yet (zero size) yields `0.0`, and the
//! engine treats that as "not ready to interact".

#[cfg(test)]
#[path = "fit_test.rs"]
mod fit_test;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Uniform scale that fits a `canvas_w × canvas_h` canvas inside a
/// `container_w × container_h` container.
///
/// Returns `0.0` when any dimension is zero, negative, or not finite.
#[must_use]
pub fn fit_scale_for(container_w: f64, container_h: f64, canvas_w: f64, canvas_h: f64) -> f64 {
    let dims = [container_w, container_h, canvas_w, canvas_h];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return 0.0;
    }
    (container_w / canvas_w).min(container_h / canvas_h)
}

/// Scale that fits the standard virtual canvas into a container of the given CSS size.
#[must_use]
pub fn fit_scale(container_w: f64, container_h: f64) -> f64 {
    fit_scale_for(container_w, container_h, CANVAS_WIDTH, CANVAS_HEIGHT)
}
