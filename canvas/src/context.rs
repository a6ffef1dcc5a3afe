//! View contexts and the coordinate mapper between nested contexts.
//!
//! A view shows one scope of the project: the whole solar system, one module,
//! one task, or one minitask. Subtasks that belong to a minitask are authored
//! in the minitask-centered frame, around the fixed view center at
//! `MINITASK_VIEW_RADIUS`. When the minitask appears as an asteroid inside a
//! module or task view, those subtasks are drawn as satellites around the
//! asteroid at that context's orbit radius. [`OrbitFrame`] converts between
//! the two frames.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::camera::{CANVAS_CENTER, Point};
use crate::consts::{MINITASK_VIEW_RADIUS, MODULE_ORBIT_RADIUS, TASK_ORBIT_RADIUS};
use crate::doc::ObjectId;
use crate::position::PositionScope;

/// The kind of scope positions are saved under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    SolarSystem,
    Module,
    Task,
    Minitask,
}

impl ViewContext {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SolarSystem => "solar_system",
            Self::Module => "module",
            Self::Task => "task",
            Self::Minitask => "minitask",
        }
    }

    /// Parse a wire name. Returns `None` for unknown contexts.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "solar_system" => Some(Self::SolarSystem),
            "module" => Some(Self::Module),
            "task" => Some(Self::Task),
            "minitask" => Some(Self::Minitask),
            _ => None,
        }
    }

    /// Orbit radius for satellites of a minitask shown in this context.
    ///
    /// Only module and task views draw satellites.
    #[must_use]
    pub fn orbit_radius(self) -> Option<f64> {
        match self {
            Self::Module => Some(MODULE_ORBIT_RADIUS),
            Self::Task => Some(TASK_ORBIT_RADIUS),
            Self::SolarSystem | Self::Minitask => None,
        }
    }
}

impl fmt::Display for ViewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scope a view is showing, with the parent ids that make it unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "context", rename_all = "snake_case")]
pub enum ViewScope {
    SolarSystem,
    Module { module_id: ObjectId },
    Task { module_id: ObjectId, task_id: ObjectId },
    Minitask { module_id: ObjectId, task_id: ObjectId, minitask_id: ObjectId },
}

impl ViewScope {
    #[must_use]
    pub fn context(&self) -> ViewContext {
        match self {
            Self::SolarSystem => ViewContext::SolarSystem,
            Self::Module { .. } => ViewContext::Module,
            Self::Task { .. } => ViewContext::Task,
            Self::Minitask { .. } => ViewContext::Minitask,
        }
    }

    /// Save scope for an object shown in this view.
    ///
    /// `satellite_of` is the owning minitask when the object is drawn as a
    /// satellite; module and task scopes carry it as the minitask qualifier.
    /// Other views have no satellites and ignore it.
    #[must_use]
    pub fn position_scope(&self, satellite_of: Option<ObjectId>) -> PositionScope {
        match *self {
            Self::SolarSystem => PositionScope::SolarSystem,
            Self::Module { module_id } => PositionScope::Module { module_id, minitask_id: satellite_of },
            Self::Task { module_id, task_id } => PositionScope::Task { module_id, task_id, minitask_id: satellite_of },
            Self::Minitask { module_id, task_id, minitask_id } => {
                PositionScope::Minitask { module_id, task_id, minitask_id }
            }
        }
    }

    /// Orbit frame for satellites around an asteroid at `asteroid`, if this view draws satellites.
    #[must_use]
    pub fn orbit_frame(&self, asteroid: Point) -> Option<OrbitFrame> {
        self.context()
            .orbit_radius()
            .map(|radius| OrbitFrame::new(asteroid, radius))
    }
}

/// Which project and scope to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewSelector {
    pub project_id: ObjectId,
    pub scope: ViewScope,
}

impl ViewSelector {
    #[must_use]
    pub fn new(project_id: ObjectId, scope: ViewScope) -> Self {
        Self { project_id, scope }
    }
}

/// Mapping between a satellite's local (minitask-centered) position and its
/// absolute position around an asteroid in a module or task view.
///
/// `canvas = asteroid + (local - view_center) * orbit_radius / view_radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitFrame {
    /// Absolute position of the owning asteroid in the target context.
    pub asteroid: Point,
    /// Satellite radius used by the target context.
    pub orbit_radius: f64,
    /// Satellite radius used by the minitask-centered view.
    pub view_radius: f64,
    /// Fixed center of the minitask-centered view.
    pub view_center: Point,
}

impl OrbitFrame {
    /// Frame around `asteroid` with the standard minitask view center and radius.
    #[must_use]
    pub fn new(asteroid: Point, orbit_radius: f64) -> Self {
        Self { asteroid, orbit_radius, view_radius: MINITASK_VIEW_RADIUS, view_center: CANVAS_CENTER }
    }

    /// Override the minitask-centered view's center and radius.
    #[must_use]
    pub fn with_view(mut self, view_center: Point, view_radius: f64) -> Self {
        self.view_center = view_center;
        self.view_radius = view_radius;
        self
    }

    /// Local-to-canvas scale factor. Task views use 1.0, module views compress.
    #[must_use]
    pub fn scale(&self) -> f64 {
        if self.view_radius > 0.0 { self.orbit_radius / self.view_radius } else { 0.0 }
    }

    fn is_invertible(&self) -> bool {
        let s = self.scale();
        s.is_finite() && s > 0.0
    }

    /// Local position to absolute canvas position in the target context.
    #[must_use]
    pub fn to_canvas(&self, local: Point) -> Point {
        self.asteroid + (local - self.view_center) * self.scale()
    }

    /// Absolute canvas position back to the local frame.
    ///
    /// Returns `None` if the frame has a non-positive scale.
    #[must_use]
    pub fn to_local(&self, canvas: Point) -> Option<Point> {
        if !self.is_invertible() {
            return None;
        }
        Some(self.view_center + (canvas - self.asteroid) / self.scale())
    }

    /// A canvas-space displacement expressed in the local frame.
    #[must_use]
    pub fn local_delta(&self, canvas_delta: Point) -> Option<Point> {
        if !self.is_invertible() {
            return None;
        }
        Some(canvas_delta / self.scale())
    }
}
