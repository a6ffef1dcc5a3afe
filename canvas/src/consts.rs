//! Shared numeric constants for the canvas crate.

// ── Virtual canvas ──────────────────────────────────────────────

/// Width of the fixed virtual canvas in canvas units.
pub const CANVAS_WIDTH: f64 = 4800.0;

/// Height of the fixed virtual canvas in canvas units.
pub const CANVAS_HEIGHT: f64 = 2700.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest zoom factor the viewport accepts.
pub const MIN_ZOOM: f64 = 0.2;

/// Largest zoom factor the viewport accepts.
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom change per wheel pixel. Scrolling down (positive `dy`) zooms out.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.001;

// ── Orbits ──────────────────────────────────────────────────────

/// Radius at which subtasks orbit the minitask when the minitask is the view center.
pub const MINITASK_VIEW_RADIUS: f64 = 350.0;

/// Subtask orbit radius around a minitask shown inside a task view.
pub const TASK_ORBIT_RADIUS: f64 = 350.0;

/// Compressed subtask orbit radius around a minitask shown inside a module view.
pub const MODULE_ORBIT_RADIUS: f64 = 100.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Dash segment length for the selection marquee, in screen pixels.
pub const SELECTION_DASH_PX: f64 = 4.0;

/// Gap between an object's edge and its selection ring, in screen pixels.
pub const SELECTION_RING_GAP_PX: f64 = 4.0;
