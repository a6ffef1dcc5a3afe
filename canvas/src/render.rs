//! Rendering: draws the interaction overlay to a 2D context.
//!
//! The host draws the planning entities themselves; this module only paints
//! what the engine owns: selection rings around selected objects and the
//! rubber band of an active box selection. Everything is drawn in screen
//! space so stroke widths and dash lengths stay constant under zoom.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render_overlay`]) handles the result.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{SELECTION_DASH_PX, SELECTION_RING_GAP_PX};
use crate::engine::EngineCore;
use crate::hit::ScreenRect;
use crate::input::InputState;

const SELECTION_COLOR: &str = "#1E90FF";
const MARQUEE_FILL: &str = "rgba(30, 144, 255, 0.12)";

/// Draw the overlay for the engine's current state.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw_overlay(ctx: &CanvasRenderingContext2d, core: &EngineCore, dpr: f64) -> Result<(), JsValue> {
    let vp = core.viewport();

    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, vp.width, vp.height);
    if !vp.is_ready() {
        return Ok(());
    }

    for bounds in core.screen_bounds(&vp) {
        if core.ui.selection.contains(&bounds.id) {
            draw_selection_ring(ctx, bounds.center.x, bounds.center.y, bounds.radius + SELECTION_RING_GAP_PX)?;
        }
    }

    if let InputState::BoxSelecting { rect, .. } = &core.input {
        draw_marquee(ctx, rect.rect())?;
    }

    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, len: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    if len > 0.0 {
        dash_array.push(&len.into());
        dash_array.push(&len.into());
    }
    ctx.set_line_dash(&dash_array)
}

fn draw_selection_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, TAU)?;
    ctx.stroke();
    ctx.restore();
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, rect: ScreenRect) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx, SELECTION_DASH_PX)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_fill_style_str(MARQUEE_FILL);
    ctx.set_line_width(1.0);
    ctx.fill_rect(rect.min_x, rect.min_y, rect.width(), rect.height());
    ctx.stroke_rect(rect.min_x, rect.min_y, rect.width(), rect.height());
    set_dash(ctx, 0.0)?;
    ctx.restore();
    Ok(())
}
