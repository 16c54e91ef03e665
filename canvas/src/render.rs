//! Rendering: draws the diagram scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the session and produces pixels; it never mutates editor state.
//! Layout math that does not need a context (grid lines, handle squares) is
//! split into plain functions so it can be tested off-browser.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Point, ViewState};
use crate::consts::{
    ARROW_HEAD_ANGLE, ARROW_HEAD_LEN, GRID_LINE_WIDTH_PX, GRID_SPACING, HANDLE_HALF_SIZE_PX, LABEL_FONT_PX,
};
use crate::doc::{Shape, Style};
use crate::engine::EditorSession;
use crate::hit;

const BACKGROUND: &str = "white";
const GRID_COLOR: &str = "#f0f0f0";
const HANDLE_COLOR: &str = "#0e639c";

/// Draw the full scene: background, grid, shapes, selection handles, and
/// the live preview of a drawing gesture.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, session: &EditorSession, dpr: f64) -> Result<(), JsValue> {
    let view = &session.view;
    if !view.has_surface() {
        return Ok(());
    }
    let scale = view.scale;

    // Layer 1: background in screen space.
    ctx.save();
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, view.canvas_width, view.canvas_height);

    // World transform: translate(center) -> scale -> translate(-center + offset).
    apply_view_transform(ctx, view)?;

    // Layer 2: grid.
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(view.screen_dist_to_world(GRID_LINE_WIDTH_PX));
    for (a, b) in grid_lines(view.canvas_width, view.canvas_height) {
        ctx.begin_path();
        ctx.move_to(a.x, a.y);
        ctx.line_to(b.x, b.y);
        ctx.stroke();
    }

    // Layer 3: shapes in insertion order.
    for shape in session.shapes.iter() {
        draw_shape(ctx, shape, scale)?;
    }

    // Layer 4: selection handles.
    if let Some(shape) = session.ui.selected.and_then(|i| session.shapes.get(i)) {
        ctx.set_fill_style_str(HANDLE_COLOR);
        for (x, y, size) in handle_rects(shape, scale) {
            ctx.fill_rect(x, y, size, size);
        }
    }

    // Layer 5: in-progress drawing.
    if let Some(preview) = session.preview_shape() {
        draw_shape(ctx, &preview, scale)?;
    }

    ctx.restore();
    Ok(())
}

fn apply_view_transform(ctx: &CanvasRenderingContext2d, view: &ViewState) -> Result<(), JsValue> {
    let c = view.center();
    ctx.translate(c.x, c.y)?;
    ctx.scale(view.scale, view.scale)?;
    ctx.translate(-c.x + view.offset_x, -c.y + view.offset_y)?;
    Ok(())
}

// =============================================================
// Shape renderers
// =============================================================

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape, scale: f64) -> Result<(), JsValue> {
    ctx.save();
    apply_stroke_style(ctx, shape.style(), scale);
    match shape {
        Shape::Line(s) => {
            ctx.begin_path();
            ctx.move_to(s.start.x, s.start.y);
            ctx.line_to(s.end.x, s.end.y);
            ctx.stroke();
        }
        Shape::Arrow(s) => draw_arrow(ctx, s.start, s.end),
        Shape::Rectangle(r) => {
            if let Some(fill) = &r.fill {
                ctx.set_fill_style_str(fill);
                ctx.fill_rect(r.x, r.y, r.width, r.height);
            }
            ctx.stroke_rect(r.x, r.y, r.width, r.height);
        }
        Shape::Circle(c) => {
            ctx.begin_path();
            ctx.arc(c.center.x, c.center.y, c.radius.abs(), 0.0, 2.0 * PI)?;
            if let Some(fill) = &c.fill {
                ctx.set_fill_style_str(fill);
                ctx.fill();
            }
            ctx.stroke();
        }
        Shape::Text(l) | Shape::Node(l) => {
            ctx.set_fill_style_str(&l.style.stroke);
            ctx.set_font(&label_font(scale));
            ctx.fill_text(&l.text, l.at.x, l.at.y)?;
        }
    }
    ctx.restore();
    Ok(())
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, from: Point, to: Point) {
    ctx.begin_path();
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke();

    let [left, right] = arrow_barbs(from, to);
    ctx.begin_path();
    ctx.move_to(to.x, to.y);
    ctx.line_to(left.x, left.y);
    ctx.move_to(to.x, to.y);
    ctx.line_to(right.x, right.y);
    ctx.stroke();
}

/// Stroke widths are stored in screen pixels; divide by scale so they stay
/// constant on screen under zoom.
fn apply_stroke_style(ctx: &CanvasRenderingContext2d, style: &Style, scale: f64) {
    ctx.set_stroke_style_str(&style.stroke);
    ctx.set_line_width(style.stroke_width / scale);
}

// =============================================================
// Layout helpers
// =============================================================

/// World-space grid segments, covering three canvas widths/heights around the
/// origin so the grid stays visible while panning.
#[must_use]
pub fn grid_lines(width: f64, height: f64) -> Vec<(Point, Point)> {
    let mut lines = Vec::new();
    let mut i = 0.0;
    while i < width * 2.0 {
        lines.push((Point::new(i - width, -height), Point::new(i - width, height * 2.0)));
        i += GRID_SPACING;
    }
    let mut j = 0.0;
    while j < height * 2.0 {
        lines.push((Point::new(-width, j - height), Point::new(width * 2.0, j - height)));
        j += GRID_SPACING;
    }
    lines
}

/// Handle squares `(x, y, size)` in world space for a selected shape.
#[must_use]
pub fn handle_rects(shape: &Shape, scale: f64) -> Vec<(f64, f64, f64)> {
    let half = HANDLE_HALF_SIZE_PX / scale;
    hit::handle_points(shape).into_iter().map(|p| (p.x - half, p.y - half, half * 2.0)).collect()
}

/// The two barb endpoints of an arrowhead at `to`.
#[must_use]
pub fn arrow_barbs(from: Point, to: Point) -> [Point; 2] {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let barb = |a: f64| Point::new(to.x - ARROW_HEAD_LEN * a.cos(), to.y - ARROW_HEAD_LEN * a.sin());
    [barb(angle - ARROW_HEAD_ANGLE), barb(angle + ARROW_HEAD_ANGLE)]
}

/// CSS font for labels at the given view scale.
#[must_use]
pub fn label_font(scale: f64) -> String {
    format!("{}px Arial", LABEL_FONT_PX / scale)
}
