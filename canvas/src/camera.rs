#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, ZOOM_MAX, ZOOM_MIN};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// View state for pan/zoom on the diagram canvas.
///
/// `offset_x` / `offset_y` are in world units and shift the scene after
/// scaling. `scale` is a zoom factor clamped to `[ZOOM_MIN, ZOOM_MAX]`.
/// The canvas size is in CSS pixels; zoom is applied around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl ViewState {
    /// Center of the canvas in screen space.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.canvas_width * 0.5, self.canvas_height * 0.5)
    }

    /// Whether the view has a drawable surface to map coordinates onto.
    #[must_use]
    pub fn has_surface(&self) -> bool {
        self.canvas_width.is_finite() && self.canvas_height.is_finite() && self.canvas_width > 0.0 && self.canvas_height > 0.0
    }

    /// Convert a canvas-local screen point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let c = self.center();
        Point {
            x: (screen.x - c.x) / self.scale - self.offset_x + c.x,
            y: (screen.y - c.y) / self.scale - self.offset_y + c.y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Set the scale, clamped to the allowed zoom range. Non-finite input is ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(ZOOM_MIN, ZOOM_MAX);
        }
    }

    /// Multiply the scale by `factor`, clamped.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_scale(self.scale * factor);
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx / self.scale;
        self.offset_y += dy / self.scale;
    }

    /// Back to 100% with no pan.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }

    /// Update the canvas size. Returns `false` (and changes nothing) when the
    /// size is not a usable surface.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.canvas_width = width;
        self.canvas_height = height;
        true
    }

    /// Zoom level as a rounded percentage, for the toolbar label.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }
}
