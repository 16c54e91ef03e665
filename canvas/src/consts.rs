//! Shared numeric constants for the canvas crate.
//!
//! All distances are in world units unless the name ends in `_PX`, in which
//! case the value is in screen pixels and must be divided by the view scale
//! before use in world space.

// ── Hit-testing ─────────────────────────────────────────────────

/// Maximum distance at which a select-tool click picks up a shape.
pub const HIT_MAX_DIST: f64 = 20.0;

/// Radius around an endpoint or circle center that grabs the handle instead of the body.
pub const HANDLE_RADIUS: f64 = 10.0;

/// Distance within which a dragged handle snaps to another shape's feature point.
pub const SNAP_TOLERANCE: f64 = 10.0;

/// Distance (inclusive) at which the eraser removes a shape.
pub const ERASER_THRESHOLD: f64 = 15.0;

// ── View ────────────────────────────────────────────────────────

/// Smallest allowed view scale.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed view scale.
pub const ZOOM_MAX: f64 = 10.0;

/// Multiplicative step for the zoom-in / zoom-out buttons.
pub const ZOOM_STEP: f64 = 1.2;

/// Scale factor for one ctrl+wheel notch towards the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Scale factor for one ctrl+wheel notch away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Canvas width used until the host reports a real container size.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Canvas height used until the host reports a real container size.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

// ── Rendering ───────────────────────────────────────────────────

/// Spacing between background grid lines.
pub const GRID_SPACING: f64 = 20.0;

/// Grid line width in screen pixels.
pub const GRID_LINE_WIDTH_PX: f64 = 0.5;

/// Half the side length of a selection handle square, in screen pixels.
pub const HANDLE_HALF_SIZE_PX: f64 = 4.0;

/// Label font size in screen pixels.
pub const LABEL_FONT_PX: f64 = 14.0;

/// Arrowhead barb length in world units.
pub const ARROW_HEAD_LEN: f64 = 10.0;

/// Arrowhead half-angle in radians (30°).
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

// ── Code generation ─────────────────────────────────────────────

/// World units per TikZ unit in generated code.
pub const UNIT_FACTOR: f64 = 10.0;
