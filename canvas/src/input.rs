//! Input model: tools, modifier keys, pointer events, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture what the user intends at the time of a
//! pointer event. `InputState` is the gesture in progress between pointer-down
//! and pointer-up; it carries everything needed to compute the final shape
//! geometry on release without accumulating floating-point drift.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, Shape, Style};
use crate::hit::Handle;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pick, move, and edit handles of existing shapes.
    #[default]
    Select,
    Line,
    Arrow,
    Rectangle,
    Circle,
    /// Place a plain text label.
    Text,
    /// Place a boxed label.
    Node,
    /// Remove the topmost shape under the release point.
    Eraser,
}

impl Tool {
    /// Parse a toolbar name such as `"rectangle"`. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "select" => Self::Select,
            "line" => Self::Line,
            "arrow" => Self::Arrow,
            "rectangle" => Self::Rectangle,
            "circle" => Self::Circle,
            "text" => Self::Text,
            "node" => Self::Node,
            "eraser" => Self::Eraser,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Text => "text",
            Self::Node => "node",
            Self::Eraser => "eraser",
        }
    }

    /// Whether this tool draws a shape by dragging from an anchor.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Line | Self::Arrow | Self::Rectangle | Self::Circle)
    }

    /// Whether this tool places a label after prompting for its text.
    #[must_use]
    pub fn is_labeling(self) -> bool {
        matches!(self, Self::Text | Self::Node)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: u8 = 1;
    pub const CTRL: u8 = 1 << 1;
    pub const ALT: u8 = 1 << 2;
    pub const META: u8 = 1 << 3;

    /// Decode the bitmask the host packs from a DOM event.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self {
            shift: bits & Self::SHIFT != 0,
            ctrl: bits & Self::CTRL != 0,
            alt: bits & Self::ALT != 0,
            meta: bits & Self::META != 0,
        }
    }

    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn platform(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button, pen contact, or single-finger touch.
    Primary,
    /// Middle mouse button; always pans.
    Middle,
    /// Right mouse button; ignored by the editor.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Source device of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Map a DOM `PointerEvent.pointerType` string. Unknown types count as mouse.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "touch" => Self::Touch,
            "pen" => Self::Pen,
            _ => Self::Mouse,
        }
    }
}

/// One pointer event in canvas-local screen coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub screen: Point,
    pub button: Button,
    pub modifiers: Modifiers,
    pub kind: PointerKind,
}

impl PointerInput {
    /// A primary-button mouse event with no modifiers.
    #[must_use]
    pub fn primary(x: f64, y: f64) -> Self {
        Self { screen: Point::new(x, y), button: Button::Primary, modifiers: Modifiers::default(), kind: PointerKind::Mouse }
    }
}

/// A keyboard key as reported by the browser (`KeyboardEvent.key`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Vertical scroll amount (positive = away from the user).
    pub dy: f64,
}

/// Editor commands bound to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

/// Resolve a key press to an editor shortcut.
///
/// Platform modifier + `z` undoes; adding shift redoes. Browsers report the
/// shifted key as `"Z"`, so the comparison ignores case.
#[must_use]
pub fn shortcut(key: &Key, modifiers: Modifiers) -> Option<Shortcut> {
    if !modifiers.platform() || !key.0.eq_ignore_ascii_case("z") {
        return None;
    }
    Some(if modifiers.shift { Shortcut::Redo } else { Shortcut::Undo })
}

/// Style applied to newly drawn shapes, mirrored from the toolbar inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyle {
    pub stroke: String,
    pub stroke_width: f64,
    /// Fill for rectangles and circles; `None` draws outline only.
    pub fill: Option<String>,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self { stroke: DEFAULT_STROKE.to_owned(), stroke_width: DEFAULT_STROKE_WIDTH, fill: None }
    }
}

impl DrawStyle {
    #[must_use]
    pub fn stroke_style(&self) -> Style {
        Style { stroke: self.stroke.clone(), stroke_width: self.stroke_width }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    /// Index of the selected shape, if any.
    pub selected: Option<usize>,
    pub style: DrawStyle,
    /// Accept touch-sourced pointer events. Off by default so that palm and
    /// scroll gestures on tablets do not draw.
    pub touch_allowed: bool,
}

/// How a select-tool drag edits its target.
#[derive(Debug, Clone, PartialEq)]
pub enum DragMode {
    /// Dragging one control point; the point follows the snapped cursor.
    Handle(Handle),
    /// Moving the whole shape; geometry is `original` shifted by the
    /// cumulative delta from `origin`.
    Move { origin: Point, original: Shape },
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A drawing tool is dragging out a new shape.
    Drawing {
        /// World-space pointer-down position.
        anchor: Point,
        /// Latest world-space pointer position, for the live preview.
        current: Point,
    },
    /// The select tool is editing an existing shape.
    Dragging { index: usize, mode: DragMode },
    /// The view is being panned.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// The eraser is down; removal happens on release.
    Erasing,
}
