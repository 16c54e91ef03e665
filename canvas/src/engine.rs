//! Editor session and the canvas-bound engine.
//!
//! [`EditorSession`] owns every piece of editor state (shapes, view, tool,
//! gesture, history) and turns input events into state changes plus a list
//! of [`Action`]s for the host. It never touches the DOM, so it is tested
//! directly. [`Engine`] wraps a session together with the browser canvas it
//! draws on.

use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Point, ViewState};
use crate::consts::{
    ERASER_THRESHOLD, HANDLE_RADIUS, HIT_MAX_DIST, SNAP_TOLERANCE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_STEP,
};
use crate::dialect::{self, DialectError};
use crate::doc::{Circle, Label, Rect, Segment, Shape, ShapeStore};
use crate::hit;
use crate::history::History;
use crate::input::{
    Button, DragMode, DrawStyle, InputState, Key, Modifiers, PointerInput, PointerKind, Shortcut, Tool, UiState,
    WheelDelta, shortcut,
};
use crate::render;
use crate::templates::Template;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Action {
    /// The scene changed and should be redrawn.
    RenderNeeded,
    /// A snapshot was pushed or the cursor moved.
    #[serde(rename_all = "camelCase")]
    HistoryChanged { can_undo: bool, can_redo: bool },
    SelectionChanged(Option<usize>),
    /// The zoom level changed; `percent` is for the toolbar label.
    ZoomChanged { percent: u32 },
    ShapeAdded(usize),
    ShapeRemoved(usize),
}

/// Synchronous text entry used by the text and node tools.
///
/// Returning `None` means the user cancelled.
pub trait TextPrompt {
    fn ask(&mut self, message: &str) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn ask(&mut self, message: &str) -> Option<String> {
        self(message)
    }
}

/// One diagram editing session.
///
/// Separated from [`Engine`] so it can be tested without a browser.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pub shapes: ShapeStore,
    pub view: ViewState,
    pub ui: UiState,
    pub input: InputState,
    pub history: History,
}

impl EditorSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Settings ---

    /// Switch tools. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        self.input = InputState::Idle;
        vec![Action::RenderNeeded]
    }

    pub fn set_style(&mut self, style: DrawStyle) {
        self.ui.style = style;
    }

    pub fn set_touch_allowed(&mut self, allowed: bool) {
        self.ui.touch_allowed = allowed;
    }

    /// Update the canvas size from the host container. Invalid sizes are ignored.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        if self.view.resize(width, height) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, event: PointerInput, prompt: &mut dyn TextPrompt) -> Vec<Action> {
        if !self.accepts(event) || event.button == Button::Secondary {
            return Vec::new();
        }

        if event.button == Button::Middle || event.modifiers.shift {
            self.input = InputState::Panning { last_screen: event.screen };
            return Vec::new();
        }

        let world = self.view.screen_to_world(event.screen);
        let tool = self.ui.tool;
        if tool.is_drawing() {
            self.input = InputState::Drawing { anchor: world, current: world };
            return Vec::new();
        }
        if tool.is_labeling() {
            return self.place_label(world, prompt);
        }
        if tool == Tool::Eraser {
            self.input = InputState::Erasing;
            return Vec::new();
        }
        self.begin_select(world)
    }

    pub fn on_pointer_move(&mut self, event: PointerInput) -> Vec<Action> {
        if !self.accepts(event) {
            return Vec::new();
        }

        let world = self.view.screen_to_world(event.screen);
        match &mut self.input {
            InputState::Panning { last_screen } => {
                let (dx, dy) = (event.screen.x - last_screen.x, event.screen.y - last_screen.y);
                *last_screen = event.screen;
                self.view.pan_by_screen(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { current, .. } => {
                *current = world;
                vec![Action::RenderNeeded]
            }
            InputState::Dragging { index, mode } => {
                let index = *index;
                let updated = match mode {
                    DragMode::Move { origin, original } => Some(original.translated(world.x - origin.x, world.y - origin.y)),
                    DragMode::Handle(handle) => {
                        let snapped = hit::snap(self.shapes.as_slice(), world, Some(index), SNAP_TOLERANCE);
                        self.shapes.get(index).cloned().map(|mut shape| {
                            hit::move_handle(&mut shape, *handle, snapped);
                            shape
                        })
                    }
                };
                match (updated, self.shapes.get_mut(index)) {
                    (Some(shape), Some(slot)) => {
                        *slot = shape;
                        vec![Action::RenderNeeded]
                    }
                    _ => {
                        self.input = InputState::Idle;
                        Vec::new()
                    }
                }
            }
            InputState::Idle | InputState::Erasing => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, event: PointerInput) -> Vec<Action> {
        if !self.accepts(event) {
            return Vec::new();
        }

        let world = self.view.screen_to_world(event.screen);
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            InputState::Dragging { index, .. } => {
                tracing::debug!(index, "drag committed");
                self.commit()
            }
            InputState::Drawing { anchor, .. } => {
                let Some(shape) = build_shape(self.ui.tool, anchor, world, &self.ui.style) else {
                    return Vec::new();
                };
                let index = self.shapes.push(shape);
                tracing::debug!(index, tool = self.ui.tool.as_str(), "shape drawn");
                let mut actions = vec![Action::ShapeAdded(index)];
                actions.extend(self.commit());
                actions
            }
            InputState::Erasing => self.erase_at(world),
        }
    }

    /// Pointer capture was lost. Handled exactly like a release.
    pub fn on_pointer_cancel(&mut self, event: PointerInput) -> Vec<Action> {
        self.on_pointer_up(event)
    }

    pub fn on_wheel(&mut self, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if !modifiers.platform() {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
        self.zoom_by(factor)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match shortcut(key, modifiers) {
            Some(Shortcut::Undo) => self.undo(),
            Some(Shortcut::Redo) => self.redo(),
            None => Vec::new(),
        }
    }

    // --- Commands ---

    pub fn undo(&mut self) -> Vec<Action> {
        match self.history.undo() {
            Some(snapshot) => self.restore(snapshot),
            None => Vec::new(),
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        match self.history.redo() {
            Some(snapshot) => self.restore(snapshot),
            None => Vec::new(),
        }
    }

    /// Remove every shape and record the empty state.
    pub fn clear(&mut self) -> Vec<Action> {
        self.shapes.clear();
        self.input = InputState::Idle;
        let mut actions = self.select(None);
        actions.extend(self.commit());
        actions
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_by(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_by(1.0 / ZOOM_STEP)
    }

    /// Back to 100% and no pan.
    pub fn zoom_reset(&mut self) -> Vec<Action> {
        self.view.reset();
        vec![Action::ZoomChanged { percent: self.view.zoom_percent() }, Action::RenderNeeded]
    }

    /// Append a preset laid out for the current canvas size.
    pub fn insert_template(&mut self, template: Template) -> Vec<Action> {
        let mut actions = Vec::new();
        for shape in template.shapes(self.view.canvas_width, self.view.canvas_height) {
            actions.push(Action::ShapeAdded(self.shapes.push(shape)));
        }
        tracing::debug!(template = template.as_str(), "template inserted");
        actions.extend(self.commit());
        actions
    }

    /// TikZ source for the current model.
    #[must_use]
    pub fn generate_code(&self) -> String {
        dialect::generate(self.shapes.as_slice())
    }

    /// Replace the model with shapes parsed from TikZ source.
    ///
    /// # Errors
    ///
    /// Returns the parse error; the model is left unchanged.
    pub fn import_code(&mut self, source: &str) -> Result<Vec<Action>, DialectError> {
        let shapes = dialect::parse(source)?;
        Ok(self.load(shapes))
    }

    /// Replace the model with a JSON shape array.
    ///
    /// # Errors
    ///
    /// Returns the JSON error; the model is left unchanged.
    pub fn import_json(&mut self, json: &str) -> Result<Vec<Action>, serde_json::Error> {
        let store = ShapeStore::from_json(json)?;
        Ok(self.load(store.snapshot()))
    }

    /// Serialize the model as a JSON shape array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.shapes.to_json()
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.ui.selected
    }

    /// The shape a drawing gesture would produce if released now.
    #[must_use]
    pub fn preview_shape(&self) -> Option<Shape> {
        match self.input {
            InputState::Drawing { anchor, current } => build_shape(self.ui.tool, anchor, current, &self.ui.style),
            _ => None,
        }
    }

    // --- Internals ---

    fn accepts(&self, event: PointerInput) -> bool {
        (event.kind != PointerKind::Touch || self.ui.touch_allowed) && self.view.has_surface()
    }

    fn begin_select(&mut self, world: Point) -> Vec<Action> {
        let Some(index) = hit::hit_test(self.shapes.as_slice(), world, HIT_MAX_DIST) else {
            self.input = InputState::Idle;
            let mut actions = self.select(None);
            actions.push(Action::RenderNeeded);
            return actions;
        };
        let Some(shape) = self.shapes.get(index) else {
            return Vec::new();
        };
        let mode = match hit::handle_at(shape, world, HANDLE_RADIUS) {
            Some(handle) => DragMode::Handle(handle),
            None => DragMode::Move { origin: world, original: shape.clone() },
        };
        self.input = InputState::Dragging { index, mode };
        let mut actions = self.select(Some(index));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn place_label(&mut self, world: Point, prompt: &mut dyn TextPrompt) -> Vec<Action> {
        let message = if self.ui.tool == Tool::Node { "Enter node text:" } else { "Enter text:" };
        let Some(text) = prompt.ask(message).filter(|t| !t.trim().is_empty()) else {
            return Vec::new();
        };
        let label = Label { at: world, text, style: self.ui.style.stroke_style() };
        let shape = if self.ui.tool == Tool::Node { Shape::Node(label) } else { Shape::Text(label) };
        let mut actions = vec![Action::ShapeAdded(self.shapes.push(shape))];
        actions.extend(self.commit());
        actions
    }

    fn erase_at(&mut self, world: Point) -> Vec<Action> {
        let Some(index) = hit::hit_test_topmost(self.shapes.as_slice(), world, ERASER_THRESHOLD) else {
            return Vec::new();
        };
        if self.shapes.remove(index).is_none() {
            return Vec::new();
        }
        tracing::debug!(index, "shape erased");
        let mut actions = vec![Action::ShapeRemoved(index)];
        match self.ui.selected {
            Some(sel) if sel == index => actions.extend(self.select(None)),
            Some(sel) if sel > index => actions.extend(self.select(Some(sel - 1))),
            _ => {}
        }
        actions.extend(self.commit());
        actions
    }

    fn zoom_by(&mut self, factor: f64) -> Vec<Action> {
        self.view.zoom_by(factor);
        vec![Action::ZoomChanged { percent: self.view.zoom_percent() }, Action::RenderNeeded]
    }

    fn select(&mut self, index: Option<usize>) -> Vec<Action> {
        if self.ui.selected == index {
            return Vec::new();
        }
        self.ui.selected = index;
        vec![Action::SelectionChanged(index)]
    }

    fn commit(&mut self) -> Vec<Action> {
        self.history.commit(self.shapes.as_slice());
        vec![self.history_action(), Action::RenderNeeded]
    }

    fn load(&mut self, shapes: Vec<Shape>) -> Vec<Action> {
        self.shapes.replace(shapes);
        self.input = InputState::Idle;
        let mut actions = self.select(None);
        actions.extend(self.commit());
        actions
    }

    fn restore(&mut self, snapshot: Vec<Shape>) -> Vec<Action> {
        self.shapes.replace(snapshot);
        self.input = InputState::Idle;
        let mut actions = Vec::new();
        if self.ui.selected.is_some_and(|i| i >= self.shapes.len()) {
            actions.extend(self.select(None));
        }
        actions.push(self.history_action());
        actions.push(Action::RenderNeeded);
        actions
    }

    fn history_action(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }
}

/// Materialize the shape a drawing tool produces between two world points.
#[must_use]
pub fn build_shape(tool: Tool, start: Point, end: Point, style: &DrawStyle) -> Option<Shape> {
    let stroke = style.stroke_style();
    let shape = match tool {
        Tool::Line => Shape::Line(Segment { start, end, style: stroke }),
        Tool::Arrow => Shape::Arrow(Segment { start, end, style: stroke }),
        Tool::Rectangle => Shape::Rectangle(Rect {
            x: start.x,
            y: start.y,
            width: end.x - start.x,
            height: end.y - start.y,
            style: stroke,
            fill: style.fill.clone(),
        }),
        Tool::Circle => {
            Shape::Circle(Circle { center: start, radius: start.distance(end), style: stroke, fill: style.fill.clone() })
        }
        Tool::Select | Tool::Text | Tool::Node | Tool::Eraser => return None,
    };
    Some(shape)
}

/// The full canvas engine. Wraps an [`EditorSession`] and owns the browser canvas.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    pub session: EditorSession,
}

impl Engine {
    /// Bind a new engine to `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        Ok(Self { canvas, ctx, dpr, session: EditorSession::new() })
    }

    /// Fit the canvas backing store to its parent container. Does nothing when
    /// the canvas is detached or the container has no size.
    pub fn resize_to_container(&mut self) -> Vec<Action> {
        let Some(parent) = self.canvas.parent_element() else {
            return Vec::new();
        };
        let rect = parent.get_bounding_client_rect();
        let actions = self.session.resize(rect.width(), rect.height());
        if actions.is_empty() {
            return actions;
        }
        self.dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let (w, h) = (self.session.view.canvas_width, self.session.view.canvas_height);
        self.canvas.set_width(backing_size(w, self.dpr));
        self.canvas.set_height(backing_size(h, self.dpr));
        let style = self.canvas.style();
        for (name, value) in [("width", format!("{w}px")), ("height", format!("{h}px"))] {
            if let Err(err) = style.set_property(name, &value) {
                tracing::warn!(?err, name, "failed to size canvas");
            }
        }
        actions
    }

    /// Draw the current state to the canvas.
    pub fn render(&self) {
        if let Err(err) = render::draw(&self.ctx, &self.session, self.dpr) {
            tracing::warn!(?err, "canvas render failed");
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn backing_size(css: f64, dpr: f64) -> u32 {
    (css * dpr).round().max(1.0) as u32
}
