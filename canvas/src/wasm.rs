//! `wasm-bindgen` exports for the diagram editor.
//!
//! Wraps [`Engine`] with JS-friendly signatures. The host page forwards DOM
//! events with canvas-local coordinates and a packed modifier bitmask (see
//! [`Modifiers::from_bits`]). Every event method returns the resulting
//! [`Action`] list as a JSON string so the page can update its toolbar.

use std::sync::Once;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::camera::Point;
use crate::engine::{Action, Engine};
use crate::input::{Button, DrawStyle, Key, Modifiers, PointerInput, PointerKind, Tool, WheelDelta};
use crate::templates::Template;

/// Route panics and `tracing` events to the browser console. `tracing`
/// forwards to `log` when no subscriber is set; `console_log` is that
/// logger. Safe to call more than once.
pub fn install_browser_hooks() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Debug) {
            web_sys::console::warn_1(&JsValue::from_str(&format!("console logger not installed: {err}")));
        }
    });
}

/// Blocking text entry through `window.prompt`. A missing window or a
/// cancelled dialog both count as cancel.
fn browser_prompt(message: &str) -> Option<String> {
    let window = web_sys::window()?;
    match window.prompt_with_message(message) {
        Ok(answer) => answer,
        Err(err) => {
            tracing::warn!(?err, "prompt failed");
            None
        }
    }
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_browser_hooks();
}

/// Diagram editor bound to one `<canvas>` element.
#[wasm_bindgen]
pub struct DiagramEditor {
    engine: Engine,
}

#[wasm_bindgen]
impl DiagramEditor {
    /// Attach to `canvas` and size it to its container.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<DiagramEditor, JsValue> {
        install_browser_hooks();
        let mut engine = Engine::new(canvas)?;
        engine.resize_to_container();
        engine.render();
        Ok(Self { engine })
    }

    /// Re-fit the canvas after the container changed size.
    pub fn resize(&mut self) -> String {
        let actions = self.engine.resize_to_container();
        self.finish(&actions)
    }

    pub fn render(&self) {
        self.engine.render();
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, pointer_type: &str, modifiers: u8) -> String {
        let event = pointer(x, y, button, pointer_type, modifiers);
        let mut prompt = browser_prompt;
        let actions = self.engine.session.on_pointer_down(event, &mut prompt);
        self.finish(&actions)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, button: i16, pointer_type: &str, modifiers: u8) -> String {
        let actions = self.engine.session.on_pointer_move(pointer(x, y, button, pointer_type, modifiers));
        self.finish(&actions)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16, pointer_type: &str, modifiers: u8) -> String {
        let actions = self.engine.session.on_pointer_up(pointer(x, y, button, pointer_type, modifiers));
        self.finish(&actions)
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self, x: f64, y: f64, button: i16, pointer_type: &str, modifiers: u8) -> String {
        let actions = self.engine.session.on_pointer_cancel(pointer(x, y, button, pointer_type, modifiers));
        self.finish(&actions)
    }

    /// Wheel zoom. Only acts with ctrl/meta held; the host should call
    /// `preventDefault` when the returned list is non-empty.
    pub fn wheel(&mut self, dx: f64, dy: f64, modifiers: u8) -> String {
        let actions = self.engine.session.on_wheel(WheelDelta { dx, dy }, Modifiers::from_bits(modifiers));
        self.finish(&actions)
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: String, modifiers: u8) -> String {
        let actions = self.engine.session.on_key_down(&Key(key), Modifiers::from_bits(modifiers));
        self.finish(&actions)
    }

    /// Switch tools by toolbar name. Returns `false` for an unknown name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> bool {
        let Some(tool) = Tool::from_name(name) else {
            tracing::warn!(name, "unknown tool");
            return false;
        };
        let actions = self.engine.session.set_tool(tool);
        self.finish(&actions);
        true
    }

    /// Toolbar style inputs. An empty `fill` means outline only.
    #[wasm_bindgen(js_name = setStyle)]
    pub fn set_style(&mut self, stroke: String, stroke_width: f64, fill: String) {
        let fill = if fill.is_empty() { None } else { Some(fill) };
        self.engine.session.set_style(DrawStyle { stroke, stroke_width, fill });
    }

    #[wasm_bindgen(js_name = setTouchAllowed)]
    pub fn set_touch_allowed(&mut self, allowed: bool) {
        self.engine.session.set_touch_allowed(allowed);
    }

    pub fn undo(&mut self) -> String {
        let actions = self.engine.session.undo();
        self.finish(&actions)
    }

    pub fn redo(&mut self) -> String {
        let actions = self.engine.session.redo();
        self.finish(&actions)
    }

    pub fn clear(&mut self) -> String {
        let actions = self.engine.session.clear();
        self.finish(&actions)
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> u32 {
        let actions = self.engine.session.zoom_in();
        self.finish(&actions);
        self.zoom_percent()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> u32 {
        let actions = self.engine.session.zoom_out();
        self.finish(&actions);
        self.zoom_percent()
    }

    #[wasm_bindgen(js_name = zoomReset)]
    pub fn zoom_reset(&mut self) -> u32 {
        let actions = self.engine.session.zoom_reset();
        self.finish(&actions);
        self.zoom_percent()
    }

    #[wasm_bindgen(js_name = zoomPercent)]
    pub fn zoom_percent(&self) -> u32 {
        self.engine.session.view.zoom_percent()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.engine.session.history.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.engine.session.history.can_redo()
    }

    /// Insert a preset such as `"spring"`.
    #[wasm_bindgen(js_name = insertTemplate)]
    pub fn insert_template(&mut self, name: &str) -> Result<String, JsValue> {
        let template =
            Template::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown template: {name}")))?;
        let actions = self.engine.session.insert_template(template);
        Ok(self.finish(&actions))
    }

    #[wasm_bindgen(js_name = generateCode)]
    pub fn generate_code(&self) -> String {
        self.engine.session.generate_code()
    }

    /// Replace the diagram with shapes parsed from TikZ source.
    #[wasm_bindgen(js_name = importCode)]
    pub fn import_code(&mut self, source: &str) -> Result<String, JsValue> {
        let actions = self.engine.session.import_code(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.finish(&actions))
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.engine.session.export_json().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str) -> Result<String, JsValue> {
        let actions = self.engine.session.import_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.finish(&actions))
    }
}

impl DiagramEditor {
    /// Redraw if needed and hand the actions to JS.
    fn finish(&self, actions: &[Action]) -> String {
        if actions.contains(&Action::RenderNeeded) {
            self.engine.render();
        }
        serde_json::to_string(actions).unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to encode actions");
            "[]".to_owned()
        })
    }
}

fn pointer(x: f64, y: f64, button: i16, pointer_type: &str, modifiers: u8) -> PointerInput {
    PointerInput {
        screen: Point::new(x, y),
        button: Button::from_code(button),
        modifiers: Modifiers::from_bits(modifiers),
        kind: PointerKind::from_name(pointer_type),
    }
}
