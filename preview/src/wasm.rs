//! `wasm-bindgen` exports for the markup preview.
//!
//! The page constructs one [`PreviewRenderer`] per preview pane, forwards
//! every editor change to `setSource`, and registers the editor's highlight
//! callbacks with `setHighlighter`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::PreviewConfig;
use crate::debounce::Debouncer;
use crate::display::DisplayConfig;
use crate::dom::{self, HoverListeners, JsHighlighter, PreviewHost};
use crate::error::PreviewError;
use crate::export::{self, PageGeometry};

fn to_js(err: PreviewError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Live preview bound to one root element.
#[wasm_bindgen]
pub struct PreviewRenderer {
    host: Rc<RefCell<PreviewHost>>,
    debounce: Debouncer,
    _listeners: HoverListeners,
}

#[wasm_bindgen]
impl PreviewRenderer {
    /// Attach to `root`. `config_json` overrides [`PreviewConfig`] fields.
    #[wasm_bindgen(constructor)]
    pub fn new(root: Element, config_json: Option<String>) -> Result<PreviewRenderer, JsValue> {
        canvas::install_browser_hooks();
        let config = match config_json {
            Some(json) => PreviewConfig::from_json(&json).map_err(to_js)?,
            None => PreviewConfig::default(),
        };
        let debounce = Debouncer::new(config.debounce_ms);
        let host = Rc::new(RefCell::new(PreviewHost::new(root.clone(), config)));
        let listeners = HoverListeners::attach(&root, &host).map_err(to_js)?;
        Ok(Self { host, debounce, _listeners: listeners })
    }

    /// Re-render after the debounce delay. A newer call replaces a pending one.
    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&mut self, text: String) {
        let host = Rc::downgrade(&self.host);
        self.debounce.schedule(move || {
            let Some(host) = host.upgrade() else {
                return;
            };
            match host.try_borrow_mut() {
                Ok(mut host) => host.render(&text),
                Err(_) => tracing::warn!("preview busy; debounced render dropped"),
            }
        });
    }

    /// Render immediately, dropping any pending debounced render.
    #[wasm_bindgen(js_name = renderNow)]
    pub fn render_now(&mut self, text: &str) {
        self.debounce.cancel();
        self.host.borrow_mut().render(text);
    }

    #[wasm_bindgen(js_name = setHighlighter)]
    pub fn set_highlighter(&mut self, highlight: js_sys::Function, clear: js_sys::Function) {
        self.host.borrow_mut().set_highlighter(Some(JsHighlighter::new(highlight, clear)));
    }

    #[wasm_bindgen(js_name = clearHighlighter)]
    pub fn clear_highlighter(&mut self) {
        self.host.borrow_mut().set_highlighter(None);
    }

    /// Spans of the last successful render as JSON.
    pub fn spans(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.host.borrow().spans()).map_err(|err| to_js(err.into()))
    }

    /// Download the current source as `lecture.tex`.
    #[wasm_bindgen(js_name = exportText)]
    pub fn export_text(&self) -> Result<(), JsValue> {
        let artifact = export::plain_text_export(self.host.borrow().source());
        dom::download(&artifact).map_err(to_js)
    }

    /// Persist `{"width":..,"align":..,"height":..}` for diagram `id` and
    /// re-render.
    #[wasm_bindgen(js_name = saveDisplayConfig)]
    pub fn save_display_config(&mut self, id: &str, config_json: &str) -> Result<(), JsValue> {
        let config: DisplayConfig = serde_json::from_str(config_json).map_err(|err| to_js(err.into()))?;
        self.host.borrow_mut().save_display_config(id, &config).map_err(to_js)
    }

    /// A4 page bands for a `width_px` x `height_px` rasterization of the
    /// preview, as JSON.
    #[wasm_bindgen(js_name = pageSlices)]
    pub fn page_slices(&self, width_px: f64, height_px: f64) -> Result<String, JsValue> {
        let slices = export::slice_pages(width_px, height_px, PageGeometry::A4);
        serde_json::to_string(&slices).map_err(|err| to_js(err.into()))
    }

    #[wasm_bindgen(js_name = pagesFileName)]
    pub fn pages_file_name(&self) -> String {
        export::PAGES_FILE_NAME.to_owned()
    }

    #[wasm_bindgen(js_name = debounceMs)]
    pub fn debounce_ms(&self) -> u32 {
        self.host.borrow().config().debounce_ms
    }
}
