//! Browser host: mounts rendered previews into the page.
//!
//! [`PreviewHost`] owns the preview root element and everything that outlives
//! one render pass: the display-config store, the rasterizer, the hover state
//! and the per-frame sizing timers. A new render drops the previous frames'
//! timers after their iframes have been detached.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Document, Element, Event, HtmlAnchorElement, HtmlElement, HtmlIFrameElement, Storage, Url};

use crate::config::PreviewConfig;
use crate::display::{self, DisplayConfig, DisplayConfigStore};
use crate::error::PreviewError;
use crate::export::TextArtifact;
use crate::hover::{self, HighlightSink, HoverController};
use crate::raster::{self, DiagramRasterizer, SizingPlan, Surface};
use crate::render;
use crate::span::{EditorRange, SourceSpan, TaggedSpan};

const SPAN_SELECTOR: &str = "[data-start][data-end]";
const MATH_CLASS: &str = "katex";
const FRAME_CLASS: &str = "tikz-frame";
const CARD_MARGIN: &str = "8px";

/// Options for the page's `renderMathInElement` auto-render helper.
const MATH_OPTIONS: &str = r#"{"delimiters":[
{"left":"$$","right":"$$","display":true},
{"left":"$","right":"$","display":false},
{"left":"\\[","right":"\\]","display":true},
{"left":"\\(","right":"\\)","display":false}
],"throwOnError":false}"#;

fn dom_err(context: &str, err: JsValue) -> PreviewError {
    PreviewError::Dom(format!("{context}: {err:?}"))
}

fn document() -> Result<Document, PreviewError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| PreviewError::Dom("no document".to_owned()))
}

// =============================================================================
// Storage
// =============================================================================

/// Display settings in `localStorage`, one key per diagram id.
pub struct LocalStorageStore {
    prefix: String,
    storage: Option<Storage>,
}

impl LocalStorageStore {
    /// Open the page's local storage. Private browsing modes may refuse it;
    /// the store then loads nothing and rejects saves.
    pub fn open(prefix: &str) -> Self {
        let storage = match web_sys::window().map(|window| window.local_storage()) {
            Some(Ok(Some(storage))) => Some(storage),
            Some(Ok(None)) | None => {
                tracing::warn!("localStorage not available; display settings will not persist");
                None
            }
            Some(Err(err)) => {
                tracing::warn!(?err, "localStorage access denied; display settings will not persist");
                None
            }
        };
        Self { prefix: prefix.to_owned(), storage }
    }
}

impl DisplayConfigStore for LocalStorageStore {
    fn load(&self, id: &str) -> Option<DisplayConfig> {
        let storage = self.storage.as_ref()?;
        match storage.get_item(&display::storage_key(&self.prefix, id)) {
            Ok(Some(raw)) => display::decode_stored(id, &raw),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(id, ?err, "localStorage read failed");
                None
            }
        }
    }

    fn save(&mut self, id: &str, config: &DisplayConfig) -> Result<(), PreviewError> {
        let storage = self.storage.as_ref().ok_or(PreviewError::StorageUnavailable)?;
        let raw = serde_json::to_string(config)?;
        storage
            .set_item(&display::storage_key(&self.prefix, id), &raw)
            .map_err(|err| dom_err("localStorage.setItem", err))
    }
}

// =============================================================================
// Highlight sink
// =============================================================================

/// Editor highlight callbacks supplied by the page:
/// `highlight(startLine, startColumn, endLine, endColumn)` and `clear()`.
pub struct JsHighlighter {
    highlight: js_sys::Function,
    clear: js_sys::Function,
}

impl JsHighlighter {
    pub fn new(highlight: js_sys::Function, clear: js_sys::Function) -> Self {
        Self { highlight, clear }
    }
}

fn js_count(n: usize) -> JsValue {
    JsValue::from(u32::try_from(n).unwrap_or(u32::MAX))
}

impl HighlightSink for JsHighlighter {
    fn highlight(&mut self, range: EditorRange) {
        let args = js_sys::Array::new();
        args.push(&js_count(range.start_line_number));
        args.push(&js_count(range.start_column));
        args.push(&js_count(range.end_line_number));
        args.push(&js_count(range.end_column));
        if let Err(err) = self.highlight.apply(&JsValue::NULL, &args) {
            tracing::warn!(?err, "editor highlight callback failed");
        }
    }

    fn clear(&mut self) {
        if let Err(err) = self.clear.call0(&JsValue::NULL) {
            tracing::warn!(?err, "editor clear callback failed");
        }
    }
}

/// Stand-in until the page registers its editor callbacks.
struct NoHighlighter;

impl HighlightSink for NoHighlighter {
    fn highlight(&mut self, _range: EditorRange) {}
    fn clear(&mut self) {}
}

// =============================================================================
// Frames
// =============================================================================

#[derive(Default)]
struct Polling {
    interval: Option<Interval>,
    deadline: Option<Timeout>,
}

/// Keeps a sandbox frame's load handler and sizing timers alive.
struct FrameWatch {
    _onload: Option<Closure<dyn FnMut()>>,
    _polling: Rc<RefCell<Polling>>,
}

fn measure(iframe: &HtmlIFrameElement) -> f64 {
    let Some(doc) = iframe.content_document() else {
        return f64::NAN;
    };
    let body = doc.body().map_or(0, |body| body.scroll_height());
    let root = doc.document_element().map_or(0, |root| root.scroll_height());
    f64::from(body.max(root))
}

fn set_height(el: &HtmlElement, height: f64) {
    if let Err(err) = el.style().set_property("height", &format!("{height}px")) {
        tracing::warn!(?err, "failed to size diagram frame");
    }
}

fn watch_frame(iframe: &HtmlIFrameElement, plan: SizingPlan) -> FrameWatch {
    let polling = Rc::new(RefCell::new(Polling::default()));
    let SizingPlan::Poll { interval_ms, window_ms, .. } = plan else {
        set_height(iframe, plan.height_for(f64::NAN));
        return FrameWatch { _onload: None, _polling: polling };
    };

    let frame = iframe.clone();
    let state = Rc::downgrade(&polling);
    let onload = Closure::<dyn FnMut()>::new(move || {
        set_height(&frame, plan.height_for(measure(&frame)));
        let Some(state) = state.upgrade() else {
            return;
        };
        let tick_frame = frame.clone();
        let interval = Interval::new(interval_ms, move || {
            set_height(&tick_frame, plan.height_for(measure(&tick_frame)));
        });
        let stop = Rc::downgrade(&state);
        let deadline = Timeout::new(window_ms, move || {
            if let Some(state) = stop.upgrade() {
                drop(state.borrow_mut().interval.take());
            }
        });
        let mut state = state.borrow_mut();
        state.interval = Some(interval);
        state.deadline = Some(deadline);
    });
    iframe.set_onload(Some(onload.as_ref().unchecked_ref()));
    FrameWatch { _onload: Some(onload), _polling: polling }
}

fn sandbox_frame(doc: &Document, srcdoc: &str) -> Result<HtmlIFrameElement, PreviewError> {
    let iframe: HtmlIFrameElement = doc
        .create_element("iframe")
        .map_err(|err| dom_err("createElement(iframe)", err))?
        .dyn_into()
        .map_err(|_| PreviewError::Dom("created element is not an iframe".to_owned()))?;
    let style = iframe.style();
    style.set_property("width", "100%").map_err(|err| dom_err("iframe width", err))?;
    style.set_property("border", "0").map_err(|err| dom_err("iframe border", err))?;
    iframe.set_attribute("loading", "lazy").map_err(|err| dom_err("iframe loading", err))?;
    iframe.set_srcdoc(srcdoc);
    Ok(iframe)
}

// =============================================================================
// Host
// =============================================================================

pub struct PreviewHost {
    root: Element,
    config: PreviewConfig,
    store: LocalStorageStore,
    rasterizer: Box<dyn DiagramRasterizer>,
    hover: HoverController,
    highlighter: Option<JsHighlighter>,
    frames: Vec<FrameWatch>,
    spans: Vec<TaggedSpan>,
}

impl PreviewHost {
    pub fn new(root: Element, config: PreviewConfig) -> Self {
        let store = LocalStorageStore::open(&config.storage_prefix);
        let rasterizer = raster::rasterizer_for(&config);
        Self {
            root,
            config,
            store,
            rasterizer,
            hover: HoverController::default(),
            highlighter: None,
            frames: Vec::new(),
            spans: Vec::new(),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn source(&self) -> &str {
        self.hover.document()
    }

    /// Spans recorded by the last successful render.
    pub fn spans(&self) -> &[TaggedSpan] {
        &self.spans
    }

    pub fn set_highlighter(&mut self, highlighter: Option<JsHighlighter>) {
        let mut none = NoHighlighter;
        let sink: &mut dyn HighlightSink = match self.highlighter.as_mut() {
            Some(current) => current,
            None => &mut none,
        };
        self.hover.out(sink);
        self.highlighter = highlighter;
    }

    /// Re-render `text` into the root. On failure the root holds only the
    /// error element.
    pub fn render(&mut self, text: &str) {
        let mut none = NoHighlighter;
        let sink: &mut dyn HighlightSink = match self.highlighter.as_mut() {
            Some(current) => current,
            None => &mut none,
        };
        self.hover.set_document(text, sink);
        if let Err(err) = self.try_render(text) {
            tracing::warn!(%err, "preview render failed");
            self.root.set_inner_html(&render::error_html(&err));
            self.frames.clear();
            self.spans.clear();
        }
    }

    fn try_render(&mut self, text: &str) -> Result<(), PreviewError> {
        let rendered = render::render_document(text, &self.store)?;
        let surfaces =
            rendered.diagrams.iter().map(|block| self.rasterizer.surface(block)).collect::<Result<Vec<_>, _>>()?;

        self.root.set_inner_html(&rendered.html());
        // Old iframes are detached now; their timers can go.
        self.frames.clear();

        typeset_math(&self.root);
        attach_math_spans(&self.root, &rendered.math)?;
        self.mount_frames(&surfaces)?;

        self.spans = rendered.all_spans().into_iter().cloned().collect();
        Ok(())
    }

    fn mount_frames(&mut self, surfaces: &[Surface]) -> Result<(), PreviewError> {
        let doc = document()?;
        let slots = self.root.get_elements_by_class_name(FRAME_CLASS);
        if slots.length() as usize != surfaces.len() {
            tracing::warn!(slots = slots.length(), diagrams = surfaces.len(), "diagram frame count mismatch");
        }
        for (index, surface) in (0..slots.length()).zip(surfaces) {
            let Some(slot) = slots.item(index) else {
                break;
            };
            let slot: HtmlElement =
                slot.dyn_into().map_err(|_| PreviewError::Dom("diagram frame is not an HTML element".to_owned()))?;
            if let Some(card) = slot.parent_element() {
                if let Some(card) = card.dyn_ref::<HtmlElement>() {
                    card.style().set_property("margin", CARD_MARGIN).map_err(|err| dom_err("card margin", err))?;
                }
            }
            match surface {
                Surface::Inline { markup, height } => {
                    slot.set_inner_html(markup);
                    set_height(&slot, *height);
                }
                Surface::Sandbox { document: srcdoc, sizing } => {
                    let iframe = sandbox_frame(&doc, srcdoc)?;
                    self.frames.push(watch_frame(&iframe, *sizing));
                    slot.set_inner_html("");
                    slot.append_child(&iframe).map_err(|err| dom_err("appendChild(iframe)", err))?;
                }
            }
        }
        Ok(())
    }

    /// Persist settings for one diagram and re-render with them.
    pub fn save_display_config(&mut self, id: &str, config: &DisplayConfig) -> Result<(), PreviewError> {
        self.store.save(id, config)?;
        let text = self.hover.document().to_owned();
        self.render(&text);
        Ok(())
    }

    pub fn hover_over(&mut self, span: SourceSpan) {
        let mut none = NoHighlighter;
        let sink: &mut dyn HighlightSink = match self.highlighter.as_mut() {
            Some(current) => current,
            None => &mut none,
        };
        self.hover.over(span, sink);
    }

    pub fn hover_out(&mut self) {
        let mut none = NoHighlighter;
        let sink: &mut dyn HighlightSink = match self.highlighter.as_mut() {
            Some(current) => current,
            None => &mut none,
        };
        self.hover.out(sink);
    }
}

// =============================================================================
// Math
// =============================================================================

/// Run the page's math auto-renderer over `root`, if it is loaded.
fn typeset_math(root: &Element) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let render = match js_sys::Reflect::get(&window, &JsValue::from_str("renderMathInElement")) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(?err, "math renderer lookup failed");
            return;
        }
    };
    let Some(render) = render.dyn_ref::<js_sys::Function>() else {
        tracing::debug!("math renderer not loaded; math left as source");
        return;
    };
    let options = match js_sys::JSON::parse(MATH_OPTIONS) {
        Ok(options) => options,
        Err(err) => {
            tracing::warn!(?err, "math renderer options rejected");
            return;
        }
    };
    if let Err(err) = render.call2(&JsValue::NULL, root, &options) {
        tracing::warn!(?err, "math renderer failed");
    }
}

/// Tag typeset math elements with the spans of their sources, pairing both
/// lists in document order.
fn attach_math_spans(root: &Element, math: &[TaggedSpan]) -> Result<(), PreviewError> {
    let rendered = root.get_elements_by_class_name(MATH_CLASS);
    if rendered.length() as usize != math.len() {
        tracing::debug!(rendered = rendered.length(), spans = math.len(), "math element count differs from spans");
    }
    for (index, tagged) in (0..rendered.length()).zip(math) {
        let Some(el) = rendered.item(index) else {
            break;
        };
        el.class_list().add_1("src").map_err(|err| dom_err("classList.add", err))?;
        el.set_attribute("data-start", &tagged.span.start.to_string()).map_err(|err| dom_err("data-start", err))?;
        el.set_attribute("data-end", &tagged.span.end.to_string()).map_err(|err| dom_err("data-end", err))?;
    }
    Ok(())
}

// =============================================================================
// Hover
// =============================================================================

fn span_at(event: &Event) -> Option<SourceSpan> {
    let target = event.target()?;
    let el = target.dyn_ref::<Element>()?;
    let tagged = match el.closest(SPAN_SELECTOR) {
        Ok(Some(tagged)) => tagged,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(?err, "closest() failed");
            return None;
        }
    };
    hover::parse_span_attrs(tagged.get_attribute("data-start").as_deref(), tagged.get_attribute("data-end").as_deref())
}

/// Delegated `mouseover`/`mouseout` listeners on the preview root. Removed
/// on drop.
pub struct HoverListeners {
    root: Element,
    over: Closure<dyn FnMut(Event)>,
    out: Closure<dyn FnMut(Event)>,
}

impl HoverListeners {
    pub fn attach(root: &Element, host: &Rc<RefCell<PreviewHost>>) -> Result<Self, PreviewError> {
        let over_host: Weak<RefCell<PreviewHost>> = Rc::downgrade(host);
        let over = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(span) = span_at(&event) else {
                return;
            };
            let Some(host) = over_host.upgrade() else {
                return;
            };
            match host.try_borrow_mut() {
                Ok(mut host) => host.hover_over(span),
                Err(_) => tracing::debug!("preview busy; hover skipped"),
            }
        });

        let out_host: Weak<RefCell<PreviewHost>> = Rc::downgrade(host);
        let out = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if span_at(&event).is_none() {
                return;
            }
            let Some(host) = out_host.upgrade() else {
                return;
            };
            match host.try_borrow_mut() {
                Ok(mut host) => host.hover_out(),
                Err(_) => tracing::debug!("preview busy; hover clear skipped"),
            }
        });

        root.add_event_listener_with_callback("mouseover", over.as_ref().unchecked_ref())
            .map_err(|err| dom_err("addEventListener(mouseover)", err))?;
        root.add_event_listener_with_callback("mouseout", out.as_ref().unchecked_ref())
            .map_err(|err| dom_err("addEventListener(mouseout)", err))?;
        Ok(Self { root: root.clone(), over, out })
    }
}

impl Drop for HoverListeners {
    fn drop(&mut self) {
        for (name, listener) in [("mouseover", &self.over), ("mouseout", &self.out)] {
            if let Err(err) = self.root.remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref()) {
                tracing::warn!(name, ?err, "failed to remove hover listener");
            }
        }
    }
}

// =============================================================================
// Downloads
// =============================================================================

/// Offer `artifact` as a file download.
pub fn download(artifact: &TextArtifact) -> Result<(), PreviewError> {
    let doc = document()?;

    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(&artifact.contents));
    let options = BlobPropertyBag::new();
    options.set_type(artifact.mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(|err| dom_err("Blob", err))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|err| dom_err("URL.createObjectURL", err))?;

    let anchor: HtmlAnchorElement = doc
        .create_element("a")
        .map_err(|err| dom_err("createElement(a)", err))?
        .dyn_into()
        .map_err(|_| PreviewError::Dom("created element is not an anchor".to_owned()))?;
    anchor.set_href(&url);
    anchor.set_download(artifact.file_name);
    anchor.click();

    if let Err(err) = Url::revoke_object_url(&url) {
        tracing::warn!(?err, "failed to revoke download URL");
    }
    Ok(())
}
