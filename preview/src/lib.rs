//! Live markup preview for the lecture authoring tool.
//!
//! Renders LaTeX-flavoured lecture markup to HTML next to the code editor.
//! Every rendered element is tagged with the byte span of the markup that
//! produced it, so hovering the preview can highlight the matching source
//! range. `tikzpicture` environments become diagram cards whose contents are
//! produced by a pluggable [`raster::DiagramRasterizer`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`tokenizer`] | Single forward scan producing math, macro, diagram and config-comment tokens |
//! | [`span`] | Source spans, tagged spans, line/column mapping for the editor |
//! | [`display`] | Per-diagram display settings: comment parsing, ids, persistence |
//! | [`render`] | Token stream to tagged HTML, plus diagram blocks and math spans |
//! | [`hover`] | Preview hover to editor highlight |
//! | [`raster`] | Diagram rasterizers (sandbox frame, native SVG) and frame sizing |
//! | [`export`] | Plain-text export and page slicing for paginated export |
//! | [`config`] | Timings, storage prefix and interpreter URLs |
//! | [`error`] | [`PreviewError`] |
//!
//! The browser host (`dom`, `debounce`, and the `PreviewRenderer` binding)
//! is only built for `wasm32`.

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod hover;
pub mod raster;
pub mod render;
pub mod span;
pub mod tokenizer;

#[cfg(target_arch = "wasm32")]
mod debounce;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use error::PreviewError;

#[cfg(target_arch = "wasm32")]
pub use wasm::PreviewRenderer;
