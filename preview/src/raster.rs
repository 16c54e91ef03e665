//! Diagram rasterizers.
//!
//! A [`DiagramRasterizer`] turns a diagram block into a [`Surface`] the host
//! mounts inside the block's frame. Two strategies exist:
//!
//! - [`SandboxRasterizer`]: an isolated frame document running the TikZ
//!   interpreter. Its layout is not observable synchronously, so the host
//!   re-measures it on a bounded schedule ([`SizingPlan::Poll`]).
//! - [`NativeSvgRasterizer`]: parses the block with the diagram dialect and
//!   emits SVG directly. The size is known immediately.
//!
//! [`FallbackRasterizer`] chains the two so blocks the native parser cannot
//! read still render.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use canvas::{dialect, svg};

use crate::config::PreviewConfig;
use crate::display::DisplaySettings;
use crate::error::PreviewError;
use crate::render::DiagramBlock;

/// How the host sizes a mounted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingPlan {
    /// Explicit height from the display settings; no measuring.
    Fixed(u32),
    /// Measure right after load, then every `interval_ms` until `window_ms`
    /// has elapsed. The frame then keeps its last size.
    Poll { interval_ms: u32, window_ms: u32, min_height: u32 },
}

impl SizingPlan {
    #[must_use]
    pub fn for_frame(settings: &DisplaySettings, config: &PreviewConfig) -> Self {
        match settings.height {
            Some(height) => Self::Fixed(height),
            None => Self::Poll {
                interval_ms: config.poll_interval_ms.max(1),
                window_ms: config.poll_window_ms,
                min_height: config.min_frame_height,
            },
        }
    }

    /// Frame height to apply for a measured content height.
    #[must_use]
    pub fn height_for(&self, measured: f64) -> f64 {
        match *self {
            Self::Fixed(height) => f64::from(height),
            Self::Poll { min_height, .. } => {
                if measured.is_finite() { measured.max(f64::from(min_height)) } else { f64::from(min_height) }
            }
        }
    }

    /// Scheduled re-measurements after the initial one.
    #[must_use]
    pub fn poll_ticks(&self) -> u32 {
        match *self {
            Self::Fixed(_) => 0,
            Self::Poll { interval_ms, window_ms, .. } => window_ms / interval_ms.max(1),
        }
    }
}

/// What the host mounts inside a diagram frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// A sandboxed frame with this `srcdoc`.
    Sandbox { document: String, sizing: SizingPlan },
    /// Ready markup with a known height in pixels.
    Inline { markup: String, height: f64 },
}

pub trait DiagramRasterizer {
    /// # Errors
    ///
    /// Returns an error if this strategy cannot render `block`.
    fn surface(&self, block: &DiagramBlock) -> Result<Surface, PreviewError>;
}

/// Isolated frame running the TikZ interpreter.
#[derive(Debug, Clone)]
pub struct SandboxRasterizer {
    config: PreviewConfig,
}

impl SandboxRasterizer {
    #[must_use]
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }
}

impl DiagramRasterizer for SandboxRasterizer {
    fn surface(&self, block: &DiagramBlock) -> Result<Surface, PreviewError> {
        Ok(Surface::Sandbox {
            document: sandbox_document(&block.source, &self.config),
            sizing: SizingPlan::for_frame(&block.settings, &self.config),
        })
    }
}

/// Standalone frame document for one diagram.
#[must_use]
pub fn sandbox_document(source: &str, config: &PreviewConfig) -> String {
    let max = config.max_diagram_px;
    format!(
        concat!(
            "<!DOCTYPE html><html><head>",
            r#"<meta charset="utf-8">"#,
            r#"<link rel="stylesheet" href="{fonts}">"#,
            r#"<script defer src="{script}"></script>"#,
            "<style>html,body{{margin:0;padding:0;height:100%;background:#fff;display:flex;",
            "align-items:center;justify-content:center;}}",
            "svg{{max-width:{max}px;max-height:{max}px;width:auto;height:auto;}}</style>",
            "</head><body>",
            r#"<script type="text/tikz">{source}</script>"#,
            "</body></html>"
        ),
        fonts = escape_attr(&config.tikz_fonts_url),
        script = escape_attr(&config.tikz_script_url),
        max = max,
        source = escape_script(source),
    )
}

/// Keep diagram text from closing its `<script>` element early.
#[must_use]
pub fn escape_script(source: &str) -> String {
    source.replace("</", "<\\/")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

/// SVG rendered from the diagram dialect, without a frame.
#[derive(Debug, Clone)]
pub struct NativeSvgRasterizer {
    config: PreviewConfig,
}

impl NativeSvgRasterizer {
    #[must_use]
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }
}

impl DiagramRasterizer for NativeSvgRasterizer {
    fn surface(&self, block: &DiagramBlock) -> Result<Surface, PreviewError> {
        let shapes = dialect::parse(&block.source)?;
        let natural = svg::bounds(&shapes, true).map_or(2.0 * svg::PADDING, |b| b.height() + 2.0 * svg::PADDING);
        let capped = natural.min(f64::from(self.config.max_diagram_px));
        let sizing = SizingPlan::for_frame(&block.settings, &self.config);
        Ok(Surface::Inline { markup: svg::to_svg(&shapes, true), height: sizing.height_for(capped) })
    }
}

/// Try `primary`, fall back to `secondary` when it fails.
#[derive(Debug, Clone)]
pub struct FallbackRasterizer<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackRasterizer<P, S> {
    #[must_use]
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: DiagramRasterizer, S: DiagramRasterizer> DiagramRasterizer for FallbackRasterizer<P, S> {
    fn surface(&self, block: &DiagramBlock) -> Result<Surface, PreviewError> {
        match self.primary.surface(block) {
            Ok(surface) => Ok(surface),
            Err(err) => {
                tracing::debug!(id = %block.id, %err, "primary rasterizer failed; falling back");
                self.secondary.surface(block)
            }
        }
    }
}

/// The rasterizer `config` asks for.
#[must_use]
pub fn rasterizer_for(config: &PreviewConfig) -> Box<dyn DiagramRasterizer> {
    let sandbox = SandboxRasterizer::new(config.clone());
    if config.native_diagrams {
        Box::new(FallbackRasterizer::new(NativeSvgRasterizer::new(config.clone()), sandbox))
    } else {
        Box::new(sandbox)
    }
}
