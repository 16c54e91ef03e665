//! Document export artifacts.
//!
//! Plain-text export is the raw markup as `lecture.tex`. Paginated export
//! slices one tall rasterization of the preview into page-height bands; the
//! host draws each band onto its own page.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::Serialize;

pub const TEXT_FILE_NAME: &str = "lecture.tex";
pub const TEXT_MIME: &str = "text/plain";
pub const PAGES_FILE_NAME: &str = "lecture-preview.pdf";

/// Remaining height below which slicing stops, in points. Absorbs float error.
const SLICE_EPSILON_PT: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub contents: String,
}

#[must_use]
pub fn plain_text_export(text: &str) -> TextArtifact {
    TextArtifact { file_name: TEXT_FILE_NAME, mime: TEXT_MIME, contents: text.to_owned() }
}

/// Page size and margin in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_pt: f64,
    pub height_pt: f64,
    pub margin_pt: f64,
}

impl PageGeometry {
    /// Portrait A4 with a 24 pt margin.
    pub const A4: Self = Self { width_pt: 595.28, height_pt: 841.89, margin_pt: 24.0 };

    #[must_use]
    pub fn content_width(&self) -> f64 {
        self.width_pt - 2.0 * self.margin_pt
    }

    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.height_pt - 2.0 * self.margin_pt
    }
}

/// One page band: rows `[source_y_px, source_y_px + height_px)` of the
/// rasterized preview, drawn at the page margin `height_pt` tall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSlice {
    pub source_y_px: f64,
    pub height_px: f64,
    pub height_pt: f64,
}

/// Split a `width_px` x `height_px` raster into page bands. The raster is
/// scaled to the page's content width; each band fills at most the content
/// height. Degenerate sizes produce no pages.
#[must_use]
pub fn slice_pages(width_px: f64, height_px: f64, page: PageGeometry) -> Vec<PageSlice> {
    let content_w = page.content_width();
    let content_h = page.content_height();
    if !(width_px > 0.0 && height_px > 0.0 && content_w > 0.0 && content_h > 0.0) {
        return Vec::new();
    }
    if !(width_px.is_finite() && height_px.is_finite()) {
        return Vec::new();
    }

    let pt_per_px = content_w / width_px;
    let band_px = content_h / pt_per_px;
    let mut remaining_pt = height_px * pt_per_px;
    let mut y = 0.0;
    let mut slices = Vec::new();
    while remaining_pt > SLICE_EPSILON_PT && y < height_px {
        let height = band_px.min(height_px - y);
        let height_pt = height * pt_per_px;
        slices.push(PageSlice { source_y_px: y, height_px: height, height_pt });
        remaining_pt -= height_pt;
        y += height;
    }
    slices
}
