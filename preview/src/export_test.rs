#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// =============================================================================
// plain_text_export
// =============================================================================

#[test]
fn text_export_is_raw_markup() {
    let artifact = plain_text_export("\\section{A}\n$x$");
    assert_eq!(artifact.file_name, "lecture.tex");
    assert_eq!(artifact.mime, "text/plain");
    assert_eq!(artifact.contents, "\\section{A}\n$x$");
}

// =============================================================================
// PageGeometry
// =============================================================================

#[test]
fn a4_content_box() {
    let page = PageGeometry::A4;
    assert!(approx_eq(page.content_width(), 547.28));
    assert!(approx_eq(page.content_height(), 793.89));
}

// =============================================================================
// slice_pages
// =============================================================================

#[test]
fn short_raster_is_one_page() {
    let slices = slice_pages(1000.0, 500.0, PageGeometry::A4);
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].source_y_px, 0.0);
    assert_eq!(slices[0].height_px, 500.0);
    assert!(approx_eq(slices[0].height_pt, 500.0 * 547.28 / 1000.0));
}

#[test]
fn tall_raster_splits_into_bands() {
    // Scale 1 pt/px: content width equals raster width.
    let page = PageGeometry { width_pt: 120.0, height_pt: 120.0, margin_pt: 10.0 };
    let slices = slice_pages(100.0, 250.0, page);
    let heights: Vec<f64> = slices.iter().map(|s| s.height_px).collect();
    assert_eq!(heights, vec![100.0, 100.0, 50.0]);
    assert_eq!(slices[2].source_y_px, 200.0);
}

#[test]
fn bands_cover_raster_exactly() {
    let slices = slice_pages(1240.0, 5321.0, PageGeometry::A4);
    let total: f64 = slices.iter().map(|s| s.height_px).sum();
    assert!(approx_eq(total, 5321.0));
    for pair in slices.windows(2) {
        assert!(approx_eq(pair[0].source_y_px + pair[0].height_px, pair[1].source_y_px));
    }
}

#[test]
fn exact_multiple_has_no_empty_tail() {
    let page = PageGeometry { width_pt: 120.0, height_pt: 120.0, margin_pt: 10.0 };
    assert_eq!(slice_pages(100.0, 300.0, page).len(), 3);
}

#[test]
fn degenerate_sizes_produce_nothing() {
    assert!(slice_pages(0.0, 100.0, PageGeometry::A4).is_empty());
    assert!(slice_pages(100.0, 0.0, PageGeometry::A4).is_empty());
    assert!(slice_pages(f64::NAN, 100.0, PageGeometry::A4).is_empty());
    let no_room = PageGeometry { width_pt: 40.0, height_pt: 40.0, margin_pt: 20.0 };
    assert!(slice_pages(100.0, 100.0, no_room).is_empty());
}
