//! Standalone SVG export of a shape list.
//!
//! Used for static previews where no canvas is available. The viewBox is the
//! padded bounding box of the shapes. With `flip_y` the y axis points up, which
//! is how TikZ coordinates read; labels are positioned in flipped space but not
//! mirrored.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use crate::camera::Point;
use crate::consts::LABEL_FONT_PX;
use crate::doc::{Shape, Style};
use crate::render::arrow_barbs;

/// Padding around the content bounds, in world units.
pub const PADDING: f64 = 10.0;

/// Rough advance width of one label character relative to the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Axis-aligned bounds in output space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn around(p: Point) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Content bounds of `shapes` after the optional y flip, without padding.
#[must_use]
pub fn bounds(shapes: &[Shape], flip_y: bool) -> Option<Bounds> {
    let mut acc: Option<Bounds> = None;
    let mut add = |p: Point| {
        acc = Some(match acc {
            Some(mut b) => {
                b.include(p);
                b
            }
            None => Bounds::around(p),
        });
    };
    for shape in shapes {
        match shape {
            Shape::Line(s) | Shape::Arrow(s) => {
                add(map(s.start, flip_y));
                add(map(s.end, flip_y));
            }
            Shape::Rectangle(r) => r.corners().into_iter().for_each(|c| add(map(c, flip_y))),
            Shape::Circle(c) => {
                let center = map(c.center, flip_y);
                let r = c.radius.abs();
                add(Point::new(center.x - r, center.y - r));
                add(Point::new(center.x + r, center.y + r));
            }
            Shape::Text(l) | Shape::Node(l) => {
                let at = map(l.at, flip_y);
                let width = label_width(&l.text);
                add(Point::new(at.x, at.y - LABEL_FONT_PX));
                add(Point::new(at.x + width, at.y));
            }
        }
    }
    acc
}

/// Render `shapes` as a complete SVG document.
#[must_use]
pub fn to_svg(shapes: &[Shape], flip_y: bool) -> String {
    let b = bounds(shapes, flip_y).unwrap_or(Bounds { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 });
    let (x, y) = (b.min_x - PADDING, b.min_y - PADDING);
    let (w, h) = (b.width() + PADDING * 2.0, b.height() + PADDING * 2.0);

    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x:.2} {y:.2} {w:.2} {h:.2}" width="{w:.2}" height="{h:.2}">"#
    );
    out.push('\n');
    for shape in shapes {
        out.push_str("  ");
        out.push_str(&element(shape, flip_y));
        out.push('\n');
    }
    out.push_str("</svg>");
    out
}

fn element(shape: &Shape, flip_y: bool) -> String {
    let stroke = stroke_attrs(shape.style());
    let fill = shape.fill().map_or_else(|| "none".to_owned(), escape_xml);
    match shape {
        Shape::Line(s) => {
            let (a, b) = (map(s.start, flip_y), map(s.end, flip_y));
            format!(r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {stroke}/>"#, a.x, a.y, b.x, b.y)
        }
        Shape::Arrow(s) => {
            let (a, b) = (map(s.start, flip_y), map(s.end, flip_y));
            let [l, r] = arrow_barbs(a, b);
            format!(
                r#"<g class="arrow"><line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {stroke}/><polyline points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="none" {stroke}/></g>"#,
                a.x, a.y, b.x, b.y, l.x, l.y, b.x, b.y, r.x, r.y
            )
        }
        Shape::Rectangle(r) => {
            let corners = r.corners().map(|c| map(c, flip_y));
            let min_x = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
            let min_y = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
            format!(
                r#"<rect x="{min_x:.2}" y="{min_y:.2}" width="{:.2}" height="{:.2}" fill="{fill}" {stroke}/>"#,
                r.width.abs(),
                r.height.abs()
            )
        }
        Shape::Circle(c) => {
            let center = map(c.center, flip_y);
            format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{fill}" {stroke}/>"#,
                center.x,
                center.y,
                c.radius.abs()
            )
        }
        Shape::Text(l) => text_element(map(l.at, flip_y), &l.text, &l.style.stroke),
        Shape::Node(l) => {
            let at = map(l.at, flip_y);
            let width = label_width(&l.text);
            format!(
                r#"<g class="node"><rect x="{:.2}" y="{:.2}" width="{width:.2}" height="{LABEL_FONT_PX:.2}" fill="none" {stroke}/>{}</g>"#,
                at.x,
                at.y - LABEL_FONT_PX,
                text_element(at, &l.text, &l.style.stroke)
            )
        }
    }
}

fn text_element(at: Point, text: &str, color: &str) -> String {
    format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="Arial" font-size="{LABEL_FONT_PX}" fill="{}">{}</text>"#,
        at.x,
        at.y,
        escape_xml(color),
        escape_xml(text)
    )
}

fn stroke_attrs(style: &Style) -> String {
    format!(r#"stroke="{}" stroke-width="{:.2}""#, escape_xml(&style.stroke), style.stroke_width)
}

#[allow(clippy::cast_precision_loss)]
fn label_width(text: &str) -> f64 {
    text.chars().count() as f64 * LABEL_FONT_PX * CHAR_WIDTH_RATIO
}

fn map(p: Point, flip_y: bool) -> Point {
    if flip_y { Point::new(p.x, -p.y) } else { p }
}
