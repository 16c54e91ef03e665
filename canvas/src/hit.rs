//! Geometry engine: distances, nearest-shape lookup, snapping, and handles.
//!
//! Everything here is a pure function of its inputs. Shape order matters:
//! callers pass the model in insertion order so that tie-breaks are stable.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::doc::Shape;

/// Editable control point on the selected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    LineStart,
    LineEnd,
    CircleCenter,
}

/// Distance from `p` to the segment `a`-`b`, projecting onto the segment and
/// clamping the parameter to `[0, 1]`. A degenerate segment is its endpoint.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Distance from `p` to the outline or body of `shape`.
///
/// Rectangles count their interior as distance 0; circles measure to the rim.
#[must_use]
pub fn distance_to_shape(shape: &Shape, p: Point) -> f64 {
    match shape {
        Shape::Line(s) | Shape::Arrow(s) => distance_to_segment(p, s.start, s.end),
        Shape::Rectangle(r) => {
            let (left, right) = ordered(r.x, r.x + r.width);
            let (top, bottom) = ordered(r.y, r.y + r.height);
            let dx = (left - p.x).max(0.0).max(p.x - right);
            let dy = (top - p.y).max(0.0).max(p.y - bottom);
            dx.hypot(dy)
        }
        Shape::Circle(c) => (p.distance(c.center) - c.radius).abs(),
        Shape::Text(l) | Shape::Node(l) => p.distance(l.at),
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Index of the closest shape strictly nearer than `max_dist`.
/// Equal distances resolve to the lowest index.
#[must_use]
pub fn hit_test(shapes: &[Shape], p: Point, max_dist: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_dist = max_dist;
    for (i, shape) in shapes.iter().enumerate() {
        let d = distance_to_shape(shape, p);
        if d < best_dist {
            best_dist = d;
            best = Some(i);
        }
    }
    best
}

/// Index of the most recently drawn shape within `threshold` (inclusive).
///
/// Used by the eraser: it scans from the top of the stack and stops at the
/// first match rather than looking for the closest one.
#[must_use]
pub fn hit_test_topmost(shapes: &[Shape], p: Point, threshold: f64) -> Option<usize> {
    shapes.iter().rposition(|shape| distance_to_shape(shape, p) <= threshold)
}

/// Snap `p` to the nearest feature point of any shape other than `ignore`,
/// if one lies strictly within `tolerance`. Otherwise returns `p` unchanged.
#[must_use]
pub fn snap(shapes: &[Shape], p: Point, ignore: Option<usize>, tolerance: f64) -> Point {
    let mut best = p;
    let mut best_dist = tolerance;
    for (i, shape) in shapes.iter().enumerate() {
        if Some(i) == ignore {
            continue;
        }
        for feature in shape.feature_points() {
            let d = p.distance(feature);
            if d < best_dist {
                best_dist = d;
                best = feature;
            }
        }
    }
    best
}

/// Which handle of `shape` (if any) lies within `radius` of `p`.
///
/// For segments the start wins when it is at least as close as the end.
#[must_use]
pub fn handle_at(shape: &Shape, p: Point, radius: f64) -> Option<Handle> {
    match shape {
        Shape::Line(s) | Shape::Arrow(s) => {
            let d_start = p.distance(s.start);
            let d_end = p.distance(s.end);
            if d_start < radius && d_start <= d_end {
                Some(Handle::LineStart)
            } else if d_end < radius {
                Some(Handle::LineEnd)
            } else {
                None
            }
        }
        Shape::Circle(c) => (p.distance(c.center) < radius).then_some(Handle::CircleCenter),
        _ => None,
    }
}

/// World positions of the handles drawn for a selected shape.
#[must_use]
pub fn handle_points(shape: &Shape) -> Vec<Point> {
    match shape {
        Shape::Line(s) | Shape::Arrow(s) => vec![s.start, s.end],
        Shape::Circle(c) => vec![c.center],
        _ => Vec::new(),
    }
}

/// Move `handle` of `shape` to `p`. Returns `false` when the handle does not
/// belong to this kind of shape.
pub fn move_handle(shape: &mut Shape, handle: Handle, p: Point) -> bool {
    match (shape, handle) {
        (Shape::Line(s) | Shape::Arrow(s), Handle::LineStart) => s.start = p,
        (Shape::Line(s) | Shape::Arrow(s), Handle::LineEnd) => s.end = p,
        (Shape::Circle(c), Handle::CircleCenter) => c.center = p,
        _ => return false,
    }
    true
}
