//! Physics presets: ready-made shape groups laid out relative to the canvas.

#[cfg(test)]
#[path = "templates_test.rs"]
mod templates_test;

use crate::camera::Point;
use crate::doc::{Circle, Rect, Segment, Shape, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Solid ground bar across the canvas.
    SurfaceSolid,
    /// Water surface drawn as a sine polyline.
    SurfaceWater,
    /// Zig-zag spring.
    Spring,
    /// Two fixed pulleys joined by a beam.
    PulleyFixed,
    /// Fixed and movable pulley on one axle line.
    PulleyMovable,
    /// Balloon on a string.
    Balloon,
}

impl Template {
    pub const ALL: [Template; 6] = [
        Self::SurfaceSolid,
        Self::SurfaceWater,
        Self::Spring,
        Self::PulleyFixed,
        Self::PulleyMovable,
        Self::Balloon,
    ];

    /// Parse a template picker value such as `"pulley-fixed"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SurfaceSolid => "surface-solid",
            Self::SurfaceWater => "surface-water",
            Self::Spring => "spring",
            Self::PulleyFixed => "pulley-fixed",
            Self::PulleyMovable => "pulley-movable",
            Self::Balloon => "balloon",
        }
    }

    /// Shapes for this preset on a `width` x `height` canvas.
    #[must_use]
    pub fn shapes(self, width: f64, height: f64) -> Vec<Shape> {
        let (cx, cy) = (width / 2.0, height / 2.0);
        match self {
            Self::SurfaceSolid => vec![Shape::Rectangle(Rect {
                x: 20.0,
                y: cy + 40.0,
                width: width - 40.0,
                height: 8.0,
                style: style("#666", 2.0),
                fill: Some("#666".to_owned()),
            })],
            Self::SurfaceWater => {
                const STEP: f64 = 40.0;
                const AMPLITUDE: f64 = 6.0;
                let y = cy + 40.0;
                let mut points = Vec::new();
                let mut x = 20.0;
                while x < width - 20.0 {
                    points.push(Point::new(x, y + (x / 10.0).sin() * AMPLITUDE));
                    x += STEP;
                }
                polyline(&points, "#1e90ff", 2.0)
            }
            Self::Spring => {
                const TURNS: u32 = 10;
                const PITCH: f64 = 10.0;
                const AMPLITUDE: f64 = 10.0;
                let origin = Point::new(100.0, cy);
                let mut points = vec![origin];
                for i in 1..=TURNS {
                    let offset = if i % 2 == 1 { AMPLITUDE } else { -AMPLITUDE };
                    points.push(Point::new(origin.x + f64::from(i) * PITCH, origin.y + offset));
                }
                polyline(&points, "#888", 2.0)
            }
            Self::PulleyFixed => vec![
                pulley(Point::new(cx - 40.0, cy - 20.0), 20.0),
                pulley(Point::new(cx + 40.0, cy - 20.0), 20.0),
                segment(Point::new(cx - 40.0, cy - 40.0), Point::new(cx + 40.0, cy - 40.0), "#444", 3.0),
            ],
            Self::PulleyMovable => vec![
                pulley(Point::new(cx, cy - 20.0), 22.0),
                pulley(Point::new(cx, cy + 60.0), 22.0),
                segment(Point::new(cx, cy - 42.0), Point::new(cx, cy + 38.0), "#444", 3.0),
            ],
            Self::Balloon => vec![
                Shape::Circle(Circle {
                    center: Point::new(cx, cy),
                    radius: 30.0,
                    style: style("#ff4d4f", 2.0),
                    fill: Some("#ff6b6d".to_owned()),
                }),
                segment(Point::new(cx, cy + 30.0), Point::new(cx, cy + 80.0), "#ff6b6d", 2.0),
            ],
        }
    }
}

fn style(stroke: &str, stroke_width: f64) -> Style {
    Style { stroke: stroke.to_owned(), stroke_width }
}

fn segment(start: Point, end: Point, stroke: &str, width: f64) -> Shape {
    Shape::Line(Segment { start, end, style: style(stroke, width) })
}

fn polyline(points: &[Point], stroke: &str, width: f64) -> Vec<Shape> {
    points.windows(2).map(|w| segment(w[0], w[1], stroke, width)).collect()
}

fn pulley(center: Point, radius: f64) -> Shape {
    Shape::Circle(Circle { center, radius, style: style("#444", 2.0), fill: Some("#eee".to_owned()) })
}
