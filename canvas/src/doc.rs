//! Shape model: diagram primitives and the ordered store that owns them.
//!
//! Shapes are plain values. The store keeps them in insertion order, which is
//! also draw order and the tie-break order for hit-testing, so nothing here
//! ever reorders the list. Shapes are addressed by index.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Default stroke color for new shapes.
pub const DEFAULT_STROKE: &str = "#000000";

/// Default stroke width for new shapes, in screen pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Stroke attributes shared by every shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// CSS color used for strokes and label text.
    pub stroke: String,
    /// Stroke width in screen pixels; renderers divide by the view scale.
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { stroke: DEFAULT_STROKE.to_owned(), stroke_width: DEFAULT_STROKE_WIDTH }
    }
}

/// Two-point geometry for lines and arrows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub style: Style,
}

/// Rectangle by origin and signed extent. Width and height may be negative
/// when the shape was drawn up or to the left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

impl Rect {
    /// The four corners, starting at the origin and going around.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Anchored text, used by both plain labels and boxed nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub at: Point,
    pub text: String,
    #[serde(default)]
    pub style: Style,
}

/// One diagram primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Line(Segment),
    Arrow(Segment),
    Rectangle(Rect),
    Circle(Circle),
    Text(Label),
    Node(Label),
}

impl Shape {
    /// Lowercase kind name, matching the serialized tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Arrow(_) => "arrow",
            Self::Rectangle(_) => "rectangle",
            Self::Circle(_) => "circle",
            Self::Text(_) => "text",
            Self::Node(_) => "node",
        }
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        match self {
            Self::Line(s) | Self::Arrow(s) => &s.style,
            Self::Rectangle(r) => &r.style,
            Self::Circle(c) => &c.style,
            Self::Text(l) | Self::Node(l) => &l.style,
        }
    }

    /// Fill color for closed shapes; `None` for everything else.
    #[must_use]
    pub fn fill(&self) -> Option<&str> {
        match self {
            Self::Rectangle(r) => r.fill.as_deref(),
            Self::Circle(c) => c.fill.as_deref(),
            _ => None,
        }
    }

    /// A copy of this shape moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        let shift = |p: Point| Point::new(p.x + dx, p.y + dy);
        let mut out = self.clone();
        match &mut out {
            Self::Line(s) | Self::Arrow(s) => {
                s.start = shift(s.start);
                s.end = shift(s.end);
            }
            Self::Rectangle(r) => {
                r.x += dx;
                r.y += dy;
            }
            Self::Circle(c) => c.center = shift(c.center),
            Self::Text(l) | Self::Node(l) => l.at = shift(l.at),
        }
        out
    }

    /// Points other shapes snap to: segment endpoints, rectangle corners,
    /// circle center, label anchor.
    #[must_use]
    pub fn feature_points(&self) -> Vec<Point> {
        match self {
            Self::Line(s) | Self::Arrow(s) => vec![s.start, s.end],
            Self::Rectangle(r) => r.corners().to_vec(),
            Self::Circle(c) => vec![c.center],
            Self::Text(l) | Self::Node(l) => vec![l.at],
        }
    }
}

/// Ordered shape collection for one editing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeStore {
    shapes: Vec<Shape>,
}

impl ShapeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape on top. Returns its index.
    pub fn push(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Remove the shape at `index`, shifting later shapes down.
    pub fn remove(&mut self, index: usize) -> Option<Shape> {
        if index < self.shapes.len() { Some(self.shapes.remove(index)) } else { None }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Replace the whole model, e.g. when restoring a history snapshot.
    pub fn replace(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
    }

    /// Deep copy of the current model.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Shape> {
        self.shapes.clone()
    }

    /// Serialize the model as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.shapes)
    }

    /// Parse a JSON array of shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid shape array.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self { shapes: serde_json::from_str(json)? })
    }
}

impl From<Vec<Shape>> for ShapeStore {
    fn from(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }
}
