//! TikZ dialect: code generation and the matching parser.
//!
//! Generated code wraps one command per line in a `tikzpicture` environment
//! with `scale=0.1`. World coordinates are divided by [`UNIT_FACTOR`] and
//! printed with two decimals:
//!
//! ```text
//! \begin{tikzpicture}[scale=0.1]
//!   \draw (1.00,1.00) -- (5.00,1.00);
//!   \draw[->,thick] (1.00,1.00) -- (5.00,4.00);
//!   \draw (1.00,1.00) rectangle +(4.00,3.00);
//!   \draw (2.00,2.00) circle (1.50);
//!   \node at (3.00,3.00) {label};
//!   \node[draw] at (3.00,3.00) {boxed};
//! \end{tikzpicture}
//! ```
//!
//! The parser accepts exactly these forms (plus an absolute
//! `rectangle (x,y)` corner) and skips commands it does not model.

#[cfg(test)]
#[path = "dialect_test.rs"]
mod dialect_test;

use crate::camera::Point;
use crate::consts::UNIT_FACTOR;
use crate::doc::{Circle, Label, Rect, Segment, Shape, Style};

pub const BEGIN: &str = "\\begin{tikzpicture}[scale=0.1]";
pub const END: &str = "\\end{tikzpicture}";

/// Errors from parsing TikZ source. Line numbers are 1-based.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DialectError {
    #[error("line {line}: malformed coordinate `{text}`")]
    Coordinate { line: usize, text: String },
    #[error("line {line}: invalid number `{text}`")]
    Number { line: usize, text: String },
    #[error("line {line}: unterminated {what}")]
    Unterminated { line: usize, what: &'static str },
    #[error("line {line}: expected {expected}")]
    Expected { line: usize, expected: &'static str },
}

// =============================================================
// Generation
// =============================================================

/// Render shapes as a complete `tikzpicture` environment.
#[must_use]
pub fn generate(shapes: &[Shape]) -> String {
    let mut out = String::from(BEGIN);
    out.push('\n');
    for shape in shapes {
        out.push_str("  ");
        out.push_str(&command(shape));
        out.push('\n');
    }
    out.push_str(END);
    out
}

/// The single drawing command for one shape.
#[must_use]
pub fn command(shape: &Shape) -> String {
    match shape {
        Shape::Line(seg) => format!("\\draw {} -- {};", coord(seg.start), coord(seg.end)),
        Shape::Arrow(seg) => format!("\\draw[->,thick] {} -- {};", coord(seg.start), coord(seg.end)),
        Shape::Rectangle(r) => {
            format!("\\draw ({},{}) rectangle +({},{});", num(r.x), num(r.y), num(r.width), num(r.height))
        }
        Shape::Circle(c) => format!("\\draw {} circle ({});", coord(c.center), num(c.radius)),
        Shape::Text(l) => format!("\\node at {} {{{}}};", coord(l.at), l.text),
        Shape::Node(l) => format!("\\node[draw] at {} {{{}}};", coord(l.at), l.text),
    }
}

fn coord(p: Point) -> String {
    format!("({},{})", num(p.x), num(p.y))
}

/// A world value in TikZ units with two decimals. Negative zero prints as `0.00`.
#[must_use]
pub fn num(world: f64) -> String {
    let text = format!("{:.2}", world / UNIT_FACTOR);
    if text == "-0.00" { "0.00".to_owned() } else { text }
}

// =============================================================
// Parsing
// =============================================================

/// Parse TikZ source back into shapes.
///
/// Accepts a full environment or bare commands. Blank lines, `%` comments,
/// environment delimiters, and commands that are not one of the generated
/// forms are skipped.
///
/// # Errors
///
/// Returns a [`DialectError`] when a recognized command is malformed.
pub fn parse(source: &str) -> Result<Vec<Shape>, DialectError> {
    let mut shapes = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('%') || text.starts_with("\\begin{") || text.starts_with("\\end{") {
            continue;
        }
        let parsed = if let Some(rest) = text.strip_prefix("\\draw") {
            parse_draw(rest, line)?
        } else if let Some(rest) = text.strip_prefix("\\node") {
            Some(parse_node(rest, line)?)
        } else {
            None
        };
        match parsed {
            Some(shape) => shapes.push(shape),
            None => tracing::debug!(line, command = text, "skipping unsupported tikz command"),
        }
    }
    Ok(shapes)
}

/// A forward-only reader over one command line.
struct Cursor<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a str, line: usize) -> Self {
        Self { rest: rest.trim_start(), line }
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(after) => {
                self.rest = after.trim_start();
                true
            }
            None => false,
        }
    }

    /// Optional `[...]` block. Returns its contents.
    fn options(&mut self) -> Result<Option<&'a str>, DialectError> {
        if !self.rest.starts_with('[') {
            return Ok(None);
        }
        let Some(close) = self.rest.find(']') else {
            return Err(DialectError::Unterminated { line: self.line, what: "option list" });
        };
        let inner = &self.rest[1..close];
        self.rest = self.rest[close + 1..].trim_start();
        Ok(Some(inner))
    }

    /// Parenthesized group `( ... )`. Returns its contents.
    fn group(&mut self) -> Result<&'a str, DialectError> {
        if !self.rest.starts_with('(') {
            return Err(DialectError::Expected { line: self.line, expected: "`(`" });
        }
        let Some(close) = self.rest.find(')') else {
            return Err(DialectError::Unterminated { line: self.line, what: "coordinate" });
        };
        let inner = &self.rest[1..close];
        self.rest = self.rest[close + 1..].trim_start();
        Ok(inner)
    }

    fn point(&mut self) -> Result<Point, DialectError> {
        let inner = self.group()?;
        let Some((x, y)) = inner.split_once(',') else {
            return Err(DialectError::Coordinate { line: self.line, text: format!("({inner})") });
        };
        Ok(Point::new(self.number(x)?, self.number(y)?))
    }

    fn number(&self, text: &str) -> Result<f64, DialectError> {
        let trimmed = text.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v * UNIT_FACTOR),
            _ => Err(DialectError::Number { line: self.line, text: trimmed.to_owned() }),
        }
    }
}

fn parse_draw(rest: &str, line: usize) -> Result<Option<Shape>, DialectError> {
    let mut cur = Cursor::new(rest, line);
    let arrow = cur.options()?.is_some_and(|opts| opts.split(',').any(|o| o.trim() == "->"));
    if !cur.rest.starts_with('(') {
        return Ok(None);
    }
    let start = cur.point()?;
    let style = Style::default();

    if cur.eat("--") {
        let end = cur.point()?;
        let segment = Segment { start, end, style };
        return Ok(Some(if arrow { Shape::Arrow(segment) } else { Shape::Line(segment) }));
    }
    if cur.eat("rectangle") {
        let (width, height) = if cur.eat("+") {
            let extent = cur.point()?;
            (extent.x, extent.y)
        } else {
            let corner = cur.point()?;
            (corner.x - start.x, corner.y - start.y)
        };
        return Ok(Some(Shape::Rectangle(Rect { x: start.x, y: start.y, width, height, style, fill: None })));
    }
    if cur.eat("circle") {
        let inner = cur.group()?;
        let radius = cur.number(inner.trim_end_matches("cm"))?;
        return Ok(Some(Shape::Circle(Circle { center: start, radius, style, fill: None })));
    }
    Ok(None)
}

fn parse_node(rest: &str, line: usize) -> Result<Shape, DialectError> {
    let mut cur = Cursor::new(rest, line);
    let boxed = cur.options()?.is_some_and(|opts| opts.split(',').any(|o| o.trim() == "draw"));
    if !cur.eat("at") {
        return Err(DialectError::Expected { line, expected: "`at`" });
    }
    let at = cur.point()?;
    let body = cur.rest.trim_end().trim_end_matches(';').trim_end();
    let Some(text) = body.strip_prefix('{') else {
        return Err(DialectError::Expected { line, expected: "`{`" });
    };
    let Some(text) = text.strip_suffix('}') else {
        return Err(DialectError::Unterminated { line, what: "node text" });
    };
    let label = Label { at, text: text.to_owned(), style: Style::default() };
    Ok(if boxed { Shape::Node(label) } else { Shape::Text(label) })
}
