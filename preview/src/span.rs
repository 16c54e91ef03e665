//! Source spans: byte ranges into the raw document text.
//!
//! Every element the preview tags with `data-start`/`data-end` carries one of
//! these. Offsets always index the full, unmodified document (not the body
//! slice and never the generated HTML), so slicing the document with a span
//! yields exactly the text that was matched.

#[cfg(test)]
#[path = "span_test.rs"]
mod span_test;

use serde::Serialize;

use crate::error::PreviewError;

/// Half-open `[start, end)` byte range into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered text, or `None` if the span is reversed, out of range, or
    /// splits a character.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// What a span was matched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    /// `$$ ... $$`
    DisplayMath,
    /// `\[ ... \]`
    BracketMath,
    /// `\( ... \)`
    ParenMath,
    /// `$ ... $`
    InlineMath,
    Section,
    Subsection,
    Bold,
    Italic,
    /// A `tikzpicture` environment.
    Diagram,
}

impl SpanKind {
    #[must_use]
    pub fn is_math(self) -> bool {
        matches!(self, Self::DisplayMath | Self::BracketMath | Self::ParenMath | Self::InlineMath)
    }
}

/// A span together with the literal text it was matched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedSpan {
    pub kind: SpanKind,
    #[serde(flatten)]
    pub span: SourceSpan,
    pub text: String,
}

/// Check that every span still slices `text` to its recorded literal.
///
/// # Errors
///
/// Returns the first span that is out of range or no longer matches.
pub fn validate(text: &str, spans: &[TaggedSpan]) -> Result<(), PreviewError> {
    for tagged in spans {
        let SourceSpan { start, end } = tagged.span;
        match tagged.span.slice(text) {
            Some(slice) if slice == tagged.text => {}
            Some(_) => return Err(PreviewError::SpanMismatch { start, end }),
            None => return Err(PreviewError::SpanOutOfRange { start, end, len: text.len() }),
        }
    }
    Ok(())
}

/// 1-based line and column as a code editor counts them.
///
/// Columns are UTF-16 code units, matching browser editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Position of byte `offset` in `text`. Offsets past the end clamp to the end;
/// offsets inside a character round down to its start.
#[must_use]
pub fn line_col(text: &str, offset: usize) -> LineCol {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let prefix = &text[..offset];
    let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
    LineCol {
        line: prefix.matches('\n').count() + 1,
        column: prefix[line_start..].encode_utf16().count() + 1,
    }
}

/// Editor highlight range; field names follow the editor's range object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRange {
    pub start_line_number: usize,
    pub start_column: usize,
    pub end_line_number: usize,
    pub end_column: usize,
}

impl EditorRange {
    /// Convert `span` against the full document `text`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::SpanOutOfRange`] for a reversed span or one
    /// that ends past the document.
    pub fn from_span(text: &str, span: SourceSpan) -> Result<Self, PreviewError> {
        if span.start > span.end || span.end > text.len() {
            return Err(PreviewError::SpanOutOfRange { start: span.start, end: span.end, len: text.len() });
        }
        let start = line_col(text, span.start);
        let end = line_col(text, span.end);
        Ok(Self {
            start_line_number: start.line,
            start_column: start.column,
            end_line_number: end.line,
            end_column: end.column,
        })
    }
}
