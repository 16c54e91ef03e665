//! Preview hover to editor highlight.
//!
//! The host forwards `mouseover`/`mouseout` on elements carrying
//! `data-start`/`data-end`; the controller converts the span against the full
//! document and drives a [`HighlightSink`] (the code editor's decorations).

#[cfg(test)]
#[path = "hover_test.rs"]
mod hover_test;

use crate::span::{EditorRange, SourceSpan};

/// Receiver of highlight changes, implemented by the code editor binding.
pub trait HighlightSink {
    /// Replace any current highlight with `range`.
    fn highlight(&mut self, range: EditorRange);
    fn clear(&mut self);
}

/// Parse a pair of `data-start`/`data-end` attribute values.
#[must_use]
pub fn parse_span_attrs(start: Option<&str>, end: Option<&str>) -> Option<SourceSpan> {
    let start = start?.trim().parse::<usize>();
    let end = end?.trim().parse::<usize>();
    match (start, end) {
        (Ok(start), Ok(end)) if start <= end => Some(SourceSpan::new(start, end)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct HoverController {
    text: String,
    active: Option<SourceSpan>,
}

impl HoverController {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), active: None }
    }

    /// Swap in a new document. A highlight from the old text is cleared.
    pub fn set_document(&mut self, text: impl Into<String>, sink: &mut dyn HighlightSink) {
        self.text = text.into();
        self.out(sink);
    }

    #[must_use]
    pub fn document(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn active(&self) -> Option<SourceSpan> {
        self.active
    }

    /// Pointer entered an element tagged with `span`. Returns whether a
    /// highlight was applied; spans outside the document are ignored.
    pub fn over(&mut self, span: SourceSpan, sink: &mut dyn HighlightSink) -> bool {
        match EditorRange::from_span(&self.text, span) {
            Ok(range) => {
                sink.highlight(range);
                self.active = Some(span);
                true
            }
            Err(err) => {
                tracing::debug!(%err, "hover span ignored");
                false
            }
        }
    }

    /// Pointer left a tagged element.
    pub fn out(&mut self, sink: &mut dyn HighlightSink) {
        if self.active.take().is_some() {
            sink.clear();
        }
    }
}
