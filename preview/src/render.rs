//! Markup to HTML.
//!
//! Turns the token stream into escaped HTML in which every macro and diagram
//! element carries `class="src" data-start data-end` attributes. Math is left
//! as literal delimited text for the math typesetter; its spans are returned
//! separately so the host can attach them to the typeset elements afterwards,
//! in document order.
//!
//! Diagram frames are left empty here and filled by the host (sandbox frames
//! in the browser, inline SVG from the command line).

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::display::{self, DisplayConfig, DisplayConfigStore, DisplaySettings};
use crate::error::PreviewError;
use crate::span::{self, SourceSpan, SpanKind, TaggedSpan};
use crate::tokenizer::{self, Token, TokenKind};

/// One `tikzpicture` block found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramBlock {
    /// Content id, `tikz-<hash>`.
    pub id: String,
    pub span: SourceSpan,
    /// The full environment text, delimiters included.
    pub source: String,
    pub settings: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HtmlPart {
    Markup(String),
    /// Content slot of the frame for `diagrams[i]`.
    Frame(usize),
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    parts: Vec<HtmlPart>,
    /// Math spans in document order.
    pub math: Vec<TaggedSpan>,
    /// Macro and diagram spans in document order.
    pub elements: Vec<TaggedSpan>,
    pub diagrams: Vec<DiagramBlock>,
}

impl RenderedPreview {
    /// HTML with empty diagram frames.
    #[must_use]
    pub fn html(&self) -> String {
        self.html_with(|_| String::new())
    }

    /// HTML with each diagram frame filled by `frame`.
    pub fn html_with(&self, frame: impl Fn(&DiagramBlock) -> String) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                HtmlPart::Markup(markup) => out.push_str(markup),
                HtmlPart::Frame(i) => {
                    if let Some(block) = self.diagrams.get(*i) {
                        out.push_str(&frame(block));
                    }
                }
            }
        }
        out
    }

    /// Every recorded span, ordered by start offset.
    #[must_use]
    pub fn all_spans(&self) -> Vec<&TaggedSpan> {
        let mut spans: Vec<&TaggedSpan> = self.math.iter().chain(&self.elements).collect();
        spans.sort_by_key(|t| (t.span.start, t.span.end));
        spans
    }
}

/// Render the document `text`.
///
/// # Errors
///
/// Returns an error if a recorded span fails validation against `text`.
pub fn render_document(text: &str, store: &dyn DisplayConfigStore) -> Result<RenderedPreview, PreviewError> {
    let body = tokenizer::document_body(text);
    let tokens = tokenizer::tokenize(text, body);

    let mut builder = Builder {
        text,
        store,
        buf: String::new(),
        out: RenderedPreview { parts: Vec::new(), math: Vec::new(), elements: Vec::new(), diagrams: Vec::new() },
    };
    builder.emit(&tokens)?;
    let out = builder.finish();

    span::validate(text, &out.math)?;
    span::validate(text, &out.elements)?;
    tracing::debug!(
        math = out.math.len(),
        elements = out.elements.len(),
        diagrams = out.diagrams.len(),
        "preview rendered"
    );
    Ok(out)
}

/// Rendered HTML, or the single error element if rendering failed.
pub fn render_or_error_html(text: &str, store: &dyn DisplayConfigStore) -> String {
    match render_document(text, store) {
        Ok(rendered) => rendered.html(),
        Err(err) => {
            tracing::warn!(%err, "preview render failed");
            error_html(&err)
        }
    }
}

#[must_use]
pub fn error_html(err: &PreviewError) -> String {
    format!(r#"<div class="error">Error: {}</div>"#, escape_html(&err.to_string()))
}

#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Settings from a config comment on the line directly above `start`, when
/// nothing but whitespace precedes `start` on its own line.
fn comment_above(text: &str, start: usize) -> Option<DisplayConfig> {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    if !text[line_start..start].trim().is_empty() {
        return None;
    }
    let prev_end = line_start.checked_sub(1)?;
    let prev_start = text[..prev_end].rfind('\n').map_or(0, |i| i + 1);
    display::parse_config_comment(&text[prev_start..prev_end])
}

struct Builder<'a> {
    text: &'a str,
    store: &'a dyn DisplayConfigStore,
    buf: String,
    out: RenderedPreview,
}

impl<'a> Builder<'a> {
    fn slice(&self, span: SourceSpan) -> Result<&'a str, PreviewError> {
        span.slice(self.text).ok_or(PreviewError::SpanOutOfRange {
            start: span.start,
            end: span.end,
            len: self.text.len(),
        })
    }

    fn tagged(&self, kind: SpanKind, span: SourceSpan) -> Result<TaggedSpan, PreviewError> {
        Ok(TaggedSpan { kind, span, text: self.slice(span)?.to_owned() })
    }

    fn emit(&mut self, tokens: &[Token]) -> Result<(), PreviewError> {
        for token in tokens {
            match token.kind {
                TokenKind::Text => {
                    let text = self.slice(token.span)?;
                    self.buf.push_str(&escape_html(text));
                }
                TokenKind::ConfigComment => {}
                TokenKind::Math(delim) => {
                    let tagged = self.tagged(delim.span_kind(), token.span)?;
                    self.buf.push_str(&escape_html(&tagged.text));
                    self.out.math.push(tagged);
                }
                TokenKind::Macro(kind) => {
                    let tag = kind.html_tag();
                    let tagged = self.tagged(kind.span_kind(), token.span)?;
                    self.out.elements.push(tagged);
                    self.buf.push_str(&format!(
                        r#"<{tag} class="src" data-start="{}" data-end="{}">"#,
                        token.span.start, token.span.end
                    ));
                    self.emit(&token.children)?;
                    self.buf.push_str(&format!("</{tag}>"));
                }
                TokenKind::Diagram => self.diagram(token.span)?,
            }
        }
        Ok(())
    }

    fn diagram(&mut self, span: SourceSpan) -> Result<(), PreviewError> {
        let tagged = self.tagged(SpanKind::Diagram, span)?;
        let id = display::diagram_id(&tagged.text);
        let saved = self.store.load(&id);
        let settings = display::resolve(comment_above(self.text, span.start).as_ref(), saved.as_ref());

        let height = settings.height.map(|h| format!(r#" style="height:{h}px""#)).unwrap_or_default();
        self.buf.push_str(&format!(
            r#"<div class="tikz-card" data-id="{id}" data-start="{}" data-end="{}" style="{}"><div id="{id}" class="tikz-frame"{height}>"#,
            span.start,
            span.end,
            settings.card_style()
        ));
        self.out.parts.push(HtmlPart::Markup(std::mem::take(&mut self.buf)));
        self.out.parts.push(HtmlPart::Frame(self.out.diagrams.len()));
        self.buf.push_str("</div></div>");

        self.out.diagrams.push(DiagramBlock { id, span, source: tagged.text.clone(), settings });
        self.out.elements.push(tagged);
        Ok(())
    }

    fn finish(mut self) -> RenderedPreview {
        if !self.buf.is_empty() {
            self.out.parts.push(HtmlPart::Markup(self.buf));
        }
        self.out
    }
}
