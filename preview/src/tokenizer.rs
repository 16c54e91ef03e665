//! Single-pass markup tokenizer.
//!
//! Walks the document body once, left to right, and emits `(kind, span,
//! inner)` records. Spans are absolute byte offsets into the full document,
//! correct by construction: nothing is re-located after the fact.
//!
//! At each position the first matching rule wins, in this order:
//!
//! 1. `\begin{tikzpicture} ... \end{tikzpicture}`
//! 2. `\[ ... \]`, `\( ... \)`
//! 3. `\section{..}`, `\subsection{..}`, `\textbf{..}`, `\textit{..}`
//! 4. `$$ ... $$`, then bare `$ ... $` (single line, non-empty, not touching
//!    another `$`)
//! 5. `% tikz-preview: ...` / `% tikz-layout: ...` at the start of a line
//!
//! Unterminated constructs are not errors; their opening characters are
//! emitted as plain text. A backslash before `$` or `\` makes the pair literal,
//! and inside a math body a backslash escapes whatever follows it.

#[cfg(test)]
#[path = "tokenizer_test.rs"]
mod tokenizer_test;

use crate::span::{SourceSpan, SpanKind};

pub const DOCUMENT_BEGIN: &str = "\\begin{document}";
pub const DOCUMENT_END: &str = "\\end{document}";
pub const DIAGRAM_BEGIN: &str = "\\begin{tikzpicture}";
pub const DIAGRAM_END: &str = "\\end{tikzpicture}";

const CONFIG_COMMENT_TAGS: [&str; 2] = ["tikz-preview", "tikz-layout"];

/// Math delimiter pairs, in match priority order within their lead character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathDelim {
    Display,
    Bracket,
    Paren,
    Inline,
}

impl MathDelim {
    #[must_use]
    pub fn open(self) -> &'static str {
        match self {
            Self::Display => "$$",
            Self::Bracket => "\\[",
            Self::Paren => "\\(",
            Self::Inline => "$",
        }
    }

    #[must_use]
    pub fn close(self) -> &'static str {
        match self {
            Self::Display => "$$",
            Self::Bracket => "\\]",
            Self::Paren => "\\)",
            Self::Inline => "$",
        }
    }

    #[must_use]
    pub fn span_kind(self) -> SpanKind {
        match self {
            Self::Display => SpanKind::DisplayMath,
            Self::Bracket => SpanKind::BracketMath,
            Self::Paren => SpanKind::ParenMath,
            Self::Inline => SpanKind::InlineMath,
        }
    }
}

/// The fixed macro set the preview understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    Section,
    Subsection,
    Bold,
    Italic,
}

impl MacroKind {
    pub const ALL: [MacroKind; 4] = [Self::Section, Self::Subsection, Self::Bold, Self::Italic];

    /// Command text up to and including the opening brace.
    #[must_use]
    pub fn command(self) -> &'static str {
        match self {
            Self::Section => "\\section{",
            Self::Subsection => "\\subsection{",
            Self::Bold => "\\textbf{",
            Self::Italic => "\\textit{",
        }
    }

    #[must_use]
    pub fn html_tag(self) -> &'static str {
        match self {
            Self::Section => "h2",
            Self::Subsection => "h3",
            Self::Bold => "strong",
            Self::Italic => "em",
        }
    }

    #[must_use]
    pub fn span_kind(self) -> SpanKind {
        match self {
            Self::Section => SpanKind::Section,
            Self::Subsection => SpanKind::Subsection,
            Self::Bold => SpanKind::Bold,
            Self::Italic => SpanKind::Italic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Math(MathDelim),
    Macro(MacroKind),
    Diagram,
    ConfigComment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Full match, delimiters included.
    pub span: SourceSpan,
    /// Payload: the macro argument or math body. Same as `span` for text,
    /// diagrams and config comments.
    pub inner: SourceSpan,
    /// Tokens inside a macro argument.
    pub children: Vec<Token>,
}

impl Token {
    fn leaf(kind: TokenKind, span: SourceSpan, inner: SourceSpan) -> Self {
        Self { kind, span, inner, children: Vec::new() }
    }
}

/// The document body: the text between `\begin{document}` and the first
/// following `\end{document}`, or the whole text if either is missing.
#[must_use]
pub fn document_body(text: &str) -> SourceSpan {
    if let Some(begin) = text.find(DOCUMENT_BEGIN) {
        let start = begin + DOCUMENT_BEGIN.len();
        if let Some(len) = text[start..].find(DOCUMENT_END) {
            return SourceSpan::new(start, start + len);
        }
    }
    SourceSpan::new(0, text.len())
}

/// Tokenize `range` of `text`. An invalid range yields no tokens.
#[must_use]
pub fn tokenize(text: &str, range: SourceSpan) -> Vec<Token> {
    if range.slice(text).is_none() {
        tracing::warn!(start = range.start, end = range.end, len = text.len(), "tokenize range invalid");
        return Vec::new();
    }
    Scanner { text, start: range.start, end: range.end, pos: range.start, pending: range.start, tokens: Vec::new() }
        .run()
}

/// True for a `% tikz-preview...` or `% tikz-layout...` comment line.
#[must_use]
pub fn is_config_comment(line: &str) -> bool {
    let Some(body) = line.trim_start().strip_prefix('%') else {
        return false;
    };
    let body = body.trim_start();
    CONFIG_COMMENT_TAGS.iter().any(|tag| body.get(..tag.len()).is_some_and(|head| head.eq_ignore_ascii_case(tag)))
}

/// Offset of the first unescaped `close` in `body`. A backslash escapes the
/// character after it. `single_line` stops the search at a newline.
fn find_closer(body: &str, close: &str, single_line: bool) -> Option<usize> {
    let mut i = 0;
    while i < body.len() {
        let rest = &body[i..];
        if rest.starts_with(close) {
            return Some(i);
        }
        let mut chars = rest.chars();
        let ch = chars.next()?;
        if single_line && ch == '\n' {
            return None;
        }
        i += ch.len_utf8();
        if ch == '\\' {
            match chars.next() {
                Some('\n') if single_line => return None,
                Some(next) => i += next.len_utf8(),
                None => {}
            }
        }
    }
    None
}

struct Scanner<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    pos: usize,
    /// Start of the plain-text run not yet emitted.
    pending: usize,
    tokens: Vec<Token>,
}

impl Scanner<'_> {
    fn run(mut self) -> Vec<Token> {
        while self.pos < self.end {
            match self.match_here() {
                Some(token) => {
                    self.flush_text();
                    self.pos = token.span.end;
                    self.pending = self.pos;
                    self.tokens.push(token);
                }
                None => self.pos += self.literal_len(),
            }
        }
        self.flush_text();
        self.tokens
    }

    fn rest(&self) -> &str {
        &self.text[self.pos..self.end]
    }

    fn flush_text(&mut self) {
        if self.pending < self.pos {
            let span = SourceSpan::new(self.pending, self.pos);
            self.tokens.push(Token::leaf(TokenKind::Text, span, span));
        }
    }

    fn literal_len(&self) -> usize {
        let rest = self.rest();
        if rest.starts_with("\\$") || rest.starts_with("\\\\") {
            return 2;
        }
        rest.chars().next().map_or(1, char::len_utf8)
    }

    fn match_here(&self) -> Option<Token> {
        match self.rest().as_bytes().first()? {
            b'\\' => self
                .diagram()
                .or_else(|| self.delimited(MathDelim::Bracket))
                .or_else(|| self.delimited(MathDelim::Paren))
                .or_else(|| self.macro_call()),
            b'$' => self.delimited(MathDelim::Display).or_else(|| self.inline_math()),
            b'%' => self.config_comment(),
            _ => None,
        }
    }

    fn diagram(&self) -> Option<Token> {
        let body = self.rest().strip_prefix(DIAGRAM_BEGIN)?;
        let close = body.find(DIAGRAM_END)?;
        let span = SourceSpan::new(self.pos, self.pos + DIAGRAM_BEGIN.len() + close + DIAGRAM_END.len());
        Some(Token::leaf(TokenKind::Diagram, span, span))
    }

    fn delimited(&self, delim: MathDelim) -> Option<Token> {
        let (open, close) = (delim.open(), delim.close());
        let body = self.rest().strip_prefix(open)?;
        let len = find_closer(body, close, false)?;
        let inner = SourceSpan::new(self.pos + open.len(), self.pos + open.len() + len);
        let span = SourceSpan::new(self.pos, inner.end + close.len());
        Some(Token::leaf(TokenKind::Math(delim), span, inner))
    }

    fn inline_math(&self) -> Option<Token> {
        if self.pos > self.start && self.text.as_bytes()[self.pos - 1] == b'$' {
            return None;
        }
        let body = self.rest().strip_prefix('$')?;
        let len = find_closer(body, "$", true)?;
        if len == 0 || body[len + 1..].starts_with('$') {
            return None;
        }
        let inner = SourceSpan::new(self.pos + 1, self.pos + 1 + len);
        Some(Token::leaf(TokenKind::Math(MathDelim::Inline), SourceSpan::new(self.pos, inner.end + 1), inner))
    }

    fn macro_call(&self) -> Option<Token> {
        let rest = self.rest();
        MacroKind::ALL.into_iter().find_map(|kind| {
            let command = kind.command();
            let arg = rest.strip_prefix(command)?;
            let len = arg.find('}')?;
            if len == 0 {
                return None;
            }
            let inner = SourceSpan::new(self.pos + command.len(), self.pos + command.len() + len);
            Some(Token {
                kind: TokenKind::Macro(kind),
                span: SourceSpan::new(self.pos, inner.end + 1),
                inner,
                children: tokenize(self.text, inner),
            })
        })
    }

    fn config_comment(&self) -> Option<Token> {
        if self.pos > 0 && self.text.as_bytes()[self.pos - 1] != b'\n' {
            return None;
        }
        let rest = self.rest();
        let line = rest.find('\n').map_or(rest, |i| &rest[..i]);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !is_config_comment(line) {
            return None;
        }
        let span = SourceSpan::new(self.pos, self.pos + line.len());
        Some(Token::leaf(TokenKind::ConfigComment, span, span))
    }
}
