//! Per-diagram display settings.
//!
//! Settings come from, in order: a config comment on the line directly above
//! the diagram, settings persisted under the diagram's content id, defaults.
//! The id is a hash of the diagram's own source, so moving a block keeps its
//! settings and editing it drops them.

#[cfg(test)]
#[path = "display_test.rs"]
mod display_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PreviewError;

pub const MIN_WIDTH_PERCENT: u32 = 20;
pub const MAX_WIDTH_PERCENT: u32 = 100;
pub const DEFAULT_WIDTH_PERCENT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Inline,
    Center,
    Left,
    Right,
}

impl Align {
    /// Case-insensitive name lookup.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "inline" => Some(Self::Inline),
            "center" => Some(Self::Center),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Inline CSS placing the diagram card.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Inline => "display:inline-block;",
            Self::Center => "display:block;margin-left:auto;margin-right:auto;",
            Self::Left => "display:block;margin-left:0;margin-right:auto;",
            Self::Right => "display:block;margin-left:auto;margin-right:0;",
        }
    }
}

/// Partial settings, as written in a config comment or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Fully resolved settings for one diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplaySettings {
    /// Card width in percent of the preview, within `[20, 100]`.
    pub width: u32,
    pub align: Align,
    /// Fixed frame height in pixels; skips size polling.
    pub height: Option<u32>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { width: DEFAULT_WIDTH_PERCENT, align: Align::Inline, height: None }
    }
}

impl DisplaySettings {
    #[must_use]
    pub fn card_style(&self) -> String {
        format!("width:{}%;{}", self.width, self.align.css())
    }
}

#[must_use]
pub fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_WIDTH_PERCENT, MAX_WIDTH_PERCENT)
}

/// Parse `% tikz-preview: width=60, align=center` (or `tikz-layout`).
///
/// Returns `None` unless the line is a config comment with a non-empty
/// key list. Unknown keys and invalid values are skipped.
#[must_use]
pub fn parse_config_comment(line: &str) -> Option<DisplayConfig> {
    let body = line.trim().strip_prefix('%')?.trim_start();
    let rest = ["tikz-preview", "tikz-layout"].iter().find_map(|tag| {
        let head = body.get(..tag.len())?;
        head.eq_ignore_ascii_case(tag).then(|| &body[tag.len()..])
    })?;
    let pairs = rest.trim_start().strip_prefix(':')?.trim();
    if pairs.is_empty() {
        return None;
    }

    let mut config = DisplayConfig::default();
    for pair in pairs.split(',') {
        let mut parts = pair.split('=');
        let key = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let value = parts.next().unwrap_or_default().trim();
        match key.as_str() {
            "width" => {
                if let Some(n) = leading_int(&value.replace('%', "")) {
                    config.width = Some(clamp_width(u32::try_from(n.max(0)).unwrap_or(MAX_WIDTH_PERCENT)));
                }
            }
            "align" => {
                if let Some(align) = Align::from_name(value) {
                    config.align = Some(align);
                }
            }
            "height" => {
                if let Some(n) = leading_int(value).filter(|n| *n > 0) {
                    config.height = Some(u32::try_from(n).unwrap_or(u32::MAX));
                }
            }
            "" => {}
            other => tracing::debug!(key = other, "unknown diagram config key"),
        }
    }
    Some(config)
}

/// Leading optionally-signed decimal integer, ignoring trailing text.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = digits[..len].bytes().fold(0_i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -value } else { value })
}

/// Merge comment settings over persisted ones over defaults.
#[must_use]
pub fn resolve(comment: Option<&DisplayConfig>, saved: Option<&DisplayConfig>) -> DisplaySettings {
    let comment = comment.copied().unwrap_or_default();
    let saved = saved.copied().unwrap_or_default();
    DisplaySettings {
        width: comment.width.or(saved.width.filter(|w| *w > 0)).map_or(DEFAULT_WIDTH_PERCENT, clamp_width),
        align: comment.align.or(saved.align).unwrap_or_default(),
        height: comment.height.or(saved.height).filter(|h| *h > 0),
    }
}

/// Content id of a diagram: `tikz-` followed by the absolute value of the
/// 32-bit `h = 31*h + unit` hash over the source's UTF-16 code units.
#[must_use]
pub fn diagram_id(source: &str) -> String {
    let hash = source.encode_utf16().fold(0_i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    format!("tikz-{}", i64::from(hash).abs())
}

#[must_use]
pub fn storage_key(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}")
}

/// Decode a persisted entry. Malformed JSON is logged and treated as absent.
#[must_use]
pub fn decode_stored(id: &str, raw: &str) -> Option<DisplayConfig> {
    match serde_json::from_str(raw) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(id, %err, "ignoring malformed diagram config");
            None
        }
    }
}

/// Where per-diagram settings persist between sessions.
pub trait DisplayConfigStore {
    fn load(&self, id: &str) -> Option<DisplayConfig>;

    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write.
    fn save(&mut self, id: &str, config: &DisplayConfig) -> Result<(), PreviewError>;
}

/// In-memory store, used natively and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: HashMap<String, DisplayConfig>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object mapping diagram ids to settings.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, PreviewError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DisplayConfigStore for MemoryStore {
    fn load(&self, id: &str) -> Option<DisplayConfig> {
        self.entries.get(id).copied()
    }

    fn save(&mut self, id: &str, config: &DisplayConfig) -> Result<(), PreviewError> {
        self.entries.insert(id.to_owned(), *config);
        Ok(())
    }
}
