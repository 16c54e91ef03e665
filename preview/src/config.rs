//! Preview tuning knobs.
//!
//! The browser host passes these as JSON; native tools read them from
//! `LECTUREPAD_*` environment variables. Missing or unparsable values fall
//! back to the defaults below.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;

use serde::{Deserialize, Serialize};

use crate::error::PreviewError;

pub const DEFAULT_DEBOUNCE_MS: u32 = 300;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 300;
pub const DEFAULT_POLL_WINDOW_MS: u32 = 5000;
pub const DEFAULT_MIN_FRAME_HEIGHT: u32 = 150;
pub const DEFAULT_STORAGE_PREFIX: &str = "tikz_cfg_";
pub const DEFAULT_TIKZ_SCRIPT_URL: &str = "https://tikzjax.com/v1/tikzjax.js";
pub const DEFAULT_TIKZ_FONTS_URL: &str = "https://tikzjax.com/v1/fonts.css";
/// Largest rendered diagram edge inside a sandbox frame, in CSS pixels.
pub const DEFAULT_MAX_DIAGRAM_PX: u32 = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period before a content change triggers a re-render.
    pub debounce_ms: u32,
    /// How often a sandbox frame is re-measured after load.
    pub poll_interval_ms: u32,
    /// How long re-measuring continues before the frame keeps its last size.
    pub poll_window_ms: u32,
    /// Frames never shrink below this height.
    pub min_frame_height: u32,
    /// Browser storage key prefix for persisted diagram display settings.
    pub storage_prefix: String,
    pub tikz_script_url: String,
    pub tikz_fonts_url: String,
    pub max_diagram_px: u32,
    /// Try the built-in SVG renderer before falling back to a sandbox frame.
    pub native_diagrams: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_window_ms: DEFAULT_POLL_WINDOW_MS,
            min_frame_height: DEFAULT_MIN_FRAME_HEIGHT,
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_owned(),
            tikz_script_url: DEFAULT_TIKZ_SCRIPT_URL.to_owned(),
            tikz_fonts_url: DEFAULT_TIKZ_FONTS_URL.to_owned(),
            max_diagram_px: DEFAULT_MAX_DIAGRAM_PX,
            native_diagrams: false,
        }
    }
}

impl PreviewConfig {
    /// Load from `LECTUREPAD_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(err) => {
                tracing::warn!(key, %err, "ignoring environment variable");
                None
            }
        })
    }

    /// Load through an arbitrary key lookup. Keys are the `LECTUREPAD_*` names.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str, default: u32| lookup(key).and_then(|v| parse_u32(key, &v)).unwrap_or(default);
        let text = |key: &str, default: String| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default);

        Self {
            debounce_ms: parse("LECTUREPAD_DEBOUNCE_MS", defaults.debounce_ms),
            poll_interval_ms: parse("LECTUREPAD_POLL_INTERVAL_MS", defaults.poll_interval_ms).max(1),
            poll_window_ms: parse("LECTUREPAD_POLL_WINDOW_MS", defaults.poll_window_ms),
            min_frame_height: parse("LECTUREPAD_MIN_FRAME_HEIGHT", defaults.min_frame_height),
            storage_prefix: text("LECTUREPAD_STORAGE_PREFIX", defaults.storage_prefix),
            tikz_script_url: text("LECTUREPAD_TIKZ_SCRIPT_URL", defaults.tikz_script_url),
            tikz_fonts_url: text("LECTUREPAD_TIKZ_FONTS_URL", defaults.tikz_fonts_url),
            max_diagram_px: parse("LECTUREPAD_MAX_DIAGRAM_PX", defaults.max_diagram_px),
            native_diagrams: lookup("LECTUREPAD_NATIVE_DIAGRAMS")
                .map_or(defaults.native_diagrams, |v| matches!(v.trim(), "1" | "true" | "yes")),
        }
    }

    /// Parse the host's JSON config. Absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Json`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, PreviewError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.poll_interval_ms = config.poll_interval_ms.max(1);
        Ok(config)
    }
}

/// A numeric setting. Unparseable values are logged and ignored.
fn parse_u32(key: &str, value: &str) -> Option<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(err) => {
            tracing::warn!(key, value, %err, "ignoring invalid setting; using default");
            None
        }
    }
}
