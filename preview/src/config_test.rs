use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn defaults_match_constants() {
    let config = PreviewConfig::default();
    assert_eq!(config.debounce_ms, 300);
    assert_eq!(config.poll_interval_ms, 300);
    assert_eq!(config.poll_window_ms, 5000);
    assert_eq!(config.min_frame_height, 150);
    assert_eq!(config.storage_prefix, "tikz_cfg_");
    assert!(!config.native_diagrams);
}

#[test]
fn empty_lookup_is_default() {
    assert_eq!(PreviewConfig::from_lookup(|_| None), PreviewConfig::default());
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn lookup_overrides_values() {
    let config = PreviewConfig::from_lookup(lookup_from(&[
        ("LECTUREPAD_DEBOUNCE_MS", "120"),
        ("LECTUREPAD_STORAGE_PREFIX", "cfg:"),
        ("LECTUREPAD_NATIVE_DIAGRAMS", "true"),
    ]));
    assert_eq!(config.debounce_ms, 120);
    assert_eq!(config.storage_prefix, "cfg:");
    assert!(config.native_diagrams);
    assert_eq!(config.poll_window_ms, DEFAULT_POLL_WINDOW_MS);
}

#[test]
fn lookup_invalid_number_keeps_default() {
    let config = PreviewConfig::from_lookup(lookup_from(&[("LECTUREPAD_MIN_FRAME_HEIGHT", "tall")]));
    assert_eq!(config.min_frame_height, DEFAULT_MIN_FRAME_HEIGHT);
}

#[test]
fn numeric_settings_trim_and_reject_garbage() {
    assert_eq!(parse_u32("LECTUREPAD_DEBOUNCE_MS", " 250 "), Some(250));
    assert_eq!(parse_u32("LECTUREPAD_DEBOUNCE_MS", "-5"), None);
    assert_eq!(parse_u32("LECTUREPAD_DEBOUNCE_MS", ""), None);
}

#[test]
fn lookup_zero_interval_is_raised() {
    let config = PreviewConfig::from_lookup(lookup_from(&[("LECTUREPAD_POLL_INTERVAL_MS", "0")]));
    assert_eq!(config.poll_interval_ms, 1);
}

#[test]
fn lookup_blank_text_keeps_default() {
    let config = PreviewConfig::from_lookup(lookup_from(&[("LECTUREPAD_TIKZ_SCRIPT_URL", "  ")]));
    assert_eq!(config.tikz_script_url, DEFAULT_TIKZ_SCRIPT_URL);
}

// =============================================================================
// from_json
// =============================================================================

#[test]
fn json_partial_keeps_defaults() {
    let config = PreviewConfig::from_json(r#"{"debounce_ms": 50}"#).unwrap();
    assert_eq!(config.debounce_ms, 50);
    assert_eq!(config.min_frame_height, DEFAULT_MIN_FRAME_HEIGHT);
}

#[test]
fn json_malformed_is_error() {
    assert!(matches!(PreviewConfig::from_json("{"), Err(PreviewError::Json(_))));
}
