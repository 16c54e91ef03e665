use super::*;

fn key(s: &str) -> Key {
    Key(s.to_owned())
}

fn mods(shift: bool, ctrl: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt: false, meta }
}

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_names_roundtrip() {
    let all = [
        Tool::Select,
        Tool::Line,
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Text,
        Tool::Node,
        Tool::Eraser,
    ];
    for tool in all {
        assert_eq!(Tool::from_name(tool.as_str()), Some(tool));
    }
}

#[test]
fn tool_unknown_name_is_none() {
    assert_eq!(Tool::from_name("lasso"), None);
    assert_eq!(Tool::from_name("Line"), None);
}

#[test]
fn tool_categories() {
    assert!(Tool::Circle.is_drawing());
    assert!(!Tool::Text.is_drawing());
    assert!(Tool::Node.is_labeling());
    assert!(!Tool::Eraser.is_labeling());
    assert!(!Tool::Select.is_drawing());
}

// =============================================================
// Button / PointerKind
// =============================================================

#[test]
fn button_from_dom_codes() {
    assert_eq!(Button::from_code(0), Button::Primary);
    assert_eq!(Button::from_code(1), Button::Middle);
    assert_eq!(Button::from_code(2), Button::Secondary);
    assert_eq!(Button::from_code(4), Button::Primary);
}

#[test]
fn pointer_kind_from_dom_names() {
    assert_eq!(PointerKind::from_name("touch"), PointerKind::Touch);
    assert_eq!(PointerKind::from_name("pen"), PointerKind::Pen);
    assert_eq!(PointerKind::from_name("mouse"), PointerKind::Mouse);
    assert_eq!(PointerKind::from_name(""), PointerKind::Mouse);
}

#[test]
fn modifiers_from_bits() {
    let m = Modifiers::from_bits(Modifiers::SHIFT | Modifiers::META);
    assert!(m.shift && m.meta);
    assert!(!m.ctrl && !m.alt);
    assert!(m.platform());
    assert!(!Modifiers::from_bits(Modifiers::ALT).platform());
}

#[test]
fn primary_input_has_no_modifiers() {
    let p = PointerInput::primary(3.0, 4.0);
    assert_eq!(p.button, Button::Primary);
    assert!(!p.modifiers.shift);
    assert_eq!(p.kind, PointerKind::Mouse);
}

// =============================================================
// Shortcuts
// =============================================================

#[test]
fn ctrl_z_is_undo() {
    assert_eq!(shortcut(&key("z"), mods(false, true, false)), Some(Shortcut::Undo));
}

#[test]
fn meta_z_is_undo() {
    assert_eq!(shortcut(&key("z"), mods(false, false, true)), Some(Shortcut::Undo));
}

#[test]
fn shift_uppercase_z_is_redo() {
    assert_eq!(shortcut(&key("Z"), mods(true, true, false)), Some(Shortcut::Redo));
    assert_eq!(shortcut(&key("z"), mods(true, false, true)), Some(Shortcut::Redo));
}

#[test]
fn plain_z_is_not_a_shortcut() {
    assert_eq!(shortcut(&key("z"), mods(false, false, false)), None);
    assert_eq!(shortcut(&key("y"), mods(false, true, false)), None);
}

// =============================================================
// UiState / DrawStyle
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(ui.selected.is_none());
    assert!(!ui.touch_allowed);
    assert!(ui.style.fill.is_none());
}

#[test]
fn draw_style_produces_stroke_style() {
    let style = DrawStyle { stroke: "#ff0000".into(), stroke_width: 3.0, fill: Some("#00ff00".into()) };
    let s = style.stroke_style();
    assert_eq!(s.stroke, "#ff0000");
    assert!((s.stroke_width - 3.0).abs() < 1e-10);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}
