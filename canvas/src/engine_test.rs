#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::doc::Style;
use crate::input::{Key, Modifiers, WheelDelta};

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn down(x: f64, y: f64) -> PointerInput {
    PointerInput::primary(x, y)
}

fn shift_down(x: f64, y: f64) -> PointerInput {
    let mut p = PointerInput::primary(x, y);
    p.modifiers.shift = true;
    p
}

fn touch(x: f64, y: f64) -> PointerInput {
    let mut p = PointerInput::primary(x, y);
    p.kind = PointerKind::Touch;
    p
}

fn middle(x: f64, y: f64) -> PointerInput {
    let mut p = PointerInput::primary(x, y);
    p.button = Button::Middle;
    p
}

fn no_prompt() -> impl FnMut(&str) -> Option<String> {
    |_: &str| None
}

fn answer(text: &'static str) -> impl FnMut(&str) -> Option<String> {
    move |_: &str| Some(text.to_owned())
}

fn session() -> EditorSession {
    EditorSession::new()
}

/// Drag with the current tool from `a` to `b` through one intermediate move.
fn drag(s: &mut EditorSession, a: Point, b: Point) -> Vec<Action> {
    let mut prompt = no_prompt();
    s.on_pointer_down(down(a.x, a.y), &mut prompt);
    s.on_pointer_move(down((a.x + b.x) / 2.0, (a.y + b.y) / 2.0));
    s.on_pointer_move(down(b.x, b.y));
    s.on_pointer_up(down(b.x, b.y))
}

fn draw(s: &mut EditorSession, tool: Tool, a: Point, b: Point) {
    s.set_tool(tool);
    drag(s, a, b);
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Shape {
    Shape::Line(Segment { start: pt(x1, y1), end: pt(x2, y2), style: Style::default() })
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn new_session_is_empty_select_idle() {
    let s = session();
    assert!(s.shapes.is_empty());
    assert_eq!(s.ui.tool, Tool::Select);
    assert!(matches!(s.input, InputState::Idle));
    assert_eq!(s.history.len(), 1);
    assert!(s.selection().is_none());
}

// =============================================================
// Drawing tools
// =============================================================

#[test]
fn draw_line_creates_shape_and_commits() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let actions = drag(&mut s, pt(10.0, 10.0), pt(60.0, 10.0));
    assert_eq!(s.shapes.len(), 1);
    assert_eq!(s.shapes.get(0), Some(&line(10.0, 10.0, 60.0, 10.0)));
    assert!(actions.contains(&Action::ShapeAdded(0)));
    assert!(actions.contains(&Action::HistoryChanged { can_undo: true, can_redo: false }));
    assert_eq!(s.history.len(), 2);
}

#[test]
fn pointer_down_dispatches_by_tool_category() {
    let tools = [
        Tool::Select,
        Tool::Line,
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Text,
        Tool::Node,
        Tool::Eraser,
    ];
    for tool in tools {
        let mut s = session();
        s.set_tool(tool);
        let mut prompt = answer("F");
        s.on_pointer_down(down(10.0, 10.0), &mut prompt);
        s.on_pointer_move(down(40.0, 10.0));
        assert_eq!(s.preview_shape().is_some(), tool.is_drawing(), "{}", tool.as_str());
        assert_eq!(s.shapes.len() == 1, tool.is_labeling(), "{}", tool.as_str());
    }
}

#[test]
fn draw_preview_does_not_mutate_model() {
    let mut s = session();
    s.set_tool(Tool::Rectangle);
    let mut prompt = no_prompt();
    s.on_pointer_down(down(10.0, 10.0), &mut prompt);
    s.on_pointer_move(down(30.0, 50.0));
    assert!(s.shapes.is_empty());
    assert_eq!(s.history.len(), 1);
    let Some(Shape::Rectangle(r)) = s.preview_shape() else {
        panic!("expected rectangle preview");
    };
    assert_eq!((r.width, r.height), (20.0, 40.0));
}

#[test]
fn intermediate_moves_do_not_commit() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    s.on_pointer_down(down(0.0, 0.0), &mut prompt);
    for i in 0..10 {
        s.on_pointer_move(down(f64::from(i), 0.0));
    }
    assert_eq!(s.history.len(), 1);
    s.on_pointer_up(down(10.0, 0.0));
    assert_eq!(s.history.len(), 2);
}

#[test]
fn draw_rectangle_keeps_signed_extent() {
    let mut s = session();
    draw(&mut s, Tool::Rectangle, pt(50.0, 40.0), pt(10.0, 10.0));
    let Some(Shape::Rectangle(r)) = s.shapes.get(0) else {
        panic!("expected rectangle");
    };
    assert_eq!((r.x, r.y, r.width, r.height), (50.0, 40.0, -40.0, -30.0));
}

#[test]
fn draw_circle_radius_is_drag_length() {
    let mut s = session();
    draw(&mut s, Tool::Circle, pt(100.0, 100.0), pt(103.0, 104.0));
    let Some(Shape::Circle(c)) = s.shapes.get(0) else {
        panic!("expected circle");
    };
    assert_eq!(c.center, pt(100.0, 100.0));
    assert!(approx_eq(c.radius, 5.0));
}

#[test]
fn draw_uses_current_style() {
    let mut s = session();
    s.set_style(DrawStyle { stroke: "#ff0000".into(), stroke_width: 4.0, fill: Some("#00ff00".into()) });
    draw(&mut s, Tool::Circle, pt(0.0, 0.0), pt(10.0, 0.0));
    let shape = s.shapes.get(0).cloned();
    let Some(Shape::Circle(c)) = shape else {
        panic!("expected circle");
    };
    assert_eq!(c.style.stroke, "#ff0000");
    assert_eq!(c.style.stroke_width, 4.0);
    assert_eq!(c.fill.as_deref(), Some("#00ff00"));
}

#[test]
fn draw_in_zoomed_view_stores_world_coordinates() {
    let mut s = session();
    s.view.set_scale(2.0);
    draw(&mut s, Tool::Line, pt(400.0, 300.0), pt(500.0, 300.0));
    assert_eq!(s.shapes.get(0), Some(&line(400.0, 300.0, 450.0, 300.0)));
}

#[test]
fn rectangle_then_code_yields_scaled_extent() {
    let mut s = session();
    draw(&mut s, Tool::Rectangle, pt(10.0, 10.0), pt(50.0, 40.0));
    let code = s.generate_code();
    assert!(code.contains("\\draw (1.00,1.00) rectangle +(4.00,3.00);"), "{code}");
}

#[test]
fn set_tool_abandons_gesture() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    s.on_pointer_down(down(0.0, 0.0), &mut prompt);
    s.set_tool(Tool::Select);
    assert!(matches!(s.input, InputState::Idle));
    s.on_pointer_up(down(10.0, 10.0));
    assert!(s.shapes.is_empty());
}

// =============================================================
// Text / node
// =============================================================

#[test]
fn text_tool_prompts_and_commits_on_down() {
    let mut s = session();
    s.set_tool(Tool::Text);
    let mut prompt = answer("F = ma");
    let actions = s.on_pointer_down(down(100.0, 100.0), &mut prompt);
    assert!(actions.contains(&Action::ShapeAdded(0)));
    assert_eq!(s.history.len(), 2);
    let Some(Shape::Text(l)) = s.shapes.get(0) else {
        panic!("expected text");
    };
    assert_eq!(l.text, "F = ma");
    assert_eq!(l.at, pt(100.0, 100.0));
}

#[test]
fn node_tool_creates_node() {
    let mut s = session();
    s.set_tool(Tool::Node);
    let mut asked = String::new();
    let mut prompt = |msg: &str| {
        asked = msg.to_owned();
        Some("A".to_owned())
    };
    s.on_pointer_down(down(5.0, 5.0), &mut prompt);
    assert_eq!(asked, "Enter node text:");
    assert!(matches!(s.shapes.get(0), Some(Shape::Node(_))));
}

#[test]
fn cancelled_prompt_is_noop() {
    let mut s = session();
    s.set_tool(Tool::Text);
    let mut prompt = no_prompt();
    let actions = s.on_pointer_down(down(5.0, 5.0), &mut prompt);
    assert!(actions.is_empty());
    assert!(s.shapes.is_empty());
    assert_eq!(s.history.len(), 1);
}

#[test]
fn empty_or_blank_prompt_is_noop() {
    let mut s = session();
    s.set_tool(Tool::Node);
    let mut empty = answer("");
    s.on_pointer_down(down(5.0, 5.0), &mut empty);
    let mut blank = answer("   ");
    s.on_pointer_down(down(5.0, 5.0), &mut blank);
    assert!(s.shapes.is_empty());
    assert_eq!(s.history.len(), 1);
}

// =============================================================
// Select: move
// =============================================================

#[test]
fn click_empty_space_clears_selection() {
    let mut s = session();
    s.shapes.push(line(0.0, 0.0, 100.0, 0.0));
    s.ui.selected = Some(0);
    let mut prompt = no_prompt();
    let actions = s.on_pointer_down(down(300.0, 300.0), &mut prompt);
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(s.selection().is_none());
    assert!(matches!(s.input, InputState::Idle));
}

#[test]
fn move_drag_translates_by_total_delta() {
    let mut s = session();
    s.shapes.push(line(100.0, 100.0, 200.0, 100.0));
    drag(&mut s, pt(150.0, 102.0), pt(170.0, 132.0));
    assert_eq!(s.shapes.get(0), Some(&line(120.0, 130.0, 220.0, 130.0)));
    assert_eq!(s.selection(), Some(0));
    assert_eq!(s.history.len(), 2);
}

#[test]
fn move_drag_is_path_independent() {
    let original = line(100.0, 100.0, 200.0, 100.0);
    let mut prompt = no_prompt();

    let mut direct = session();
    direct.shapes.push(original.clone());
    direct.on_pointer_down(down(150.0, 100.0), &mut prompt);
    direct.on_pointer_move(down(180.0, 90.0));
    direct.on_pointer_up(down(180.0, 90.0));

    let mut wandering = session();
    wandering.shapes.push(original.clone());
    wandering.on_pointer_down(down(150.0, 100.0), &mut prompt);
    for (x, y) in [(151.3, 97.1), (300.0, -40.0), (0.0, 0.0), (179.9, 90.2), (180.0, 90.0)] {
        wandering.on_pointer_move(down(x, y));
    }
    wandering.on_pointer_up(down(180.0, 90.0));

    assert_eq!(wandering.shapes.get(0), Some(&original.translated(30.0, -10.0)));
    assert_eq!(wandering.shapes, direct.shapes);
}

#[test]
fn move_drag_of_rectangle_keeps_size() {
    let mut s = session();
    s.shapes.push(Shape::Rectangle(Rect { x: 0.0, y: 0.0, width: 40.0, height: 30.0, style: Style::default(), fill: None }));
    drag(&mut s, pt(20.0, 15.0), pt(25.0, 20.0));
    let Some(Shape::Rectangle(r)) = s.shapes.get(0) else {
        panic!("expected rectangle");
    };
    assert_eq!((r.x, r.y, r.width, r.height), (5.0, 5.0, 40.0, 30.0));
}

#[test]
fn click_on_shape_commits_on_release() {
    let mut s = session();
    s.shapes.push(line(0.0, 50.0, 100.0, 50.0));
    let mut prompt = no_prompt();
    s.on_pointer_down(down(50.0, 50.0), &mut prompt);
    s.on_pointer_up(down(50.0, 50.0));
    assert_eq!(s.history.len(), 2);
    assert_eq!(s.shapes.get(0), Some(&line(0.0, 50.0, 100.0, 50.0)));
}

#[test]
fn select_picks_closest_shape() {
    let mut s = session();
    s.shapes.push(line(0.0, 100.0, 200.0, 100.0));
    s.shapes.push(line(0.0, 110.0, 200.0, 110.0));
    let mut prompt = no_prompt();
    s.on_pointer_down(down(100.0, 108.0), &mut prompt);
    assert_eq!(s.selection(), Some(1));
}

// =============================================================
// Select: handles
// =============================================================

#[test]
fn handle_drag_moves_line_end_only() {
    let mut s = session();
    s.shapes.push(line(100.0, 100.0, 200.0, 100.0));
    drag(&mut s, pt(198.0, 101.0), pt(250.0, 150.0));
    assert_eq!(s.shapes.get(0), Some(&line(100.0, 100.0, 250.0, 150.0)));
}

#[test]
fn handle_drag_snaps_to_other_shape() {
    let mut s = session();
    s.shapes.push(line(100.0, 100.0, 200.0, 100.0));
    s.shapes.push(Shape::Rectangle(Rect { x: 300.0, y: 300.0, width: 50.0, height: 50.0, style: Style::default(), fill: None }));
    drag(&mut s, pt(200.0, 100.0), pt(296.0, 304.0));
    assert_eq!(s.shapes.get(0), Some(&line(100.0, 100.0, 300.0, 300.0)));
}

#[test]
fn handle_drag_ignores_own_features_when_snapping() {
    let mut s = session();
    s.shapes.push(line(100.0, 100.0, 200.0, 100.0));
    drag(&mut s, pt(200.0, 100.0), pt(104.0, 104.0));
    assert_eq!(s.shapes.get(0), Some(&line(100.0, 100.0, 104.0, 104.0)));
}

#[test]
fn circle_center_handle_moves_center() {
    let mut s = session();
    s.shapes.push(Shape::Circle(Circle { center: pt(200.0, 200.0), radius: 15.0, style: Style::default(), fill: None }));
    drag(&mut s, pt(203.0, 200.0), pt(260.0, 210.0));
    let Some(Shape::Circle(c)) = s.shapes.get(0) else {
        panic!("expected circle");
    };
    assert_eq!(c.center, pt(260.0, 210.0));
    assert_eq!(c.radius, 15.0);
}

#[test]
fn drag_target_removed_mid_gesture_is_noop() {
    let mut s = session();
    s.shapes.push(line(0.0, 0.0, 100.0, 0.0));
    let mut prompt = no_prompt();
    s.on_pointer_down(down(50.0, 0.0), &mut prompt);
    s.shapes.clear();
    let actions = s.on_pointer_move(down(60.0, 10.0));
    assert!(actions.is_empty());
    assert!(matches!(s.input, InputState::Idle));
}

// =============================================================
// Eraser
// =============================================================

#[test]
fn eraser_removes_last_drawn_match() {
    let mut s = session();
    s.shapes.push(line(0.0, 100.0, 200.0, 100.0));
    s.shapes.push(line(0.0, 110.0, 200.0, 110.0));
    s.set_tool(Tool::Eraser);
    let actions = drag(&mut s, pt(100.0, 101.0), pt(100.0, 101.0));
    assert!(actions.contains(&Action::ShapeRemoved(1)));
    assert_eq!(s.shapes.len(), 1);
    assert_eq!(s.shapes.get(0), Some(&line(0.0, 100.0, 200.0, 100.0)));
    assert_eq!(s.history.len(), 2);
}

#[test]
fn eraser_miss_does_not_commit() {
    let mut s = session();
    s.shapes.push(line(0.0, 0.0, 10.0, 0.0));
    s.set_tool(Tool::Eraser);
    let actions = drag(&mut s, pt(300.0, 300.0), pt(300.0, 300.0));
    assert!(actions.is_empty());
    assert_eq!(s.shapes.len(), 1);
    assert_eq!(s.history.len(), 1);
}

#[test]
fn eraser_acts_at_release_point() {
    let mut s = session();
    s.shapes.push(line(0.0, 0.0, 10.0, 0.0));
    s.set_tool(Tool::Eraser);
    drag(&mut s, pt(300.0, 300.0), pt(5.0, 2.0));
    assert!(s.shapes.is_empty());
}

#[test]
fn eraser_shifts_selection_index() {
    let mut s = session();
    s.shapes.push(line(0.0, 0.0, 10.0, 0.0));
    s.shapes.push(line(0.0, 200.0, 10.0, 200.0));
    s.ui.selected = Some(1);
    s.set_tool(Tool::Eraser);
    drag(&mut s, pt(5.0, 0.0), pt(5.0, 0.0));
    assert_eq!(s.selection(), Some(0));
}

// =============================================================
// Pan / zoom
// =============================================================

#[test]
fn shift_drag_pans_without_history() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    s.on_pointer_down(shift_down(100.0, 100.0), &mut prompt);
    s.on_pointer_move(down(120.0, 90.0));
    s.on_pointer_up(down(120.0, 90.0));
    assert!(approx_eq(s.view.offset_x, 20.0));
    assert!(approx_eq(s.view.offset_y, -10.0));
    assert!(s.shapes.is_empty());
    assert_eq!(s.history.len(), 1);
}

#[test]
fn middle_drag_pans_scaled() {
    let mut s = session();
    s.view.set_scale(2.0);
    let mut prompt = no_prompt();
    s.on_pointer_down(middle(0.0, 0.0), &mut prompt);
    s.on_pointer_move(middle(10.0, 10.0));
    s.on_pointer_move(middle(20.0, 30.0));
    assert!(approx_eq(s.view.offset_x, 10.0));
    assert!(approx_eq(s.view.offset_y, 15.0));
}

#[test]
fn secondary_button_is_ignored() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let mut p = down(0.0, 0.0);
    p.button = Button::Secondary;
    let mut prompt = no_prompt();
    assert!(s.on_pointer_down(p, &mut prompt).is_empty());
    assert!(matches!(s.input, InputState::Idle));
}

#[test]
fn zoom_buttons_step_and_report_percent() {
    let mut s = session();
    let actions = s.zoom_in();
    assert_eq!(actions[0], Action::ZoomChanged { percent: 120 });
    s.zoom_out();
    assert!(approx_eq(s.view.scale, 1.0));
}

#[test]
fn zoom_clamps_at_limits() {
    let mut s = session();
    for _ in 0..40 {
        s.zoom_in();
    }
    assert_eq!(s.view.scale, 10.0);
    for _ in 0..80 {
        s.zoom_out();
    }
    assert_eq!(s.view.scale, 0.1);
}

#[test]
fn ctrl_wheel_zooms() {
    let mut s = session();
    s.on_wheel(WheelDelta { dx: 0.0, dy: -100.0 }, ctrl());
    assert!(approx_eq(s.view.scale, 1.1));
    s.on_wheel(WheelDelta { dx: 0.0, dy: 100.0 }, ctrl());
    assert!(approx_eq(s.view.scale, 0.99));
}

#[test]
fn plain_wheel_does_nothing() {
    let mut s = session();
    let actions = s.on_wheel(WheelDelta { dx: 0.0, dy: -100.0 }, Modifiers::default());
    assert!(actions.is_empty());
    assert_eq!(s.view.scale, 1.0);
}

#[test]
fn zoom_reset_clears_pan_and_scale() {
    let mut s = session();
    s.zoom_in();
    s.view.pan_by_screen(30.0, 30.0);
    let actions = s.zoom_reset();
    assert_eq!(actions[0], Action::ZoomChanged { percent: 100 });
    assert_eq!((s.view.scale, s.view.offset_x, s.view.offset_y), (1.0, 0.0, 0.0));
}

#[test]
fn zoom_does_not_touch_history() {
    let mut s = session();
    s.zoom_in();
    s.zoom_reset();
    assert_eq!(s.history.len(), 1);
}

// =============================================================
// Touch gating / missing surface
// =============================================================

#[test]
fn touch_ignored_by_default() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    s.on_pointer_down(touch(0.0, 0.0), &mut prompt);
    s.on_pointer_move(touch(50.0, 0.0));
    s.on_pointer_up(touch(50.0, 0.0));
    assert!(s.shapes.is_empty());
}

#[test]
fn touch_ignored_mid_gesture() {
    let mut s = session();
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    s.on_pointer_down(down(0.0, 0.0), &mut prompt);
    s.on_pointer_up(touch(50.0, 0.0));
    assert!(s.shapes.is_empty());
    assert!(matches!(s.input, InputState::Drawing { .. }));
}

#[test]
fn touch_allowed_draws() {
    let mut s = session();
    s.set_touch_allowed(true);
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    s.on_pointer_down(touch(0.0, 0.0), &mut prompt);
    s.on_pointer_up(touch(50.0, 0.0));
    assert_eq!(s.shapes.len(), 1);
}

#[test]
fn no_surface_makes_pointer_noop() {
    let mut s = session();
    s.view.canvas_width = 0.0;
    s.set_tool(Tool::Line);
    let mut prompt = no_prompt();
    assert!(s.on_pointer_down(down(0.0, 0.0), &mut prompt).is_empty());
    assert!(s.on_pointer_up(down(10.0, 0.0)).is_empty());
    assert!(s.shapes.is_empty());
}

#[test]
fn resize_rejects_empty_container() {
    let mut s = session();
    assert!(s.resize(0.0, 0.0).is_empty());
    assert_eq!(s.resize(1000.0, 500.0), vec![Action::RenderNeeded]);
    assert_eq!(s.view.canvas_width, 1000.0);
}

// =============================================================
// Undo / redo / clear
// =============================================================

#[test]
fn three_draws_two_undos_then_draw() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    draw(&mut s, Tool::Line, pt(0.0, 50.0), pt(10.0, 50.0));
    draw(&mut s, Tool::Line, pt(0.0, 100.0), pt(10.0, 100.0));
    s.undo();
    s.undo();
    assert_eq!(s.shapes.as_slice(), &[line(0.0, 0.0, 10.0, 0.0)]);

    draw(&mut s, Tool::Circle, pt(200.0, 200.0), pt(210.0, 200.0));
    assert!(s.redo().is_empty());
    assert_eq!(s.shapes.len(), 2);
}

#[test]
fn redo_restores_undone() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    s.undo();
    assert!(s.shapes.is_empty());
    let actions = s.redo();
    assert!(actions.contains(&Action::HistoryChanged { can_undo: true, can_redo: false }));
    assert_eq!(s.shapes.len(), 1);
}

#[test]
fn undo_at_start_is_noop() {
    let mut s = session();
    assert!(s.undo().is_empty());
}

#[test]
fn undo_drops_out_of_range_selection() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    s.ui.selected = Some(0);
    let actions = s.undo();
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn keyboard_shortcuts_drive_history() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    s.on_key_down(&Key("z".into()), ctrl());
    assert!(s.shapes.is_empty());
    s.on_key_down(&Key("Z".into()), Modifiers { shift: true, meta: true, ..Default::default() });
    assert_eq!(s.shapes.len(), 1);
    assert!(s.on_key_down(&Key("z".into()), Modifiers::default()).is_empty());
}

#[test]
fn clear_empties_and_commits() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    s.ui.selected = Some(0);
    s.clear();
    assert!(s.shapes.is_empty());
    assert!(s.selection().is_none());
    assert_eq!(s.history.len(), 3);
    s.undo();
    assert_eq!(s.shapes.len(), 1);
}

// =============================================================
// Templates / code / JSON
// =============================================================

#[test]
fn template_insert_is_one_commit() {
    let mut s = session();
    let actions = s.insert_template(Template::PulleyFixed);
    assert_eq!(s.shapes.len(), 3);
    assert_eq!(s.history.len(), 2);
    assert_eq!(actions.iter().filter(|a| matches!(a, Action::ShapeAdded(_))).count(), 3);
    s.undo();
    assert!(s.shapes.is_empty());
}

#[test]
fn generate_code_is_idempotent() {
    let mut s = session();
    draw(&mut s, Tool::Arrow, pt(10.0, 10.0), pt(70.0, 30.0));
    draw(&mut s, Tool::Circle, pt(100.0, 100.0), pt(120.0, 100.0));
    assert_eq!(s.generate_code(), s.generate_code());
}

#[test]
fn import_code_replaces_model_and_commits() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    let code = "\\begin{tikzpicture}[scale=0.1]\n  \\draw (1.00,2.00) circle (3.00);\n\\end{tikzpicture}";
    let result = s.import_code(code);
    assert!(result.is_ok());
    assert_eq!(s.shapes.len(), 1);
    assert!(matches!(s.shapes.get(0), Some(Shape::Circle(_))));
    assert_eq!(s.history.len(), 3);
}

#[test]
fn import_code_error_leaves_model() {
    let mut s = session();
    draw(&mut s, Tool::Line, pt(0.0, 0.0), pt(10.0, 0.0));
    assert!(s.import_code("\\draw (1,2) -- (oops);").is_err());
    assert_eq!(s.shapes.len(), 1);
}

#[test]
fn json_export_import_roundtrip() {
    let mut s = session();
    draw(&mut s, Tool::Rectangle, pt(0.0, 0.0), pt(10.0, 20.0));
    let json = s.export_json().unwrap();
    let mut other = session();
    other.import_json(&json).unwrap();
    assert_eq!(other.shapes, s.shapes);
}

// =============================================================
// build_shape
// =============================================================

#[test]
fn build_shape_none_for_non_drawing_tools() {
    let style = DrawStyle::default();
    for tool in [Tool::Select, Tool::Text, Tool::Node, Tool::Eraser] {
        assert!(build_shape(tool, pt(0.0, 0.0), pt(1.0, 1.0), &style).is_none());
    }
}

#[test]
fn build_shape_arrow() {
    let shape = build_shape(Tool::Arrow, pt(0.0, 0.0), pt(5.0, 5.0), &DrawStyle::default());
    assert!(matches!(shape, Some(Shape::Arrow(_))));
}
