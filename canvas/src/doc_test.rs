#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use serde_json::json;

use super::*;

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Shape {
    Shape::Line(Segment { start: Point::new(x1, y1), end: Point::new(x2, y2), style: Style::default() })
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::Rectangle(Rect { x, y, width: w, height: h, style: Style::default(), fill: None })
}

fn circle(x: f64, y: f64, r: f64) -> Shape {
    Shape::Circle(Circle { center: Point::new(x, y), radius: r, style: Style::default(), fill: Some("#eee".into()) })
}

fn label(x: f64, y: f64, text: &str) -> Shape {
    Shape::Text(Label { at: Point::new(x, y), text: text.into(), style: Style::default() })
}

// =============================================================
// Shape serde
// =============================================================

#[test]
fn shape_serializes_with_type_tag() {
    let value = serde_json::to_value(line(0.0, 1.0, 2.0, 3.0)).unwrap();
    assert_eq!(value["type"], "line");
    assert_eq!(value["start"], json!({"x": 0.0, "y": 1.0}));
    assert_eq!(value["style"]["stroke"], DEFAULT_STROKE);
}

#[test]
fn shape_fill_omitted_when_none() {
    let value = serde_json::to_value(rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(value.get("fill").is_none());
    let value = serde_json::to_value(circle(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(value["fill"], "#eee");
}

#[test]
fn shape_deserialize_defaults_style() {
    let shape: Shape = serde_json::from_value(json!({
        "type": "node",
        "at": {"x": 5.0, "y": 6.0},
        "text": "m"
    }))
    .unwrap();
    assert_eq!(shape.kind(), "node");
    assert_eq!(shape.style(), &Style::default());
}

#[test]
fn shape_deserialize_unknown_type_fails() {
    let result: Result<Shape, _> = serde_json::from_value(json!({"type": "polygon"}));
    assert!(result.is_err());
}

// =============================================================
// Shape accessors
// =============================================================

#[test]
fn kind_names() {
    assert_eq!(line(0.0, 0.0, 1.0, 1.0).kind(), "line");
    assert_eq!(rect(0.0, 0.0, 1.0, 1.0).kind(), "rectangle");
    assert_eq!(circle(0.0, 0.0, 1.0).kind(), "circle");
    assert_eq!(label(0.0, 0.0, "a").kind(), "text");
}

#[test]
fn fill_only_for_closed_shapes() {
    assert_eq!(circle(0.0, 0.0, 1.0).fill(), Some("#eee"));
    assert_eq!(rect(0.0, 0.0, 1.0, 1.0).fill(), None);
    assert_eq!(line(0.0, 0.0, 1.0, 1.0).fill(), None);
}

// =============================================================
// translated
// =============================================================

#[test]
fn translated_line_moves_both_endpoints() {
    let moved = line(1.0, 2.0, 3.0, 4.0).translated(10.0, -1.0);
    assert_eq!(moved, line(11.0, 1.0, 13.0, 3.0));
}

#[test]
fn translated_rect_keeps_extent() {
    let moved = rect(0.0, 0.0, -5.0, 7.0).translated(2.0, 3.0);
    assert_eq!(moved, rect(2.0, 3.0, -5.0, 7.0));
}

#[test]
fn translated_circle_keeps_radius_and_fill() {
    let moved = circle(1.0, 1.0, 4.0).translated(1.0, 1.0);
    assert_eq!(moved, circle(2.0, 2.0, 4.0));
}

#[test]
fn translated_does_not_mutate_original() {
    let original = label(0.0, 0.0, "x");
    let _moved = original.translated(5.0, 5.0);
    assert_eq!(original, label(0.0, 0.0, "x"));
}

// =============================================================
// feature_points
// =============================================================

#[test]
fn rect_features_are_corners() {
    let pts = rect(10.0, 20.0, 30.0, -5.0).feature_points();
    assert_eq!(
        pts,
        vec![Point::new(10.0, 20.0), Point::new(40.0, 20.0), Point::new(40.0, 15.0), Point::new(10.0, 15.0)]
    );
}

#[test]
fn circle_feature_is_center_only() {
    assert_eq!(circle(3.0, 4.0, 10.0).feature_points(), vec![Point::new(3.0, 4.0)]);
}

#[test]
fn label_feature_is_anchor() {
    assert_eq!(label(7.0, 8.0, "t").feature_points(), vec![Point::new(7.0, 8.0)]);
}

// =============================================================
// ShapeStore
// =============================================================

#[test]
fn store_push_returns_index_in_order() {
    let mut store = ShapeStore::new();
    assert_eq!(store.push(line(0.0, 0.0, 1.0, 1.0)), 0);
    assert_eq!(store.push(rect(0.0, 0.0, 1.0, 1.0)), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(1).map(Shape::kind), Some("rectangle"));
}

#[test]
fn store_remove_shifts_later_shapes() {
    let mut store = ShapeStore::from(vec![line(0.0, 0.0, 1.0, 1.0), rect(0.0, 0.0, 1.0, 1.0), circle(0.0, 0.0, 1.0)]);
    let removed = store.remove(1);
    assert_eq!(removed.map(|s| s.kind()), Some("rectangle"));
    assert_eq!(store.get(1).map(Shape::kind), Some("circle"));
}

#[test]
fn store_remove_out_of_range_is_none() {
    let mut store = ShapeStore::new();
    assert!(store.remove(0).is_none());
}

#[test]
fn store_snapshot_is_deep_copy() {
    let mut store = ShapeStore::from(vec![label(0.0, 0.0, "a")]);
    let snap = store.snapshot();
    if let Some(Shape::Text(l)) = store.get_mut(0) {
        l.text = "b".into();
    }
    assert_eq!(snap[0], label(0.0, 0.0, "a"));
}

#[test]
fn store_replace_and_clear() {
    let mut store = ShapeStore::new();
    store.replace(vec![line(0.0, 0.0, 1.0, 1.0)]);
    assert!(!store.is_empty());
    store.clear();
    assert!(store.is_empty());
}

#[test]
fn store_json_roundtrip_preserves_order() {
    let store = ShapeStore::from(vec![circle(1.0, 2.0, 3.0), line(0.0, 0.0, 4.0, 4.0), label(1.0, 1.0, "q")]);
    let json = store.to_json().unwrap();
    let back = ShapeStore::from_json(&json).unwrap();
    assert_eq!(back, store);
}

#[test]
fn store_from_json_rejects_object() {
    assert!(ShapeStore::from_json("{}").is_err());
}
