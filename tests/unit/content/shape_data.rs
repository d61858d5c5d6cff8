use kurbo::PathEl;

use super::*;

fn square() -> ShapeData {
    ShapeData::new(
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ],
        vec![Vec2::ZERO; 4],
        vec![Vec2::ZERO; 4],
        true,
    )
}

#[test]
fn empty_shape_emits_an_empty_path() {
    let path = ShapeData::default().to_path();
    assert_eq!(path.elements().len(), 0);
}

#[test]
fn zero_tangent_edges_emit_lines() {
    let mut open = square();
    open.closed = false;
    let path = open.to_path();
    let els = path.elements();
    assert_eq!(els.len(), 4);
    assert!(matches!(els[0], PathEl::MoveTo(p) if p == Point::ZERO));
    assert!(els[1..].iter().all(|e| matches!(e, PathEl::LineTo(..))));
}

#[test]
fn closed_shape_lines_back_and_closes() {
    let path = square().to_path();
    let els = path.elements();
    assert_eq!(els.len(), 6);
    assert!(matches!(els[4], PathEl::LineTo(p) if p == Point::ZERO));
    assert!(matches!(els[5], PathEl::ClosePath));
}

#[test]
fn edges_with_any_tangent_stay_cubic() {
    let mut square = square();
    square.out_tangents[0] = Vec2::new(0.0, -4.0);
    let path = square.to_path();
    let els = path.elements();
    assert!(matches!(els[1], PathEl::CurveTo(..)));
    assert!(matches!(els[2], PathEl::LineTo(..)));
}

#[test]
fn tangents_offset_the_control_points() {
    let shape = ShapeData::new(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        vec![Vec2::ZERO, Vec2::new(-2.0, 3.0)],
        vec![Vec2::new(2.0, 3.0), Vec2::ZERO],
        false,
    );
    let els = shape.to_path().elements().to_vec();
    let PathEl::CurveTo(c1, c2, end) = els[1] else {
        panic!("expected a cubic");
    };
    assert_eq!(c1, Point::new(2.0, 3.0));
    assert_eq!(c2, Point::new(8.0, 3.0));
    assert_eq!(end, Point::new(10.0, 0.0));
}

#[test]
fn interpolation_blends_vertices_and_tangents() {
    let a = square();
    let mut b = square();
    b.vertices[0] = Point::new(4.0, 0.0);
    b.out_tangents[0] = Vec2::new(8.0, 0.0);

    let mid = ShapeData::interpolate(&a, &b, 0.5);
    assert_eq!(mid.vertices[0], Point::new(2.0, 0.0));
    assert_eq!(mid.out_tangents[0], Vec2::new(4.0, 0.0));
    assert_eq!(mid.vertices[1], a.vertices[1]);
    assert!(mid.closed);
}
