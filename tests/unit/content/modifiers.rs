use super::*;

use std::sync::Arc;

use kurbo::Point;

use crate::animation::keyframe::Keyframe;

fn square() -> ShapeData {
    ShapeData::new(
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ],
        vec![Vec2::ZERO; 4],
        vec![Vec2::ZERO; 4],
        true,
    )
}

#[test]
fn sharp_vertices_split_into_pulled_back_pairs() {
    let rounded = round_corners(&square(), 10.0);
    assert_eq!(rounded.vertex_count(), 8);
    // Corner (0, 0): previous vertex is (0, 100), next is (100, 0).
    assert_eq!(rounded.vertices[0], Point::new(0.0, 10.0));
    assert_eq!(rounded.vertices[1], Point::new(10.0, 0.0));
    assert_eq!(rounded.in_tangents[0], Vec2::ZERO);
    assert_eq!(rounded.out_tangents[0], Vec2::new(0.0, -10.0 * CORNER_MAGIC));
    assert_eq!(rounded.in_tangents[1], Vec2::new(-10.0 * CORNER_MAGIC, 0.0));
    assert_eq!(rounded.out_tangents[1], Vec2::ZERO);
    assert!(rounded.closed);
}

#[test]
fn pull_back_caps_at_half_the_edge() {
    let rounded = round_corners(&square(), 100.0);
    assert_eq!(rounded.vertices[0], Point::new(0.0, 50.0));
    assert_eq!(rounded.vertices[1], Point::new(50.0, 0.0));
}

#[test]
fn curved_vertices_keep_their_handles() {
    let mut data = square();
    data.out_tangents[1] = Vec2::new(0.0, 30.0);
    let rounded = round_corners(&data, 10.0);
    // Three corners split, one kept: 3 * 2 + 1.
    assert_eq!(rounded.vertex_count(), 7);
    assert!(rounded.out_tangents.contains(&Vec2::new(0.0, 30.0)));
}

#[test]
fn open_path_endpoints_are_never_rounded() {
    let data = ShapeData::new(
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ],
        vec![Vec2::ZERO; 3],
        vec![Vec2::ZERO; 3],
        false,
    );
    let rounded = round_corners(&data, 10.0);
    assert_eq!(rounded.vertex_count(), 4);
    assert_eq!(rounded.vertices[0], Point::new(0.0, 0.0));
    assert_eq!(rounded.vertices[3], Point::new(100.0, 100.0));
    // The middle corner pulls back toward both neighbors.
    assert_eq!(rounded.vertices[1], Point::new(90.0, 0.0));
    assert_eq!(rounded.vertices[2], Point::new(100.0, 10.0));
}

#[test]
fn zero_radius_and_degenerate_shapes_pass_through() {
    let data = square();
    assert_eq!(round_corners(&data, 0.0), data);
    let segment = ShapeData::new(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        vec![Vec2::ZERO; 2],
        vec![Vec2::ZERO; 2],
        false,
    );
    assert_eq!(round_corners(&segment, 10.0), segment);
}

#[test]
fn modifier_resolves_its_animated_radius() {
    let model = RoundedCornersModel {
        name: Some("round".into()),
        radius: Arc::new(vec![Keyframe::constant(12.5)]),
    };
    let mut content = RoundedCornersContent::new(&model).unwrap();
    content.set_progress(0.0);
    assert_eq!(content.radius(), 12.5);
    assert_eq!(content.name(), Some("round"));
}
