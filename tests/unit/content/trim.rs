use super::*;

use kurbo::{PathEl, Point};

fn line(from: (f64, f64), to: (f64, f64)) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(from);
    p.line_to(to);
    p
}

fn window(start: f32, end: f32, offset: f32) -> ResolvedTrim {
    ResolvedTrim {
        start,
        end,
        offset,
        mode: TrimMode::Simultaneous,
    }
}

fn move_points(path: &BezPath) -> Vec<Point> {
    path.elements()
        .iter()
        .filter_map(|el| match el {
            PathEl::MoveTo(p) => Some(*p),
            _ => None,
        })
        .collect()
}

fn end_point(path: &BezPath) -> Point {
    match path.elements().last() {
        Some(PathEl::LineTo(p)) => *p,
        Some(PathEl::CurveTo(_, _, p)) => *p,
        other => panic!("unexpected terminal element {other:?}"),
    }
}

#[test]
fn length_sums_across_subpaths() {
    let mut p = line((0.0, 0.0), (100.0, 0.0));
    p.move_to((0.0, 50.0));
    p.line_to((50.0, 50.0));
    assert!((path_length(&p) - 150.0).abs() < 1e-6);
}

#[test]
fn middle_window_cuts_both_ends() {
    let p = line((0.0, 0.0), (100.0, 0.0));
    let trimmed = apply_trim(&p, window(0.25, 0.75, 0.0));
    let moves = move_points(&trimmed);
    assert_eq!(moves.len(), 1);
    assert!((moves[0].x - 25.0).abs() < 1e-2);
    assert!((end_point(&trimmed).x - 75.0).abs() < 1e-2);
}

#[test]
fn full_window_is_identity() {
    let p = line((0.0, 0.0), (100.0, 0.0));
    let trimmed = apply_trim(&p, window(0.0, 1.0, 0.0));
    assert_eq!(trimmed.elements(), p.elements());
}

#[test]
fn reversed_full_window_is_identity() {
    let p = line((0.0, 0.0), (100.0, 0.0));
    let trimmed = apply_trim(&p, window(1.0, 0.0, 0.0));
    assert_eq!(trimmed.elements(), p.elements());
}

#[test]
fn collapsed_window_produces_no_geometry() {
    let p = line((0.0, 0.0), (100.0, 0.0));
    assert!(apply_trim(&p, window(0.3, 0.3, 0.0)).elements().is_empty());
}

#[test]
fn offset_wraps_the_window_into_two_pieces() {
    let p = line((0.0, 0.0), (100.0, 0.0));
    let trimmed = apply_trim(&p, window(0.0, 0.5, 0.75));
    let moves = move_points(&trimmed);
    assert_eq!(moves.len(), 2);
    assert!((moves[0].x - 75.0).abs() < 1e-2);
    assert!((moves[1].x - 0.0).abs() < 1e-2);
    assert!((end_point(&trimmed).x - 25.0).abs() < 1e-2);
}

#[test]
fn negative_offset_wraps_too() {
    let p = line((0.0, 0.0), (100.0, 0.0));
    let trimmed = apply_trim(&p, window(0.5, 1.0, -0.75));
    assert_eq!(move_points(&trimmed).len(), 2);
}

#[test]
fn joint_trim_spreads_across_paths() {
    let paths = [
        line((0.0, 0.0), (100.0, 0.0)),
        line((0.0, 100.0), (100.0, 100.0)),
    ];
    let pieces = apply_joint_trim(
        &paths,
        ResolvedTrim {
            start: 0.25,
            end: 0.75,
            offset: 0.0,
            mode: TrimMode::Individual,
        },
    );
    assert_eq!(pieces.len(), 2);
    // First path keeps its back half, second path its front half.
    assert!((move_points(&pieces[0])[0].x - 50.0).abs() < 1e-2);
    assert!((end_point(&pieces[0]).x - 100.0).abs() < 1e-2);
    assert!((move_points(&pieces[1])[0].x - 0.0).abs() < 1e-2);
    assert!((end_point(&pieces[1]).x - 50.0).abs() < 1e-2);
}

#[test]
fn joint_trim_drops_untouched_paths() {
    let paths = [
        line((0.0, 0.0), (100.0, 0.0)),
        line((0.0, 100.0), (100.0, 100.0)),
    ];
    let pieces = apply_joint_trim(
        &paths,
        ResolvedTrim {
            start: 0.0,
            end: 0.5,
            offset: 0.0,
            mode: TrimMode::Individual,
        },
    );
    assert_eq!(pieces.len(), 1);
    assert!((path_length(&pieces[0]) - 100.0).abs() < 1e-2);
}

#[test]
fn resolved_window_normalizes_percentages() {
    let model = TrimModel {
        name: None,
        start: constant_track(10.0),
        end: constant_track(60.0),
        offset: constant_track(90.0),
        mode: TrimMode::Simultaneous,
    };
    let mut content = TrimContent::new(&model).unwrap();
    content.set_progress(0.0);
    let resolved = content.resolve();
    assert!((resolved.start - 0.1).abs() < 1e-6);
    assert!((resolved.end - 0.6).abs() < 1e-6);
    assert!((resolved.offset - 0.25).abs() < 1e-6);
}

fn constant_track(value: f32) -> crate::composition::model::Track<f32> {
    std::sync::Arc::new(vec![crate::animation::keyframe::Keyframe::constant(value)])
}
