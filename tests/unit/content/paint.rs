use super::*;

use kurbo::BezPath;

use crate::animation::keyframe::Keyframe;
use crate::composition::model::DashElement;

fn track<T: crate::animation::value::Interpolate>(value: T) -> Track<T> {
    Arc::new(vec![Keyframe::constant(value)])
}

fn red() -> Rgba {
    Rgba::opaque(1.0, 0.0, 0.0)
}

#[test]
fn fill_scales_parent_alpha_by_its_opacity() {
    let model = FillModel {
        name: Some("fill".into()),
        color: track(red()),
        opacity: Some(track(50.0)),
        rule: FillRule::EvenOdd,
    };
    let mut fill = FillContent::new(&model, ColorMixing::Straight).unwrap();
    fill.set_progress(0.0);
    let mut list = DisplayList::new();
    fill.emit(&mut list, BezPath::new(), Affine::IDENTITY, 255);
    let DrawCommand::Fill { paint, rule, alpha, .. } = &list.commands()[0] else {
        panic!("expected a fill command");
    };
    assert_eq!(*alpha, 128);
    assert_eq!(*rule, FillRule::EvenOdd);
    let Paint::Solid(color) = paint else {
        panic!("expected a solid paint");
    };
    assert_eq!(*color, red());
}

#[test]
fn fill_without_opacity_track_keeps_parent_alpha() {
    let model = FillModel {
        name: None,
        color: track(red()),
        opacity: None,
        rule: FillRule::NonZero,
    };
    let mut fill = FillContent::new(&model, ColorMixing::Straight).unwrap();
    fill.set_progress(0.0);
    let mut list = DisplayList::new();
    fill.emit(&mut list, BezPath::new(), Affine::IDENTITY, 200);
    let DrawCommand::Fill { alpha, .. } = &list.commands()[0] else {
        panic!("expected a fill command");
    };
    assert_eq!(*alpha, 200);
}

fn stroke_model(width: f32, dashes: Vec<DashElement>) -> StrokeModel {
    StrokeModel {
        name: None,
        color: track(red()),
        opacity: None,
        width: track(width),
        cap: LineCap::Round,
        join: LineJoin::Bevel,
        miter_limit: 4.0,
        dashes,
    }
}

#[test]
fn zero_width_stroke_records_nothing() {
    let mut stroke = StrokeContent::new(&stroke_model(0.0, Vec::new()), ColorMixing::Straight)
        .unwrap();
    stroke.set_progress(0.0);
    let mut list = DisplayList::new();
    stroke.emit(&mut list, BezPath::new(), Affine::IDENTITY, 255);
    assert!(list.is_empty());
}

#[test]
fn dash_runs_are_floored_and_offset_passes_through() {
    let dashes = vec![
        DashElement {
            kind: DashKind::Dash,
            value: track(0.5),
        },
        DashElement {
            kind: DashKind::Gap,
            value: track(0.05),
        },
        DashElement {
            kind: DashKind::Offset,
            value: track(7.0),
        },
    ];
    let mut stroke =
        StrokeContent::new(&stroke_model(2.0, dashes), ColorMixing::Straight).unwrap();
    stroke.set_progress(0.0);
    let mut list = DisplayList::new();
    stroke.emit(&mut list, BezPath::new(), Affine::IDENTITY, 255);
    let DrawCommand::Stroke { style, .. } = &list.commands()[0] else {
        panic!("expected a stroke command");
    };
    assert_eq!(style.dashes, vec![1.0, 0.1]);
    assert_eq!(style.dash_offset, 7.0);
    assert_eq!(style.cap, LineCap::Round);
    assert_eq!(style.join, LineJoin::Bevel);
    assert_eq!(style.width, 2.0);
}

fn gradient_model(kind: GradientKind, start: Point, end: Point) -> GradientFillModel {
    GradientFillModel {
        name: None,
        kind,
        stops: track(GradientColor::new(
            vec![0.0, 1.0],
            vec![red(), Rgba::opaque(0.0, 0.0, 1.0)],
        )),
        start: track(start),
        end: track(end),
        highlight_length: None,
        highlight_angle: None,
        opacity: None,
        rule: FillRule::NonZero,
    }
}

#[test]
fn linear_gradient_carries_its_endpoints() {
    let model = gradient_model(
        GradientKind::Linear,
        Point::new(0.0, 0.0),
        Point::new(100.0, 50.0),
    );
    let mut fill = GradientFillContent::new(&model, ColorMixing::Straight).unwrap();
    fill.set_progress(0.0);
    let mut list = DisplayList::new();
    fill.emit(&mut list, BezPath::new(), Affine::IDENTITY, 255);
    let DrawCommand::Fill { paint, .. } = &list.commands()[0] else {
        panic!("expected a fill command");
    };
    let Paint::Linear { start, end, stops } = paint else {
        panic!("expected a linear paint");
    };
    assert_eq!(*start, Point::new(0.0, 0.0));
    assert_eq!(*end, Point::new(100.0, 50.0));
    assert_eq!(stops.stop_count(), 2);
}

#[test]
fn degenerate_radial_gradient_keeps_a_tiny_radius() {
    let model = gradient_model(
        GradientKind::Radial,
        Point::new(10.0, 10.0),
        Point::new(10.0, 10.0),
    );
    let mut fill = GradientFillContent::new(&model, ColorMixing::Straight).unwrap();
    fill.set_progress(0.0);
    let mut list = DisplayList::new();
    fill.emit(&mut list, BezPath::new(), Affine::IDENTITY, 255);
    let DrawCommand::Fill { paint, .. } = &list.commands()[0] else {
        panic!("expected a fill command");
    };
    let Paint::Radial { center, radius, .. } = paint else {
        panic!("expected a radial paint");
    };
    assert_eq!(*center, Point::new(10.0, 10.0));
    assert_eq!(*radius, 0.001);
}

#[test]
fn gradient_stroke_resolves_paint_and_style_together() {
    let model = GradientStrokeModel {
        gradient: gradient_model(
            GradientKind::Linear,
            Point::new(0.0, 0.0),
            Point::new(0.0, 80.0),
        ),
        width: track(3.0),
        cap: LineCap::Butt,
        join: LineJoin::Miter,
        miter_limit: 10.0,
        dashes: Vec::new(),
    };
    let mut stroke = GradientStrokeContent::new(&model, ColorMixing::Straight).unwrap();
    stroke.set_progress(0.0);
    let mut list = DisplayList::new();
    stroke.emit(&mut list, BezPath::new(), Affine::IDENTITY, 255);
    let DrawCommand::Stroke { paint, style, .. } = &list.commands()[0] else {
        panic!("expected a stroke command");
    };
    assert!(matches!(paint, Paint::Linear { .. }));
    assert_eq!(style.width, 3.0);
    assert_eq!(style.miter_limit, 10.0);
    assert!(style.dashes.is_empty());
}
