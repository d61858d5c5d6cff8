use super::*;

use kurbo::{PathEl, Point};

use crate::animation::keyframe::Keyframe;
use crate::animation::value::Interpolate;
use crate::composition::model::{PositionModel, PrecompAsset, Track, TransformModel};

fn track<T: Interpolate>(value: T) -> Track<T> {
    Arc::new(vec![Keyframe::constant(value)])
}

fn build(layers: Vec<LayerModel>) -> Arc<Composition> {
    with_assets(layers, HashMap::new())
}

fn with_assets(layers: Vec<LayerModel>, assets: HashMap<String, Asset>) -> Arc<Composition> {
    Arc::new(Composition {
        name: None,
        version: None,
        canvas: Canvas::new(100, 100),
        range: FrameRange::new(0.0, 100.0).unwrap(),
        frame_rate: 25.0,
        layers,
        assets,
        markers: Vec::new(),
        fonts: HashMap::new(),
        characters: HashMap::new(),
        warnings: Vec::new(),
    })
}

fn solid(name: &str, color: Rgba) -> LayerModel {
    LayerModel {
        name: Some(name.into()),
        id: None,
        parent: None,
        kind: LayerKind::Solid {
            color,
            size: Canvas::new(40, 40),
        },
        transform: TransformModel::default(),
        auto_orient: false,
        in_frame: 0.0,
        out_frame: 100.0,
        start_frame: 0.0,
        stretch: 1.0,
        blend_mode: BlendMode::Normal,
        matte: None,
        is_matte_source: false,
        masks: Vec::new(),
        effects: Vec::new(),
        hidden: false,
    }
}

fn red() -> Rgba {
    Rgba::opaque(1.0, 0.0, 0.0)
}

fn blue() -> Rgba {
    Rgba::opaque(0.0, 0.0, 1.0)
}

fn square(size: f64) -> ShapeData {
    ShapeData::new(
        vec![
            Point::ZERO,
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ],
        vec![Vec2::ZERO; 4],
        vec![Vec2::ZERO; 4],
        true,
    )
}

fn frame_of(composition: Arc<Composition>, progress: f32) -> DisplayList {
    let mut graph = CompositionGraph::build(composition, ColorMixing::Straight).unwrap();
    graph.set_progress(progress);
    let mut list = DisplayList::new();
    graph.draw(&mut list);
    list
}

fn frame(layers: Vec<LayerModel>, progress: f32) -> DisplayList {
    frame_of(build(layers), progress)
}

fn fill_color(command: &DrawCommand) -> Rgba {
    match command {
        DrawCommand::Fill {
            paint: Paint::Solid(color),
            ..
        } => *color,
        other => panic!("expected a solid fill, got {other:?}"),
    }
}

#[test]
fn solid_layers_fill_their_declared_size() {
    let list = frame(vec![solid("bg", red())], 0.0);
    assert_eq!(list.len(), 1);
    match &list.commands()[0] {
        DrawCommand::Fill {
            path,
            transform,
            alpha,
            ..
        } => {
            assert_eq!(path.bounding_box(), Canvas::new(40, 40).to_rect());
            assert_eq!(*transform, Affine::IDENTITY);
            assert_eq!(*alpha, 255);
        }
        other => panic!("expected a fill, got {other:?}"),
    }
}

#[test]
fn hidden_layers_never_draw() {
    let mut layer = solid("ghost", red());
    layer.hidden = true;
    assert!(frame(vec![layer], 0.5).is_empty());
}

#[test]
fn the_out_frame_is_exclusive() {
    let mut layer = solid("windowed", red());
    layer.in_frame = 25.0;
    layer.out_frame = 50.0;
    assert!(frame(vec![layer.clone()], 0.2).is_empty());
    assert_eq!(frame(vec![layer.clone()], 0.25).len(), 1);
    assert_eq!(frame(vec![layer.clone()], 0.3).len(), 1);
    assert!(frame(vec![layer], 0.5).is_empty());
}

#[test]
fn layers_draw_back_to_front() {
    let list = frame(vec![solid("top", red()), solid("bottom", blue())], 0.0);
    assert_eq!(list.len(), 2);
    assert_eq!(fill_color(&list.commands()[0]), blue());
    assert_eq!(fill_color(&list.commands()[1]), red());
}

#[test]
fn parent_chains_compose_transforms() {
    let mut anchor = solid("anchor", red());
    anchor.kind = LayerKind::Null;
    anchor.id = Some(7);
    anchor.transform.position = Some(PositionModel::Unified(track(Point::new(10.0, 0.0))));
    let mut leaf = solid("leaf", red());
    leaf.parent = Some(7);
    leaf.transform.position = Some(PositionModel::Unified(track(Point::new(5.0, 0.0))));

    let list = frame(vec![anchor, leaf], 0.0);
    assert_eq!(list.len(), 1);
    match &list.commands()[0] {
        DrawCommand::Fill { transform, .. } => {
            let [.., e, f] = transform.as_coeffs();
            assert_eq!(e, 15.0);
            assert_eq!(f, 0.0);
        }
        other => panic!("expected a fill, got {other:?}"),
    }
}

#[test]
fn layer_opacity_lands_on_the_content() {
    let mut layer = solid("faded", red());
    layer.transform.opacity = Some(track(50.0));
    let list = frame(vec![layer], 0.0);
    match &list.commands()[0] {
        DrawCommand::Fill { alpha, .. } => assert_eq!(*alpha, 128),
        other => panic!("expected a fill, got {other:?}"),
    }
}

#[test]
fn matte_consumers_sandwich_their_source() {
    let mut source = solid("mask art", blue());
    source.is_matte_source = true;
    let mut consumer = solid("matted", red());
    consumer.matte = Some(MatteType::Alpha);

    let list = frame(vec![source, consumer], 0.0);
    assert_eq!(list.len(), 5);
    let commands = list.commands();
    assert!(matches!(commands[0], DrawCommand::PushLayer { .. }));
    assert_eq!(fill_color(&commands[1]), red());
    assert!(matches!(
        commands[2],
        DrawCommand::BeginMatte {
            mode: MatteType::Alpha
        }
    ));
    assert_eq!(fill_color(&commands[3]), blue());
    assert!(matches!(commands[4], DrawCommand::PopLayer));
}

#[test]
fn additive_masks_merge_into_one_clip() {
    let mut layer = solid("masked", red());
    layer.masks = vec![
        MaskModel {
            mode: MaskMode::Add,
            path: track(square(20.0)),
            opacity: Some(track(50.0)),
            inverted: false,
        },
        MaskModel {
            mode: MaskMode::Add,
            path: track(square(35.0)),
            opacity: None,
            inverted: false,
        },
    ];

    let list = frame(vec![layer], 0.0);
    assert_eq!(list.len(), 3);
    match &list.commands()[0] {
        DrawCommand::PushClip {
            path,
            inverted,
            alpha,
            ..
        } => {
            assert!(!inverted);
            assert_eq!(*alpha, 128);
            let moves = path
                .elements()
                .iter()
                .filter(|el| matches!(el, PathEl::MoveTo(_)))
                .count();
            assert_eq!(moves, 2);
        }
        other => panic!("expected a clip, got {other:?}"),
    }
    assert!(matches!(list.commands()[1], DrawCommand::Fill { .. }));
    assert!(matches!(list.commands()[2], DrawCommand::PopClip));
}

#[test]
fn subtract_masks_push_an_inverted_clip() {
    let mut layer = solid("cut", red());
    layer.masks = vec![MaskModel {
        mode: MaskMode::Subtract,
        path: track(square(20.0)),
        opacity: None,
        inverted: false,
    }];

    let list = frame(vec![layer], 0.0);
    assert_eq!(list.len(), 3);
    assert!(matches!(
        list.commands()[0],
        DrawCommand::PushClip {
            inverted: true,
            alpha: 255,
            ..
        }
    ));
}

#[test]
fn inverted_add_masks_stay_separate_from_the_union() {
    let mut layer = solid("ringed", red());
    layer.masks = vec![
        MaskModel {
            mode: MaskMode::Add,
            path: track(square(20.0)),
            opacity: None,
            inverted: true,
        },
        MaskModel {
            mode: MaskMode::Add,
            path: track(square(35.0)),
            opacity: None,
            inverted: false,
        },
    ];

    let list = frame(vec![layer], 0.0);
    assert_eq!(list.len(), 5);
    assert!(matches!(
        list.commands()[0],
        DrawCommand::PushClip { inverted: true, .. }
    ));
    assert!(matches!(
        list.commands()[1],
        DrawCommand::PushClip {
            inverted: false,
            ..
        }
    ));
    assert!(matches!(list.commands()[2], DrawCommand::Fill { .. }));
    assert!(matches!(list.commands()[3], DrawCommand::PopClip));
    assert!(matches!(list.commands()[4], DrawCommand::PopClip));
}

#[test]
fn blend_modes_isolate_the_layer() {
    let mut layer = solid("screened", red());
    layer.blend_mode = BlendMode::Multiply;
    layer.transform.opacity = Some(track(50.0));

    let list = frame(vec![layer], 0.0);
    assert_eq!(list.len(), 3);
    match &list.commands()[0] {
        DrawCommand::PushLayer {
            alpha,
            blend,
            effects,
        } => {
            assert_eq!(*alpha, 128);
            assert_eq!(*blend, BlendMode::Multiply);
            assert!(effects.is_empty());
        }
        other => panic!("expected a group push, got {other:?}"),
    }
    // Opacity moved onto the group, so the content inside is full strength.
    match &list.commands()[1] {
        DrawCommand::Fill { alpha, .. } => assert_eq!(*alpha, 255),
        other => panic!("expected a fill, got {other:?}"),
    }
    assert!(matches!(list.commands()[2], DrawCommand::PopLayer));
}

#[test]
fn blur_effects_ride_on_the_group() {
    let mut layer = solid("soft", red());
    layer.effects = vec![EffectModel::GaussianBlur {
        radius: track(4.0),
    }];
    let list = frame(vec![layer], 0.0);
    assert_eq!(list.len(), 3);
    match &list.commands()[0] {
        DrawCommand::PushLayer { effects, .. } => match &effects[..] {
            [LayerEffect::Blur { radius }] => assert_eq!(*radius, 4.0),
            other => panic!("expected a blur, got {other:?}"),
        },
        other => panic!("expected a group push, got {other:?}"),
    }

    // A zero radius resolves to no effect and no isolation.
    let mut layer = solid("sharp", red());
    layer.effects = vec![EffectModel::GaussianBlur {
        radius: track(0.0),
    }];
    assert_eq!(frame(vec![layer], 0.0).len(), 1);
}

#[test]
fn drop_shadows_resolve_direction_into_an_offset() {
    let mut layer = solid("lit", red());
    layer.effects = vec![EffectModel::DropShadow {
        color: track(Rgba::opaque(0.0, 0.0, 0.0)),
        opacity: track(128.0),
        direction: track(90.0),
        distance: track(10.0),
        softness: track(3.0),
    }];

    let list = frame(vec![layer], 0.0);
    match &list.commands()[0] {
        DrawCommand::PushLayer { effects, .. } => match &effects[..] {
            [LayerEffect::DropShadow {
                color,
                offset,
                softness,
            }] => {
                assert!((offset.x - 10.0).abs() < 1e-6);
                assert!(offset.y.abs() < 1e-6);
                assert!((color.a - 128.0 / 255.0).abs() < 1e-6);
                assert_eq!(*softness, 3.0);
            }
            other => panic!("expected a drop shadow, got {other:?}"),
        },
        other => panic!("expected a group push, got {other:?}"),
    }
}

#[test]
fn precomps_clip_to_their_declared_size() {
    let asset = Asset::Precomp(PrecompAsset {
        layers: vec![solid("inner", blue())],
    });
    let outer = LayerModel {
        kind: LayerKind::Precomp {
            asset: "badge".into(),
            size: Canvas::new(50, 50),
            time_remap: None,
        },
        ..solid("nested", red())
    };
    let composition = with_assets(vec![outer], HashMap::from([("badge".into(), asset)]));

    let list = frame_of(composition, 0.0);
    assert_eq!(list.len(), 3);
    match &list.commands()[0] {
        DrawCommand::PushClip {
            path,
            inverted,
            alpha,
            ..
        } => {
            assert_eq!(path.bounding_box(), Canvas::new(50, 50).to_rect());
            assert!(!inverted);
            assert_eq!(*alpha, 255);
        }
        other => panic!("expected a clip, got {other:?}"),
    }
    assert_eq!(fill_color(&list.commands()[1]), blue());
    assert!(matches!(list.commands()[2], DrawCommand::PopClip));
}

#[test]
fn time_remap_drives_the_nested_clock() {
    let mut inner = solid("inner", blue());
    inner.out_frame = 50.0;
    let asset = Asset::Precomp(PrecompAsset {
        layers: vec![inner],
    });
    let layer = |seconds: f32| LayerModel {
        kind: LayerKind::Precomp {
            asset: "reel".into(),
            size: Canvas::new(50, 50),
            time_remap: Some(track(seconds)),
        },
        ..solid("remapped", red())
    };

    // One second at 25 fps lands on frame 25, inside the inner window.
    let early = with_assets(
        vec![layer(1.0)],
        HashMap::from([("reel".into(), asset.clone())]),
    );
    assert_eq!(frame_of(early, 0.0).len(), 3);

    // Three seconds lands on frame 75, past the inner out frame.
    let late = with_assets(vec![layer(3.0)], HashMap::from([("reel".into(), asset)]));
    assert_eq!(frame_of(late, 0.0).len(), 2);
}

#[test]
fn missing_precomp_assets_fall_back_to_null() {
    let layer = LayerModel {
        kind: LayerKind::Precomp {
            asset: "nowhere".into(),
            size: Canvas::new(50, 50),
            time_remap: None,
        },
        ..solid("dangling", red())
    };
    assert!(frame(vec![layer], 0.0).is_empty());
}

#[test]
fn recursive_precomps_drop_the_inner_reference() {
    let reference = LayerModel {
        kind: LayerKind::Precomp {
            asset: "loop".into(),
            size: Canvas::new(50, 50),
            time_remap: None,
        },
        ..solid("self", red())
    };
    let asset = Asset::Precomp(PrecompAsset {
        layers: vec![reference.clone()],
    });
    let composition = with_assets(vec![reference], HashMap::from([("loop".into(), asset)]));

    // The outer reference still clips; the inner one resolves to nothing.
    let list = frame_of(composition, 0.0);
    assert_eq!(list.len(), 2);
    assert!(matches!(list.commands()[0], DrawCommand::PushClip { .. }));
    assert!(matches!(list.commands()[1], DrawCommand::PopClip));
}
