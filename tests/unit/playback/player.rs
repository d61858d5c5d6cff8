use super::*;

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::animation::keyframe::Keyframe;
use crate::animation::value::Interpolate;
use crate::composition::model::{
    BlendMode, FillModel, FillRule, LayerKind, LayerModel, Marker, RectangleModel, ShapeModel,
    Track, TransformModel,
};
use crate::foundation::core::Canvas;
use crate::render::display_list::{DrawCommand, Paint};

fn track<T: Interpolate>(value: T) -> Track<T> {
    Arc::new(vec![Keyframe::constant(value)])
}

fn shape_layer(name: &str) -> LayerModel {
    let shapes = vec![
        ShapeModel::Rectangle(RectangleModel {
            name: None,
            position: track(Point::new(20.0, 20.0)),
            size: track(Point::new(40.0, 40.0)),
            radius: track(0.0),
            reversed: false,
        }),
        ShapeModel::Fill(FillModel {
            name: Some("tint".into()),
            color: track(Rgba::opaque(1.0, 0.0, 0.0)),
            opacity: None,
            rule: FillRule::NonZero,
        }),
    ];
    LayerModel {
        name: Some(name.into()),
        id: None,
        parent: None,
        kind: LayerKind::Shape { shapes },
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

fn composition(layers: Vec<LayerModel>, markers: Vec<Marker>) -> Arc<Composition> {
    Arc::new(Composition {
        name: None,
        version: None,
        canvas: Canvas::new(100, 100),
        range: crate::foundation::core::FrameRange::new(0.0, 100.0).unwrap(),
        frame_rate: 32.0,
        layers,
        assets: HashMap::new(),
        markers,
        fonts: HashMap::new(),
        characters: HashMap::new(),
        warnings: Vec::new(),
    })
}

fn fill_colors(list: &DisplayList) -> Vec<Rgba> {
    list.commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Fill {
                paint: Paint::Solid(color),
                ..
            } => Some(*color),
            _ => None,
        })
        .collect()
}

#[test]
fn control_calls_queue_until_a_composition_attaches() {
    let mut player = Player::new();
    player.play();
    player.set_frame(40.0);
    assert!(!player.is_attached());
    assert_eq!(player.state(), ClockState::Idle);

    player
        .set_composition(composition(vec![shape_layer("hero")], Vec::new()))
        .unwrap();
    assert!(player.is_running());
    assert_eq!(player.frame(), 40.0);
}

#[test]
fn clock_settings_survive_attachment() {
    let mut player = Player::new();
    player.set_speed(2.0);
    player.set_repeat_mode(RepeatMode::Reverse);
    player.set_repeat_count(None);

    player
        .set_composition(composition(Vec::new(), Vec::new()))
        .unwrap();
    assert_eq!(player.speed(), 2.0);
    assert_eq!(player.repeat_mode(), RepeatMode::Reverse);
    assert_eq!(player.repeat_count(), None);

    player.play();
    player.tick(Duration::from_millis(250));
    assert_eq!(player.frame(), 16.0);
}

#[test]
fn marker_bounds_come_from_the_composition() {
    let markers = vec![Marker {
        name: "intro".into(),
        start_frame: 30.0,
        duration_frames: 45.0,
    }];
    let mut player = Player::new();
    player
        .set_composition(composition(Vec::new(), markers))
        .unwrap();

    player.set_min_and_max_frame_by_marker("intro").unwrap();
    assert_eq!(player.min_frame(), Some(30.0));
    assert_eq!(player.max_frame(), Some(75.0));

    let error = player.set_min_and_max_frame_by_marker("outro");
    assert!(matches!(error, Err(AnimyteError::Configuration(_))));
}

#[test]
fn queued_marker_bounds_fail_on_attach_when_unknown() {
    let mut player = Player::new();
    player.set_min_and_max_frame_by_marker("missing").unwrap();

    let error = player.set_composition(composition(Vec::new(), Vec::new()));
    assert!(matches!(error, Err(AnimyteError::Configuration(_))));
}

#[test]
fn rendering_requires_an_attachment() {
    let mut player = Player::new();
    assert!(matches!(
        player.display_list(),
        Err(AnimyteError::Configuration(_))
    ));

    player
        .set_composition(composition(vec![shape_layer("hero")], Vec::new()))
        .unwrap();
    assert_eq!(player.display_list().unwrap().len(), 1);
}

#[test]
fn cancel_and_end_notify_listeners() {
    let fired = Rc::new(Cell::new(0u32));
    let observed = Rc::clone(&fired);
    let mut player = Player::new();
    player.add_end_listener(Box::new(move || observed.set(observed.get() + 1)));
    player
        .set_composition(composition(Vec::new(), Vec::new()))
        .unwrap();

    player.play();
    player.cancel();
    assert_eq!(fired.get(), 1);
    assert_eq!(player.state(), ClockState::Cancelled);

    player.play();
    player.end();
    assert_eq!(fired.get(), 2);
    assert_eq!(player.state(), ClockState::Ended);
}

#[test]
fn finishing_ticks_notify_listeners() {
    let fired = Rc::new(Cell::new(0u32));
    let observed = Rc::clone(&fired);
    let mut player = Player::new();
    player.add_end_listener(Box::new(move || observed.set(observed.get() + 1)));
    player
        .set_composition(composition(Vec::new(), Vec::new()))
        .unwrap();

    player.play();
    let outcome = player.tick(Duration::from_secs(10));
    assert!(outcome.ended);
    assert_eq!(fired.get(), 1);
    assert_eq!(player.state(), ClockState::Ended);
}

#[test]
fn color_overrides_reach_every_matching_fill() {
    let mut player = Player::new();
    player
        .set_composition(composition(
            vec![shape_layer("hero"), shape_layer("villain")],
            Vec::new(),
        ))
        .unwrap();

    let blue = Rgba::opaque(0.0, 0.0, 1.0);
    let path = KeyPath::new(["*", "tint"]);
    let applied = player.override_color(&path, Arc::new(move |_| blue));
    assert_eq!(applied, 2);

    let colors = fill_colors(player.display_list().unwrap());
    assert_eq!(colors, vec![blue, blue]);
}

#[test]
fn position_overrides_move_the_layer() {
    let mut player = Player::new();
    player
        .set_composition(composition(vec![shape_layer("hero")], Vec::new()))
        .unwrap();

    let path = KeyPath::new(["hero"]);
    let applied = player.override_position(&path, Arc::new(|_| Point::new(10.0, 20.0)));
    assert_eq!(applied, 1);

    match &player.display_list().unwrap().commands()[0] {
        DrawCommand::Fill { transform, .. } => {
            let [.., e, f] = transform.as_coeffs();
            assert_eq!(e, 10.0);
            assert_eq!(f, 20.0);
        }
        other => panic!("expected a fill, got {other:?}"),
    }
}

#[test]
fn overrides_report_zero_when_nothing_matches() {
    let mut player = Player::new();
    player
        .set_composition(composition(vec![shape_layer("hero")], Vec::new()))
        .unwrap();

    let path = KeyPath::new(["sidekick"]);
    let applied = player.override_rotation(&path, Arc::new(|_| 45.0));
    assert_eq!(applied, 0);
}
