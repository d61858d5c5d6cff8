use super::*;

use std::collections::HashMap;

use kurbo::{Rect, Shape};

use crate::foundation::core::{FrameRange, Rgba};
use crate::foundation::error::AnimyteError;

#[derive(Default)]
struct LogSurface {
    calls: Vec<String>,
    fail_on_fill: bool,
}

impl DrawSurface for LogSurface {
    fn begin_frame(&mut self, canvas: Canvas) -> AnimyteResult<()> {
        self.calls.push(format!("begin {}x{}", canvas.width, canvas.height));
        Ok(())
    }

    fn fill_path(
        &mut self,
        _path: &BezPath,
        _transform: Affine,
        _paint: &Paint,
        _rule: FillRule,
        alpha: u8,
    ) -> AnimyteResult<()> {
        if self.fail_on_fill {
            return Err(AnimyteError::render("fill rejected"));
        }
        self.calls.push(format!("fill a={alpha}"));
        Ok(())
    }

    fn stroke_path(
        &mut self,
        _path: &BezPath,
        _transform: Affine,
        _style: &StrokeStyle,
        _paint: &Paint,
        _alpha: u8,
    ) -> AnimyteResult<()> {
        self.calls.push("stroke".into());
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &ImageAsset,
        _transform: Affine,
        _alpha: u8,
    ) -> AnimyteResult<()> {
        self.calls.push(format!("image {}", image.file));
        Ok(())
    }

    fn push_layer(
        &mut self,
        alpha: u8,
        _blend: BlendMode,
        _effects: &[LayerEffect],
    ) -> AnimyteResult<()> {
        self.calls.push(format!("push_layer a={alpha}"));
        Ok(())
    }

    fn begin_matte(&mut self, _mode: MatteType) -> AnimyteResult<()> {
        self.calls.push("begin_matte".into());
        Ok(())
    }

    fn pop_layer(&mut self) -> AnimyteResult<()> {
        self.calls.push("pop_layer".into());
        Ok(())
    }

    fn push_clip(
        &mut self,
        _path: &BezPath,
        _transform: Affine,
        inverted: bool,
        _alpha: u8,
    ) -> AnimyteResult<()> {
        self.calls.push(format!("push_clip inv={inverted}"));
        Ok(())
    }

    fn pop_clip(&mut self) -> AnimyteResult<()> {
        self.calls.push("pop_clip".into());
        Ok(())
    }

    fn end_frame(&mut self) -> AnimyteResult<()> {
        self.calls.push("end".into());
        Ok(())
    }
}

fn empty_composition(assets: HashMap<String, Asset>) -> Composition {
    Composition {
        name: None,
        version: None,
        canvas: Canvas::new(64, 48),
        range: FrameRange::new(0.0, 10.0).unwrap(),
        frame_rate: 30.0,
        layers: Vec::new(),
        assets,
        markers: Vec::new(),
        fonts: HashMap::new(),
        characters: HashMap::new(),
        warnings: Vec::new(),
    }
}

fn fill_command() -> DrawCommand {
    DrawCommand::Fill {
        path: Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
        transform: Affine::IDENTITY,
        paint: Paint::Solid(Rgba::opaque(1.0, 0.0, 0.0)),
        rule: FillRule::NonZero,
        alpha: 200,
    }
}

#[test]
fn replay_visits_commands_in_order() {
    let mut list = DisplayList::new();
    list.push(DrawCommand::PushLayer {
        alpha: 128,
        blend: BlendMode::Normal,
        effects: Vec::new(),
    });
    list.push(fill_command());
    list.push(DrawCommand::PopLayer);

    let mut surface = LogSurface::default();
    replay(&mut surface, &list, &empty_composition(HashMap::new())).unwrap();
    assert_eq!(
        surface.calls,
        [
            "begin 64x48",
            "push_layer a=128",
            "fill a=200",
            "pop_layer",
            "end",
        ]
    );
}

#[test]
fn image_commands_resolve_through_the_composition() {
    let asset = Asset::Image(ImageAsset {
        width: 32,
        height: 32,
        file: "hero.png".into(),
        directory: "images/".into(),
    });
    let composition = empty_composition(HashMap::from([("img_0".into(), asset)]));

    let mut list = DisplayList::new();
    list.push(DrawCommand::Image {
        asset: "img_0".into(),
        transform: Affine::IDENTITY,
        alpha: 255,
    });
    list.push(DrawCommand::Image {
        asset: "missing".into(),
        transform: Affine::IDENTITY,
        alpha: 255,
    });

    let mut surface = LogSurface::default();
    replay(&mut surface, &list, &composition).unwrap();
    // The dangling reference is skipped, not fatal.
    assert_eq!(surface.calls, ["begin 64x48", "image hero.png", "end"]);
}

#[test]
fn merged_fills_fall_back_to_one_concatenated_fill() {
    let mut list = DisplayList::new();
    list.push(DrawCommand::FillMerged {
        operands: vec![
            Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
            Rect::new(2.0, 2.0, 8.0, 8.0).to_path(0.1),
        ],
        mode: MergeMode::Subtract,
        transform: Affine::IDENTITY,
        paint: Paint::Solid(Rgba::opaque(0.0, 0.0, 0.0)),
        rule: FillRule::NonZero,
        alpha: 255,
    });

    let mut surface = LogSurface::default();
    replay(&mut surface, &list, &empty_composition(HashMap::new())).unwrap();
    // The default trait method collapses the operands into one fill.
    assert_eq!(surface.calls, ["begin 64x48", "fill a=255", "end"]);
}

#[test]
fn surfaces_with_path_booleans_see_the_operator() {
    #[derive(Default)]
    struct BooleanSurface {
        seen: Option<(MergeMode, usize)>,
    }

    impl DrawSurface for BooleanSurface {
        fn fill_path(
            &mut self,
            _path: &BezPath,
            _transform: Affine,
            _paint: &Paint,
            _rule: FillRule,
            _alpha: u8,
        ) -> AnimyteResult<()> {
            panic!("the merged override should intercept the command");
        }

        fn fill_merged(
            &mut self,
            operands: &[BezPath],
            mode: MergeMode,
            _transform: Affine,
            _paint: &Paint,
            _rule: FillRule,
            _alpha: u8,
        ) -> AnimyteResult<()> {
            self.seen = Some((mode, operands.len()));
            Ok(())
        }

        fn stroke_path(
            &mut self,
            _path: &BezPath,
            _transform: Affine,
            _style: &StrokeStyle,
            _paint: &Paint,
            _alpha: u8,
        ) -> AnimyteResult<()> {
            Ok(())
        }

        fn draw_image(
            &mut self,
            _image: &ImageAsset,
            _transform: Affine,
            _alpha: u8,
        ) -> AnimyteResult<()> {
            Ok(())
        }

        fn push_layer(
            &mut self,
            _alpha: u8,
            _blend: BlendMode,
            _effects: &[LayerEffect],
        ) -> AnimyteResult<()> {
            Ok(())
        }

        fn begin_matte(&mut self, _mode: MatteType) -> AnimyteResult<()> {
            Ok(())
        }

        fn pop_layer(&mut self) -> AnimyteResult<()> {
            Ok(())
        }

        fn push_clip(
            &mut self,
            _path: &BezPath,
            _transform: Affine,
            _inverted: bool,
            _alpha: u8,
        ) -> AnimyteResult<()> {
            Ok(())
        }

        fn pop_clip(&mut self) -> AnimyteResult<()> {
            Ok(())
        }
    }

    let mut list = DisplayList::new();
    list.push(DrawCommand::FillMerged {
        operands: vec![
            Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
            Rect::new(2.0, 2.0, 8.0, 8.0).to_path(0.1),
            Rect::new(4.0, 4.0, 6.0, 6.0).to_path(0.1),
        ],
        mode: MergeMode::Intersect,
        transform: Affine::IDENTITY,
        paint: Paint::Solid(Rgba::opaque(0.0, 0.0, 0.0)),
        rule: FillRule::NonZero,
        alpha: 255,
    });

    let mut surface = BooleanSurface::default();
    replay(&mut surface, &list, &empty_composition(HashMap::new())).unwrap();
    assert_eq!(surface.seen, Some((MergeMode::Intersect, 3)));
}

#[test]
fn surface_errors_stop_the_replay() {
    let mut list = DisplayList::new();
    list.push(fill_command());
    list.push(DrawCommand::PopLayer);

    let mut surface = LogSurface {
        fail_on_fill: true,
        ..LogSurface::default()
    };
    let error = replay(&mut surface, &list, &empty_composition(HashMap::new()));
    assert!(matches!(error, Err(AnimyteError::Render(_))));
    assert_eq!(surface.calls, ["begin 64x48"]);
}
