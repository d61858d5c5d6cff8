//! Runtime layer graph: per-layer animators instantiated from the parsed
//! composition, progress propagation, and the back-to-front draw walk that
//! records a frame's display list.
//!
//! Layers live in an arena per stack; parent links are ids resolved through
//! the stack's index, so transform chains follow `parent` hops instead of
//! owning pointers. Precomp layers own a nested stack and translate the
//! incoming progress into the asset's local timeline before recursing.

pub mod text;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use kurbo::{Affine, BezPath, Shape};
use smallvec::SmallVec;
use tracing::warn;

use crate::animation::color::{ColorAnimator, ColorMixing};
use crate::animation::transform::{percent_to_alpha, TransformAnimator};
use crate::animation::value::AnimatedValue;
use crate::composition::model::{
    Asset, BlendMode, Composition, EffectModel, FillRule, LayerKind, LayerModel, MaskMode,
    MaskModel, MatteType,
};
use crate::content::{animated, build_content, combine_alpha, opt_animated, ContentGroup};
use crate::content::shape_data::ShapeData;
use crate::foundation::core::{Canvas, FrameRange, Rgba, Vec2};
use crate::foundation::error::AnimyteResult;
use crate::layer::text::TextContent;
use crate::perf::PerformanceTracker;
use crate::render::display_list::{DisplayList, DrawCommand, LayerEffect, Paint};

/// The whole evaluated animation: the root layer stack plus the parsed
/// composition it was instantiated from.
#[derive(Debug)]
pub(crate) struct CompositionGraph {
    composition: Arc<Composition>,
    stack: LayerStack,
}

impl CompositionGraph {
    /// Instantiate animators for every layer of `composition`.
    pub(crate) fn build(
        composition: Arc<Composition>,
        mixing: ColorMixing,
    ) -> AnimyteResult<Self> {
        let mut visiting = Vec::new();
        let stack = LayerStack::build(&composition.layers, &composition, mixing, &mut visiting)?;
        Ok(Self { composition, stack })
    }

    /// The composition this graph was built from.
    pub(crate) fn composition(&self) -> &Arc<Composition> {
        &self.composition
    }

    /// Drive every animated value to `progress`. Returns whether anything
    /// resolved may have changed since the last call.
    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        self.stack.set_progress(progress)
    }

    /// Record the frame at the current progress.
    pub(crate) fn draw(&mut self, list: &mut DisplayList) {
        self.stack.draw(list, Affine::IDENTITY, 255);
    }

    /// Record the frame, timing each root layer into `tracker`.
    pub(crate) fn draw_tracked(&mut self, list: &mut DisplayList, tracker: &mut PerformanceTracker) {
        self.stack
            .draw_inner(list, Affine::IDENTITY, 255, Some(tracker));
    }

    pub(crate) fn stack_mut(&mut self) -> &mut LayerStack {
        &mut self.stack
    }
}

/// One instantiated layer stack: an arena of nodes in document order
/// (topmost first) plus an id lookup for parent chains.
#[derive(Debug)]
pub(crate) struct LayerStack {
    layers: Vec<LayerNode>,
    index: HashMap<u32, usize>,
}

impl LayerStack {
    fn build(
        models: &[LayerModel],
        composition: &Arc<Composition>,
        mixing: ColorMixing,
        visiting: &mut Vec<String>,
    ) -> AnimyteResult<Self> {
        let mut layers = Vec::with_capacity(models.len());
        let mut index = HashMap::new();
        for model in models {
            if let Some(id) = model.id {
                index.insert(id, layers.len());
            }
            layers.push(LayerNode::build(model, composition, mixing, visiting)?);
        }
        Ok(Self { layers, index })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = false;
        for layer in &mut self.layers {
            changed |= layer.set_progress(progress);
        }
        changed
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [LayerNode] {
        &mut self.layers
    }

    fn draw(&mut self, list: &mut DisplayList, parent: Affine, parent_alpha: u8) {
        self.draw_inner(list, parent, parent_alpha, None);
    }

    /// Record the stack back-to-front: the last layer of the document draws
    /// first, matte sources draw only through their consumer. With a tracker,
    /// each layer's record time feeds its running mean.
    fn draw_inner(
        &mut self,
        list: &mut DisplayList,
        parent: Affine,
        parent_alpha: u8,
        mut tracker: Option<&mut PerformanceTracker>,
    ) {
        // Local matrices up front, so parent chains read them immutably.
        let locals: Vec<Affine> = self
            .layers
            .iter_mut()
            .map(|layer| layer.transform.matrix())
            .collect();
        for i in (0..self.layers.len()).rev() {
            if self.layers[i].is_matte_source {
                continue;
            }
            let started = tracker.is_some().then(Instant::now);
            let matrix = parent * self.chained(i, &locals);
            let matte = self.layers[i]
                .matte
                .and_then(|mode| i.checked_sub(1).map(|source| (mode, source)));
            match matte {
                Some((mode, source)) => {
                    let source_matrix = parent * self.chained(source, &locals);
                    let (before, rest) = self.layers.split_at_mut(i);
                    rest[0].draw_matted(
                        list,
                        matrix,
                        parent_alpha,
                        mode,
                        &mut before[source],
                        source_matrix,
                    );
                }
                None => self.layers[i].draw(list, matrix, parent_alpha),
            }
            if let (Some(tracker), Some(started)) = (tracker.as_deref_mut(), started) {
                let name = self.layers[i].name().unwrap_or("unnamed");
                tracker.record_layer_time(name, started.elapsed().as_secs_f32() * 1000.0);
            }
        }
    }

    /// Ancestor matrices (farthest first) concatenated with the layer's own.
    /// Parent chains are resolved per draw, never cached across frames.
    fn chained(&self, index: usize, locals: &[Affine]) -> Affine {
        let mut chain: SmallVec<[usize; 4]> = SmallVec::new();
        let mut cursor = self.layers[index].parent;
        while let Some(id) = cursor {
            let Some(&at) = self.index.get(&id) else { break };
            // Malformed documents can cycle; stop once every layer was seen.
            if chain.len() > self.layers.len() {
                break;
            }
            chain.push(at);
            cursor = self.layers[at].parent;
        }
        let mut matrix = Affine::IDENTITY;
        for &at in chain.iter().rev() {
            matrix *= locals[at];
        }
        matrix * locals[index]
    }
}

/// One runtime layer.
#[derive(Debug)]
pub(crate) struct LayerNode {
    name: Option<String>,
    parent: Option<u32>,
    transform: TransformAnimator,
    in_progress: f32,
    out_progress: f32,
    progress: f32,
    blend_mode: BlendMode,
    matte: Option<MatteType>,
    is_matte_source: bool,
    hidden: bool,
    masks: Vec<MaskAnimator>,
    effects: Vec<EffectAnimator>,
    payload: LayerPayload,
}

impl LayerNode {
    fn build(
        model: &LayerModel,
        composition: &Arc<Composition>,
        mixing: ColorMixing,
        visiting: &mut Vec<String>,
    ) -> AnimyteResult<Self> {
        let payload = LayerPayload::build(model, composition, mixing, visiting)?;
        let masks = model
            .masks
            .iter()
            .map(MaskAnimator::new)
            .collect::<AnimyteResult<Vec<_>>>()?;
        let effects = model
            .effects
            .iter()
            .map(|effect| EffectAnimator::new(effect, mixing))
            .collect::<AnimyteResult<Vec<_>>>()?;

        // In/out are authored against the owning timeline; stretch rescales
        // them the same way it rescales the local clock.
        let range = composition.range;
        let duration = range.duration_frames();
        let (in_progress, out_progress) = if duration > 0.0 {
            (
                (model.in_frame / model.stretch - range.start) / duration,
                (model.out_frame / model.stretch - range.start) / duration,
            )
        } else {
            (0.0, f32::MAX)
        };

        Ok(Self {
            name: model.name.clone(),
            parent: model.parent,
            transform: TransformAnimator::from_model(&model.transform, model.auto_orient)?,
            in_progress,
            out_progress,
            progress: 0.0,
            blend_mode: model.blend_mode,
            matte: model.matte,
            is_matte_source: model.is_matte_source,
            hidden: model.hidden,
            masks,
            effects,
            payload,
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn transform_mut(&mut self) -> &mut TransformAnimator {
        &mut self.transform
    }

    pub(crate) fn payload_mut(&mut self) -> &mut LayerPayload {
        &mut self.payload
    }

    fn set_progress(&mut self, progress: f32) -> bool {
        let was_visible = self.visible();
        self.progress = progress;
        let mut changed = self.transform.set_progress(progress);
        for mask in &mut self.masks {
            changed |= mask.set_progress(progress);
        }
        for effect in &mut self.effects {
            changed |= effect.set_progress(progress);
        }
        changed |= self.payload.set_progress(progress);
        changed | (was_visible != self.visible())
    }

    /// Whether the layer draws at the current progress. The window is
    /// half-open: a layer is gone on its out frame.
    fn visible(&self) -> bool {
        !self.hidden && self.progress >= self.in_progress && self.progress < self.out_progress
    }

    fn draw(&mut self, list: &mut DisplayList, matrix: Affine, parent_alpha: u8) {
        if !self.visible() || matches!(self.payload, LayerPayload::Null) {
            return;
        }
        let alpha = combine_alpha(parent_alpha, self.transform.opacity());
        let effects = self.resolved_effects();
        let isolate = !effects.is_empty() || self.blend_mode != BlendMode::Normal;
        if isolate {
            // The group composites with the layer alpha; content inside
            // draws at full strength so opacity is not applied twice.
            list.push(DrawCommand::PushLayer {
                alpha,
                blend: self.blend_mode,
                effects,
            });
        }
        let clips = self.push_masks(list, matrix);
        let content_alpha = if isolate { 255 } else { alpha };
        self.payload.draw(list, matrix, content_alpha);
        for _ in 0..clips {
            list.push(DrawCommand::PopClip);
        }
        if isolate {
            list.push(DrawCommand::PopLayer);
        }
    }

    /// Draw through a matte: the layer's content records first, then the
    /// source, and the pop composites content gated by the source.
    fn draw_matted(
        &mut self,
        list: &mut DisplayList,
        matrix: Affine,
        parent_alpha: u8,
        mode: MatteType,
        source: &mut LayerNode,
        source_matrix: Affine,
    ) {
        if !self.visible() {
            return;
        }
        let alpha = combine_alpha(parent_alpha, self.transform.opacity());
        list.push(DrawCommand::PushLayer {
            alpha,
            blend: self.blend_mode,
            effects: self.resolved_effects(),
        });
        let clips = self.push_masks(list, matrix);
        self.payload.draw(list, matrix, 255);
        for _ in 0..clips {
            list.push(DrawCommand::PopClip);
        }
        list.push(DrawCommand::BeginMatte { mode });
        source.draw(list, source_matrix, 255);
        list.push(DrawCommand::PopLayer);
    }

    /// Record the layer's mask clips. Returns how many clips were pushed.
    fn push_masks(&mut self, list: &mut DisplayList, matrix: Affine) -> usize {
        let mut pushed = 0;
        let mut union = BezPath::new();
        let mut union_alpha = 255u8;
        for mask in &mut self.masks {
            match mask.mode {
                MaskMode::None => continue,
                MaskMode::Add if !mask.inverted => {
                    // Additive masks merge into one union clip.
                    for el in mask.path.value().to_path().elements() {
                        union.push(*el);
                    }
                    union_alpha = union_alpha.min(mask.alpha());
                }
                MaskMode::Add => {
                    let path = mask.path.value().to_path();
                    let alpha = mask.alpha();
                    list.push(DrawCommand::PushClip {
                        path,
                        transform: matrix,
                        inverted: true,
                        alpha,
                    });
                    pushed += 1;
                }
                MaskMode::Subtract => {
                    let path = mask.path.value().to_path();
                    let alpha = mask.alpha();
                    list.push(DrawCommand::PushClip {
                        path,
                        transform: matrix,
                        inverted: !mask.inverted,
                        alpha,
                    });
                    pushed += 1;
                }
                MaskMode::Intersect => {
                    let path = mask.path.value().to_path();
                    let alpha = mask.alpha();
                    list.push(DrawCommand::PushClip {
                        path,
                        transform: matrix,
                        inverted: mask.inverted,
                        alpha,
                    });
                    pushed += 1;
                }
            }
        }
        if !union.elements().is_empty() {
            list.push(DrawCommand::PushClip {
                path: union,
                transform: matrix,
                inverted: false,
                alpha: union_alpha,
            });
            pushed += 1;
        }
        pushed
    }

    fn resolved_effects(&mut self) -> Vec<LayerEffect> {
        self.effects
            .iter_mut()
            .filter_map(EffectAnimator::resolve)
            .collect()
    }
}

/// Type-specific layer state.
#[derive(Debug)]
pub(crate) enum LayerPayload {
    /// Shape stack content tree.
    Shape(ContentGroup),
    /// Flat color rectangle.
    Solid { color: Rgba, size: Canvas },
    /// Bitmap reference resolved by the embedder.
    Image { asset: String },
    /// Transform-only parenting target.
    Null,
    /// Styled text resolved against embedded glyphs.
    Text(TextContent),
    /// Nested stack with its own clock adjustments.
    Precomp {
        stack: LayerStack,
        size: Canvas,
        time_remap: Option<AnimatedValue<f32>>,
        start_frame: f32,
        stretch: f32,
        frame_rate: f32,
        range: FrameRange,
    },
}

impl LayerPayload {
    fn build(
        model: &LayerModel,
        composition: &Arc<Composition>,
        mixing: ColorMixing,
        visiting: &mut Vec<String>,
    ) -> AnimyteResult<Self> {
        Ok(match &model.kind {
            LayerKind::Shape { shapes } => Self::Shape(build_content(shapes, mixing)?),
            LayerKind::Solid { color, size } => Self::Solid {
                color: *color,
                size: *size,
            },
            LayerKind::Image { asset } => {
                if composition.asset(asset).is_none() {
                    warn!(%asset, "image layer references a missing asset");
                }
                Self::Image {
                    asset: asset.clone(),
                }
            }
            LayerKind::Null => Self::Null,
            LayerKind::Text { documents } => Self::Text(TextContent::new(
                documents,
                Arc::clone(composition),
                mixing,
            )?),
            LayerKind::Precomp {
                asset,
                size,
                time_remap,
            } => match composition.asset(asset) {
                Some(Asset::Precomp(precomp)) if !visiting.contains(asset) => {
                    visiting.push(asset.clone());
                    let stack = LayerStack::build(&precomp.layers, composition, mixing, visiting)?;
                    visiting.pop();
                    Self::Precomp {
                        stack,
                        size: *size,
                        time_remap: opt_animated(time_remap)?,
                        start_frame: model.start_frame,
                        stretch: model.stretch,
                        frame_rate: composition.frame_rate,
                        range: composition.range,
                    }
                }
                Some(Asset::Precomp(_)) => {
                    warn!(%asset, "recursive precomp reference; layer dropped");
                    Self::Null
                }
                Some(Asset::Image(_)) => {
                    warn!(%asset, "precomp layer references an image asset");
                    Self::Null
                }
                None => {
                    warn!(%asset, "precomp layer references a missing asset");
                    Self::Null
                }
            },
        })
    }

    fn set_progress(&mut self, progress: f32) -> bool {
        match self {
            Self::Shape(content) => content.set_progress(progress),
            Self::Text(text) => text.set_progress(progress),
            Self::Precomp {
                stack,
                time_remap,
                start_frame,
                stretch,
                frame_rate,
                range,
                ..
            } => {
                let duration = range.duration_frames();
                let mut local = progress;
                if let Some(remap) = time_remap.as_mut() {
                    // The remap track yields seconds of the asset timeline.
                    remap.set_progress(progress);
                    local = (remap.value() * *frame_rate - range.start) / (duration + 0.01);
                }
                if *stretch != 0.0 {
                    local /= *stretch;
                }
                if duration > 0.0 {
                    local -= *start_frame / duration;
                }
                stack.set_progress(local)
            }
            Self::Solid { .. } | Self::Image { .. } | Self::Null => false,
        }
    }

    fn draw(&mut self, list: &mut DisplayList, matrix: Affine, alpha: u8) {
        match self {
            Self::Shape(content) => content.draw(list, matrix, alpha),
            Self::Solid { color, size } => list.push(DrawCommand::Fill {
                path: size.to_rect().to_path(0.1),
                transform: matrix,
                paint: Paint::Solid(*color),
                rule: FillRule::NonZero,
                alpha,
            }),
            Self::Image { asset } => list.push(DrawCommand::Image {
                asset: asset.clone(),
                transform: matrix,
                alpha,
            }),
            Self::Text(text) => text.draw(list, matrix, alpha),
            Self::Precomp { stack, size, .. } => {
                // Nested content clips to the precomp's declared bounds.
                list.push(DrawCommand::PushClip {
                    path: size.to_rect().to_path(0.1),
                    transform: matrix,
                    inverted: false,
                    alpha: 255,
                });
                stack.draw(list, matrix, alpha);
                list.push(DrawCommand::PopClip);
            }
            Self::Null => {}
        }
    }
}

/// One animated mask.
#[derive(Debug)]
struct MaskAnimator {
    mode: MaskMode,
    path: AnimatedValue<ShapeData>,
    opacity: Option<AnimatedValue<f32>>,
    inverted: bool,
}

impl MaskAnimator {
    fn new(model: &MaskModel) -> AnimyteResult<Self> {
        Ok(Self {
            mode: model.mode,
            path: animated(&model.path)?,
            opacity: opt_animated(&model.opacity)?,
            inverted: model.inverted,
        })
    }

    fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.path.set_progress(progress);
        if let Some(opacity) = self.opacity.as_mut() {
            changed |= opacity.set_progress(progress);
        }
        changed
    }

    fn alpha(&mut self) -> u8 {
        match self.opacity.as_mut() {
            Some(opacity) => percent_to_alpha(opacity.value()),
            None => 255,
        }
    }
}

/// One animated layer effect.
#[derive(Debug)]
enum EffectAnimator {
    Blur {
        radius: AnimatedValue<f32>,
    },
    DropShadow {
        color: ColorAnimator,
        opacity: AnimatedValue<f32>,
        direction: AnimatedValue<f32>,
        distance: AnimatedValue<f32>,
        softness: AnimatedValue<f32>,
    },
}

impl EffectAnimator {
    fn new(model: &EffectModel, mixing: ColorMixing) -> AnimyteResult<Self> {
        Ok(match model {
            EffectModel::GaussianBlur { radius } => Self::Blur {
                radius: animated(radius)?,
            },
            EffectModel::DropShadow {
                color,
                opacity,
                direction,
                distance,
                softness,
            } => Self::DropShadow {
                color: ColorAnimator::new(Arc::clone(color), mixing)?,
                opacity: animated(opacity)?,
                direction: animated(direction)?,
                distance: animated(distance)?,
                softness: animated(softness)?,
            },
        })
    }

    fn set_progress(&mut self, progress: f32) -> bool {
        match self {
            Self::Blur { radius } => radius.set_progress(progress),
            Self::DropShadow {
                color,
                opacity,
                direction,
                distance,
                softness,
            } => {
                let mut changed = color.set_progress(progress);
                changed |= opacity.set_progress(progress);
                changed |= direction.set_progress(progress);
                changed |= distance.set_progress(progress);
                changed |= softness.set_progress(progress);
                changed
            }
        }
    }

    fn resolve(&mut self) -> Option<LayerEffect> {
        match self {
            Self::Blur { radius } => {
                let radius = f64::from(radius.value());
                (radius > 0.0).then_some(LayerEffect::Blur { radius })
            }
            Self::DropShadow {
                color,
                opacity,
                direction,
                distance,
                softness,
            } => {
                // Direction is degrees clockwise from straight up.
                let radians = f64::from(direction.value()).to_radians();
                let length = f64::from(distance.value());
                let offset = Vec2::new(radians.sin() * length, -radians.cos() * length);
                let base = color.value();
                let alpha = base.a * (opacity.value() / 255.0).clamp(0.0, 1.0);
                Some(LayerEffect::DropShadow {
                    color: base.with_alpha(alpha),
                    offset,
                    softness: f64::from(softness.value()),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/stack.rs"]
mod tests;
