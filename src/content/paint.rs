//! Fill and stroke paints. A paint resolves its animated parameters and
//! records one draw command over the geometry collected for it.

use std::sync::Arc;

use kurbo::{Affine, Point};

use crate::animation::color::{ColorAnimator, ColorMixing, GradientAnimator, GradientColor};
use crate::animation::value::{AnimatedValue, ValueCallback};
use crate::composition::model::{
    DashKind, FillModel, FillRule, GradientFillModel, GradientKind, GradientStrokeModel, LineCap,
    LineJoin, StrokeModel, Track,
};
use crate::content::{animated, opt_animated};
use crate::foundation::core::Rgba;
use crate::foundation::error::AnimyteResult;
use crate::render::display_list::{DisplayList, DrawCommand, Geometry, Paint, StrokeStyle};

/// Solid color fill.
#[derive(Debug)]
pub(crate) struct FillContent {
    name: Option<String>,
    color: ColorAnimator,
    opacity: Option<AnimatedValue<f32>>,
    rule: FillRule,
}

impl FillContent {
    pub(crate) fn new(model: &FillModel, mixing: ColorMixing) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            color: ColorAnimator::new(Arc::clone(&model.color), mixing)?,
            opacity: opt_animated(&model.opacity)?,
            rule: model.rule,
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_color_callback(
        &mut self,
        callback: Option<ValueCallback<Rgba>>,
    ) {
        self.color.set_callback(callback);
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.color.set_progress(progress);
        if let Some(opacity) = self.opacity.as_mut() {
            changed |= opacity.set_progress(progress);
        }
        changed
    }

    pub(crate) fn emit(
        &mut self,
        list: &mut DisplayList,
        geometry: impl Into<Geometry>,
        transform: Affine,
        parent_alpha: u8,
    ) {
        list.push(fill_command(
            geometry.into(),
            transform,
            Paint::Solid(self.color.value()),
            self.rule,
            opacity_alpha(parent_alpha, self.opacity.as_mut()),
        ));
    }
}

/// Solid color stroke.
#[derive(Debug)]
pub(crate) struct StrokeContent {
    name: Option<String>,
    color: ColorAnimator,
    opacity: Option<AnimatedValue<f32>>,
    width: AnimatedValue<f32>,
    cap: LineCap,
    join: LineJoin,
    miter_limit: f64,
    dashes: Vec<(DashKind, AnimatedValue<f32>)>,
}

impl StrokeContent {
    pub(crate) fn new(model: &StrokeModel, mixing: ColorMixing) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            color: ColorAnimator::new(Arc::clone(&model.color), mixing)?,
            opacity: opt_animated(&model.opacity)?,
            width: animated(&model.width)?,
            cap: model.cap,
            join: model.join,
            miter_limit: f64::from(model.miter_limit),
            dashes: dash_animators(model.dashes.iter().map(|d| (d.kind, &d.value)))?,
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_color_callback(
        &mut self,
        callback: Option<ValueCallback<Rgba>>,
    ) {
        self.color.set_callback(callback);
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.color.set_progress(progress);
        changed |= self.width.set_progress(progress);
        if let Some(opacity) = self.opacity.as_mut() {
            changed |= opacity.set_progress(progress);
        }
        for (_, value) in &mut self.dashes {
            changed |= value.set_progress(progress);
        }
        changed
    }

    pub(crate) fn emit(
        &mut self,
        list: &mut DisplayList,
        geometry: impl Into<Geometry>,
        transform: Affine,
        parent_alpha: u8,
    ) {
        let width = f64::from(self.width.value());
        if width <= 0.0 {
            return;
        }
        let (dashes, dash_offset) = resolve_dashes(&mut self.dashes);
        list.push(stroke_command(
            geometry.into(),
            transform,
            Paint::Solid(self.color.value()),
            StrokeStyle {
                width,
                cap: self.cap,
                join: self.join,
                miter_limit: self.miter_limit,
                dashes,
                dash_offset,
            },
            opacity_alpha(parent_alpha, self.opacity.as_mut()),
        ));
    }
}

/// Linear or radial gradient fill.
#[derive(Debug)]
pub(crate) struct GradientFillContent {
    name: Option<String>,
    kind: GradientKind,
    gradient: GradientAnimator,
    start: AnimatedValue<Point>,
    end: AnimatedValue<Point>,
    opacity: Option<AnimatedValue<f32>>,
    rule: FillRule,
}

impl GradientFillContent {
    pub(crate) fn new(model: &GradientFillModel, mixing: ColorMixing) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            kind: model.kind,
            gradient: GradientAnimator::new(Arc::clone(&model.stops), mixing)?,
            start: animated(&model.start)?,
            end: animated(&model.end)?,
            opacity: opt_animated(&model.opacity)?,
            rule: model.rule,
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.gradient.set_progress(progress);
        changed |= self.start.set_progress(progress);
        changed |= self.end.set_progress(progress);
        if let Some(opacity) = self.opacity.as_mut() {
            changed |= opacity.set_progress(progress);
        }
        changed
    }

    fn paint(&mut self) -> Paint {
        gradient_paint(
            self.kind,
            self.start.value(),
            self.end.value(),
            self.gradient.value(),
        )
    }

    pub(crate) fn emit(
        &mut self,
        list: &mut DisplayList,
        geometry: impl Into<Geometry>,
        transform: Affine,
        parent_alpha: u8,
    ) {
        let paint = self.paint();
        list.push(fill_command(
            geometry.into(),
            transform,
            paint,
            self.rule,
            opacity_alpha(parent_alpha, self.opacity.as_mut()),
        ));
    }
}

/// Linear or radial gradient stroke.
#[derive(Debug)]
pub(crate) struct GradientStrokeContent {
    name: Option<String>,
    kind: GradientKind,
    gradient: GradientAnimator,
    start: AnimatedValue<Point>,
    end: AnimatedValue<Point>,
    opacity: Option<AnimatedValue<f32>>,
    width: AnimatedValue<f32>,
    cap: LineCap,
    join: LineJoin,
    miter_limit: f64,
    dashes: Vec<(DashKind, AnimatedValue<f32>)>,
}

impl GradientStrokeContent {
    pub(crate) fn new(model: &GradientStrokeModel, mixing: ColorMixing) -> AnimyteResult<Self> {
        let paint = &model.gradient;
        Ok(Self {
            name: paint.name.clone(),
            kind: paint.kind,
            gradient: GradientAnimator::new(Arc::clone(&paint.stops), mixing)?,
            start: animated(&paint.start)?,
            end: animated(&paint.end)?,
            opacity: opt_animated(&paint.opacity)?,
            width: animated(&model.width)?,
            cap: model.cap,
            join: model.join,
            miter_limit: f64::from(model.miter_limit),
            dashes: dash_animators(model.dashes.iter().map(|d| (d.kind, &d.value)))?,
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.gradient.set_progress(progress);
        changed |= self.start.set_progress(progress);
        changed |= self.end.set_progress(progress);
        changed |= self.width.set_progress(progress);
        if let Some(opacity) = self.opacity.as_mut() {
            changed |= opacity.set_progress(progress);
        }
        for (_, value) in &mut self.dashes {
            changed |= value.set_progress(progress);
        }
        changed
    }

    pub(crate) fn emit(
        &mut self,
        list: &mut DisplayList,
        geometry: impl Into<Geometry>,
        transform: Affine,
        parent_alpha: u8,
    ) {
        let width = f64::from(self.width.value());
        if width <= 0.0 {
            return;
        }
        let paint = gradient_paint(
            self.kind,
            self.start.value(),
            self.end.value(),
            self.gradient.value(),
        );
        let (dashes, dash_offset) = resolve_dashes(&mut self.dashes);
        list.push(stroke_command(
            geometry.into(),
            transform,
            paint,
            StrokeStyle {
                width,
                cap: self.cap,
                join: self.join,
                miter_limit: self.miter_limit,
                dashes,
                dash_offset,
            },
            opacity_alpha(parent_alpha, self.opacity.as_mut()),
        ));
    }
}

fn fill_command(
    geometry: Geometry,
    transform: Affine,
    paint: Paint,
    rule: FillRule,
    alpha: u8,
) -> DrawCommand {
    match geometry {
        Geometry::Path(path) => DrawCommand::Fill {
            path,
            transform,
            paint,
            rule,
            alpha,
        },
        Geometry::Merged { mode, operands } => DrawCommand::FillMerged {
            operands,
            mode,
            transform,
            paint,
            rule,
            alpha,
        },
    }
}

fn stroke_command(
    geometry: Geometry,
    transform: Affine,
    paint: Paint,
    style: StrokeStyle,
    alpha: u8,
) -> DrawCommand {
    match geometry {
        Geometry::Path(path) => DrawCommand::Stroke {
            path,
            transform,
            paint,
            style,
            alpha,
        },
        Geometry::Merged { mode, operands } => DrawCommand::StrokeMerged {
            operands,
            mode,
            transform,
            paint,
            style,
            alpha,
        },
    }
}

fn gradient_paint(
    kind: GradientKind,
    start: Point,
    end: Point,
    stops: GradientColor,
) -> Paint {
    match kind {
        GradientKind::Linear => Paint::Linear { start, end, stops },
        GradientKind::Radial => {
            let r = (end - start).hypot();
            // A collapsed radius would drop the whole ramp.
            let radius = if r <= 0.0 { 0.001 } else { r };
            Paint::Radial {
                center: start,
                radius,
                stops,
            }
        }
    }
}

fn dash_animators<'a>(
    dashes: impl Iterator<Item = (DashKind, &'a Track<f32>)>,
) -> AnimyteResult<Vec<(DashKind, AnimatedValue<f32>)>> {
    dashes
        .map(|(kind, track)| Ok((kind, animated(track)?)))
        .collect()
}

/// Resolve the dash pattern. Dash runs shorter than one unit and gaps
/// shorter than a tenth are raised to those floors, since the segment count
/// explodes as either approaches zero.
fn resolve_dashes(dashes: &mut [(DashKind, AnimatedValue<f32>)]) -> (Vec<f64>, f64) {
    let mut pattern = Vec::new();
    let mut offset = 0.0;
    for (kind, value) in dashes.iter_mut() {
        let v = f64::from(value.value());
        match kind {
            DashKind::Offset => offset = v,
            DashKind::Dash | DashKind::Gap => pattern.push(v),
        }
    }
    for (i, v) in pattern.iter_mut().enumerate() {
        let floor = if i % 2 == 0 { 1.0 } else { 0.1 };
        if *v < floor {
            *v = floor;
        }
    }
    (pattern, offset)
}

/// Combine a parent alpha with an optional opacity-percent track.
pub(crate) fn opacity_alpha(parent: u8, opacity: Option<&mut AnimatedValue<f32>>) -> u8 {
    match opacity {
        None => parent,
        Some(value) => {
            let scaled = f32::from(parent) / 255.0 * (value.value() / 100.0) * 255.0;
            scaled.round().clamp(0.0, 255.0) as u8
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/paint.rs"]
mod tests;
