use std::sync::Arc;

use kurbo::{Affine, Point, Vec2};

use crate::animation::keyframe::Keyframe;
use crate::animation::value::{AnimatedValue, Interpolate, ValueCallback};
use crate::composition::model::{PositionModel, TransformModel};
use crate::foundation::error::AnimyteResult;

/// Normalized progress delta used to derive an auto-orient heading from the
/// position curve.
const AUTO_ORIENT_EPSILON: f32 = 1e-4;

/// Position track: one 2D value, or two independently keyframed axes when the
/// document splits the dimensions.
#[derive(Debug)]
pub enum PositionTrack {
    /// Single keyframed 2D position.
    Unified(AnimatedValue<Point>),
    /// Split-dimension position: x and y keyframed separately.
    Split {
        /// Keyframed x component.
        x: AnimatedValue<f32>,
        /// Keyframed y component.
        y: AnimatedValue<f32>,
    },
}

impl PositionTrack {
    fn set_progress(&mut self, progress: f32) -> bool {
        match self {
            Self::Unified(track) => track.set_progress(progress),
            Self::Split { x, y } => {
                let cx = x.set_progress(progress);
                let cy = y.set_progress(progress);
                cx || cy
            }
        }
    }

    fn progress(&self) -> f32 {
        match self {
            Self::Unified(track) => track.progress(),
            Self::Split { x, .. } => x.progress(),
        }
    }

    fn value(&mut self) -> Point {
        match self {
            Self::Unified(track) => track.value(),
            Self::Split { x, y } => Point::new(f64::from(x.value()), f64::from(y.value())),
        }
    }

    fn is_animated(&self) -> bool {
        match self {
            Self::Unified(track) => track.is_animated(),
            Self::Split { x, y } => x.is_animated() || y.is_animated(),
        }
    }
}

/// Optional sub-tracks for building a [`TransformAnimator`]. Absent parts
/// resolve to the identity defaults the document implies.
#[derive(Debug, Default)]
pub struct TransformParts {
    /// Anchor point, document units. Default `(0, 0)`.
    pub anchor: Option<AnimatedValue<Point>>,
    /// Position, document units. Default `(0, 0)`.
    pub position: Option<PositionTrack>,
    /// Scale factors, `1.0` = unscaled. Default `(1, 1)`.
    pub scale: Option<AnimatedValue<Vec2>>,
    /// Rotation in degrees. Default `0`.
    pub rotation: Option<AnimatedValue<f32>>,
    /// Opacity percent, `0..=100`. Default `100`.
    pub opacity: Option<AnimatedValue<f32>>,
    /// Skew amount in degrees.
    pub skew: Option<AnimatedValue<f32>>,
    /// Skew axis in degrees.
    pub skew_angle: Option<AnimatedValue<f32>>,
    /// Repeater-only: opacity percent of the first copy.
    pub start_opacity: Option<AnimatedValue<f32>>,
    /// Repeater-only: opacity percent of the last copy.
    pub end_opacity: Option<AnimatedValue<f32>>,
    /// Derive rotation from the position curve's heading.
    pub auto_orient: bool,
}

/// Composes a transform's animated sub-values into one affine matrix.
///
/// The matrix is assembled as translate(position), rotate(rotation or the
/// auto-orient heading), skew, scale, translate(-anchor), applied to geometry
/// in reverse listing order. The composition order is load-bearing; skewed
/// strokes in particular are visibly wrong under any other arrangement.
///
/// The resolved matrix is cached and recomputed only after `set_progress`
/// reports a change or an override callback is installed.
#[derive(Debug)]
pub struct TransformAnimator {
    anchor: AnimatedValue<Point>,
    position: PositionTrack,
    scale: AnimatedValue<Vec2>,
    rotation: AnimatedValue<f32>,
    opacity: AnimatedValue<f32>,
    skew: Option<AnimatedValue<f32>>,
    skew_angle: Option<AnimatedValue<f32>>,
    start_opacity: Option<AnimatedValue<f32>>,
    end_opacity: Option<AnimatedValue<f32>>,
    auto_orient: bool,
    cached: Option<Affine>,
}

impl TransformAnimator {
    /// Build from parsed sub-tracks, defaulting absent parts to identity.
    pub fn new(parts: TransformParts) -> Self {
        Self {
            anchor: parts
                .anchor
                .unwrap_or_else(|| AnimatedValue::fixed(Point::ZERO)),
            position: parts
                .position
                .unwrap_or_else(|| PositionTrack::Unified(AnimatedValue::fixed(Point::ZERO))),
            scale: parts
                .scale
                .unwrap_or_else(|| AnimatedValue::fixed(Vec2::new(1.0, 1.0))),
            rotation: parts.rotation.unwrap_or_else(|| AnimatedValue::fixed(0.0)),
            opacity: parts
                .opacity
                .unwrap_or_else(|| AnimatedValue::fixed(100.0)),
            skew: parts.skew,
            skew_angle: parts.skew_angle,
            start_opacity: parts.start_opacity,
            end_opacity: parts.end_opacity,
            auto_orient: parts.auto_orient,
            cached: None,
        }
    }

    /// A transform that never moves anything.
    pub fn identity() -> Self {
        Self::new(TransformParts::default())
    }

    /// Build from an evaluated transform model. `auto_orient` comes from the
    /// owning layer; shape group transforms never set it.
    pub(crate) fn from_model(model: &TransformModel, auto_orient: bool) -> AnimyteResult<Self> {
        Ok(Self::new(TransformParts {
            anchor: opt_track(&model.anchor)?,
            position: match &model.position {
                None => None,
                Some(PositionModel::Unified(track)) => Some(PositionTrack::Unified(
                    AnimatedValue::new(Arc::clone(track))?,
                )),
                Some(PositionModel::Split { x, y }) => Some(PositionTrack::Split {
                    x: AnimatedValue::new(Arc::clone(x))?,
                    y: AnimatedValue::new(Arc::clone(y))?,
                }),
            },
            scale: opt_track(&model.scale)?,
            rotation: opt_track(&model.rotation)?,
            opacity: opt_track(&model.opacity)?,
            skew: opt_track(&model.skew)?,
            skew_angle: opt_track(&model.skew_angle)?,
            start_opacity: opt_track(&model.start_opacity)?,
            end_opacity: opt_track(&model.end_opacity)?,
            auto_orient,
        }))
    }

    /// Whether any sub-track interpolates over time.
    pub fn is_animated(&self) -> bool {
        self.anchor.is_animated()
            || self.position.is_animated()
            || self.scale.is_animated()
            || self.rotation.is_animated()
            || self.opacity.is_animated()
            || self.skew.as_ref().is_some_and(AnimatedValue::is_animated)
            || self
                .skew_angle
                .as_ref()
                .is_some_and(AnimatedValue::is_animated)
            || self
                .start_opacity
                .as_ref()
                .is_some_and(AnimatedValue::is_animated)
            || self
                .end_opacity
                .as_ref()
                .is_some_and(AnimatedValue::is_animated)
    }

    /// Move every sub-track to `progress`; reports whether the matrix or
    /// opacity may have changed.
    pub fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.anchor.set_progress(progress);
        changed |= self.position.set_progress(progress);
        changed |= self.scale.set_progress(progress);
        changed |= self.rotation.set_progress(progress);
        changed |= self.opacity.set_progress(progress);
        if let Some(skew) = &mut self.skew {
            changed |= skew.set_progress(progress);
        }
        if let Some(angle) = &mut self.skew_angle {
            changed |= angle.set_progress(progress);
        }
        if let Some(op) = &mut self.start_opacity {
            changed |= op.set_progress(progress);
        }
        if let Some(op) = &mut self.end_opacity {
            changed |= op.set_progress(progress);
        }
        // Auto-orient derives rotation from neighboring position samples, so
        // any progress movement can change the heading.
        changed |= self.auto_orient;
        if changed {
            self.cached = None;
        }
        changed
    }

    /// Resolve the transform matrix at the current progress.
    pub fn matrix(&mut self) -> Affine {
        if let Some(m) = self.cached {
            return m;
        }

        let mut m = Affine::IDENTITY;
        let position = self.position.value();
        if position.x != 0.0 || position.y != 0.0 {
            m *= Affine::translate(position.to_vec2());
        }

        if self.auto_orient {
            let heading = self.auto_orient_heading();
            if heading != 0.0 {
                m *= Affine::rotate(heading);
            }
        } else {
            let rotation = self.rotation.value();
            if rotation != 0.0 {
                m *= Affine::rotate(f64::from(rotation).to_radians());
            }
        }

        if let Some(skew) = &mut self.skew {
            let skew_deg = skew.value();
            if skew_deg != 0.0 {
                let angle_deg = self
                    .skew_angle
                    .as_mut()
                    .map(AnimatedValue::value)
                    .unwrap_or(0.0);
                m *= skew_matrix(skew_deg, angle_deg);
            }
        }

        let scale = self.scale.value();
        if scale.x != 1.0 || scale.y != 1.0 {
            m *= Affine::scale_non_uniform(scale.x, scale.y);
        }

        let anchor = self.anchor.value();
        if anchor.x != 0.0 || anchor.y != 0.0 {
            m *= Affine::translate(-anchor.to_vec2());
        }

        self.cached = Some(m);
        m
    }

    /// Heading of the position curve at the current progress, in radians,
    /// from a forward finite difference.
    fn auto_orient_heading(&mut self) -> f64 {
        let progress = self.position.progress();
        let here = self.position.value();
        self.position.set_progress(progress + AUTO_ORIENT_EPSILON);
        let ahead = self.position.value();
        self.position.set_progress(progress);
        (ahead.y - here.y).atan2(ahead.x - here.x)
    }

    /// Resolve the transform's opacity as an 8-bit alpha.
    pub fn opacity(&mut self) -> u8 {
        percent_to_alpha(self.opacity.value())
    }

    /// Repeater copy fade: opacity percent of the first copy, if authored.
    pub fn start_opacity(&mut self) -> Option<f32> {
        self.start_opacity.as_mut().map(AnimatedValue::value)
    }

    /// Repeater copy fade: opacity percent of the last copy, if authored.
    pub fn end_opacity(&mut self) -> Option<f32> {
        self.end_opacity.as_mut().map(AnimatedValue::value)
    }

    /// Matrix applied to repeater copy `copy_index` (fractional while the
    /// copy count animates): position scaled by the index, scale raised to
    /// the index, rotation multiplied by the index, with scale and rotation
    /// pivoting around the anchor point.
    pub fn matrix_for_repeater(&mut self, copy_index: f32) -> Affine {
        let n = f64::from(copy_index);
        let position = self.position.value();
        let scale = self.scale.value();
        let rotation = f64::from(self.rotation.value());
        let anchor = self.anchor.value().to_vec2();

        let mut m = Affine::translate(position.to_vec2() * n);
        m *= Affine::translate(anchor)
            * Affine::scale_non_uniform(scale.x.powf(n), scale.y.powf(n))
            * Affine::translate(-anchor);
        m *= Affine::rotate_about((rotation * n).to_radians(), anchor.to_point());
        m
    }

    /// Override the anchor point track.
    pub fn set_anchor_callback(&mut self, callback: Option<ValueCallback<Point>>) {
        self.anchor.set_callback(callback);
        self.cached = None;
    }

    /// Override a unified position track. Returns false (and installs
    /// nothing) when the document splits the position into x/y tracks.
    pub fn set_position_callback(&mut self, callback: Option<ValueCallback<Point>>) -> bool {
        match &mut self.position {
            PositionTrack::Unified(track) => {
                track.set_callback(callback);
                self.cached = None;
                true
            }
            PositionTrack::Split { .. } => false,
        }
    }

    /// Override the x axis of a split position. Returns false for unified
    /// positions.
    pub fn set_position_x_callback(&mut self, callback: Option<ValueCallback<f32>>) -> bool {
        match &mut self.position {
            PositionTrack::Split { x, .. } => {
                x.set_callback(callback);
                self.cached = None;
                true
            }
            PositionTrack::Unified(_) => false,
        }
    }

    /// Override the y axis of a split position. Returns false for unified
    /// positions.
    pub fn set_position_y_callback(&mut self, callback: Option<ValueCallback<f32>>) -> bool {
        match &mut self.position {
            PositionTrack::Split { y, .. } => {
                y.set_callback(callback);
                self.cached = None;
                true
            }
            PositionTrack::Unified(_) => false,
        }
    }

    /// Override the scale track.
    pub fn set_scale_callback(&mut self, callback: Option<ValueCallback<Vec2>>) {
        self.scale.set_callback(callback);
        self.cached = None;
    }

    /// Override the rotation track.
    pub fn set_rotation_callback(&mut self, callback: Option<ValueCallback<f32>>) {
        self.rotation.set_callback(callback);
        self.cached = None;
    }

    /// Override the opacity track.
    pub fn set_opacity_callback(&mut self, callback: Option<ValueCallback<f32>>) {
        self.opacity.set_callback(callback);
    }

    /// Override the skew track, if the transform has one.
    pub fn set_skew_callback(&mut self, callback: Option<ValueCallback<f32>>) -> bool {
        let Some(skew) = &mut self.skew else {
            return false;
        };
        skew.set_callback(callback);
        self.cached = None;
        true
    }

    /// Override the skew angle track, if the transform has one.
    pub fn set_skew_angle_callback(&mut self, callback: Option<ValueCallback<f32>>) -> bool {
        let Some(angle) = &mut self.skew_angle else {
            return false;
        };
        angle.set_callback(callback);
        self.cached = None;
        true
    }
}

fn opt_track<T: Interpolate>(
    track: &Option<Arc<Vec<Keyframe<T>>>>,
) -> AnimyteResult<Option<AnimatedValue<T>>> {
    track
        .as_ref()
        .map(|t| AnimatedValue::new(Arc::clone(t)))
        .transpose()
}

/// Convert an opacity percent (`0..=100`) to 8-bit alpha.
pub(crate) fn percent_to_alpha(percent: f32) -> u8 {
    (percent / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Skew decomposed into rotate, shear, rotate-back. The decomposition (and
/// its order) matches the authoring tool's skew semantics.
fn skew_matrix(skew_deg: f32, skew_angle_deg: f32) -> Affine {
    let phi = f64::from(90.0 - skew_angle_deg).to_radians();
    let shear = f64::from(skew_deg).to_radians().tan();
    Affine::rotate(phi)
        * Affine::new([1.0, shear, 0.0, 1.0, 0.0, 0.0])
        * Affine::rotate(-phi)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transform.rs"]
mod tests;
