use std::sync::Arc;

use kurbo::{CubicBez, ParamCurve, Point, Vec2};

use crate::animation::keyframe::{Easing, Keyframe};
use crate::foundation::error::{AnimyteError, AnimyteResult};
use crate::foundation::math::lerp;

/// Value types that can travel between two keyframed endpoints.
pub trait Interpolate: Clone {
    /// Linear blend between `a` and `b` at eased progress `t`.
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self;

    /// Blend with independently eased x/y progress. Only position-like values
    /// support split dimensions; other types follow the x axis.
    fn interpolate_split(a: &Self, b: &Self, tx: f32, _ty: f32) -> Self {
        Self::interpolate(a, b, tx)
    }

    /// Travel an authored spatial curve instead of blending endpoints, for
    /// value types that support it.
    fn along_curve(_curve: &CubicBez, _t: f32) -> Option<Self> {
        None
    }
}

impl Interpolate for f32 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        lerp(*a, *b, t)
    }
}

impl Interpolate for f64 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        a + (b - a) * f64::from(t)
    }
}

impl Interpolate for Point {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        let t = f64::from(t);
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }

    fn interpolate_split(a: &Self, b: &Self, tx: f32, ty: f32) -> Self {
        Point::new(
            a.x + (b.x - a.x) * f64::from(tx),
            a.y + (b.y - a.y) * f64::from(ty),
        )
    }

    fn along_curve(curve: &CubicBez, t: f32) -> Option<Self> {
        Some(curve.eval(f64::from(t)))
    }
}

impl Interpolate for Vec2 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        let t = f64::from(t);
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }

    fn interpolate_split(a: &Self, b: &Self, tx: f32, ty: f32) -> Self {
        Vec2::new(
            a.x + (b.x - a.x) * f64::from(tx),
            a.y + (b.y - a.y) * f64::from(ty),
        )
    }
}

/// Interpolation context handed to a value override for one resolution.
///
/// Progress values: `linear_progress` is the uneased position inside the
/// active keyframe window, `eased_progress` the same position after the
/// keyframe's easing curve, and `overall_progress` the normalized position
/// across the whole composition.
#[derive(Debug)]
pub struct FrameInfo<'a, T> {
    /// Active keyframe's window start, in composition frames.
    pub start_frame: f32,
    /// Active keyframe's window end, in composition frames.
    pub end_frame: f32,
    /// Value at the window start.
    pub start_value: &'a T,
    /// Value at the window end (the start value for static keyframes).
    pub end_value: &'a T,
    /// Uneased progress inside the window, `0..=1`.
    pub linear_progress: f32,
    /// Eased progress inside the window.
    pub eased_progress: f32,
    /// Normalized progress across the composition, `0..=1`.
    pub overall_progress: f32,
}

/// Override callback superseding an interpolated value for one property.
pub type ValueCallback<T> = Box<dyn FnMut(&FrameInfo<'_, T>) -> T>;

/// One animated property: an ordered, contiguous keyframe sequence evaluated
/// at the composition's normalized progress.
///
/// The track data is immutable and shared (many players can instantiate the
/// same cached composition); per-instance state is the current progress, the
/// resolved-value cache, and an optional override callback. `set_progress`
/// reports whether the resolved value may have changed so owners can fold the
/// flag into their own staleness, and `value` recomputes lazily.
pub struct AnimatedValue<T: Interpolate> {
    keys: Arc<Vec<Keyframe<T>>>,
    progress: f32,
    active: usize,
    cached_at: Option<(usize, f32)>,
    cached: Option<T>,
    callback: Option<ValueCallback<T>>,
}

impl<T: Interpolate> AnimatedValue<T> {
    /// Build a track from a bound keyframe sequence. An empty sequence is a
    /// configuration error: there is nothing to resolve.
    pub fn new(keys: Arc<Vec<Keyframe<T>>>) -> AnimyteResult<Self> {
        if keys.is_empty() {
            return Err(AnimyteError::configuration(
                "animated value requires at least one keyframe",
            ));
        }
        Ok(Self {
            keys,
            progress: 0.0,
            active: 0,
            cached_at: None,
            cached: None,
            callback: None,
        })
    }

    /// A track that resolves to `value` at every progress.
    pub fn fixed(value: T) -> Self {
        Self {
            keys: Arc::new(vec![Keyframe::constant(value)]),
            progress: 0.0,
            active: 0,
            cached_at: None,
            cached: None,
            callback: None,
        }
    }

    /// Whether more than one keyframe (or a non-static single keyframe) can
    /// produce different values over time.
    pub fn is_animated(&self) -> bool {
        self.keys.len() > 1 || !self.keys[0].is_static()
    }

    /// Current normalized progress.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Install or clear the override callback. Overrides bypass the resolved
    /// cache, so the next `value` call reflects them immediately.
    pub fn set_callback(&mut self, callback: Option<ValueCallback<T>>) {
        self.callback = callback;
        self.cached_at = None;
        self.cached = None;
    }

    /// Whether an override callback is installed.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Move the track to `progress`, clamped into the track's own progress
    /// span (which can extend past `1.0` for precomp content reached through
    /// time remapping). Returns whether the resolved value may have changed.
    pub fn set_progress(&mut self, progress: f32) -> bool {
        let start_delay = self.keys[0].start_progress;
        let end_cap = self.keys[self.keys.len() - 1]
            .end_progress
            .max(start_delay);
        let progress = progress.clamp(start_delay, end_cap);
        if progress == self.progress && self.cached_at.is_some() {
            return false;
        }
        self.progress = progress;
        if !self.keys[self.active].contains_progress(progress) {
            // The half-open window rejects its own end progress, so landing
            // exactly on the track end re-finds the same terminal keyframe.
            let found = self.find_keyframe(progress);
            if found != self.active {
                self.active = found;
                return true;
            }
        }
        // Same window: only interpolating keyframes produce a new value.
        !self.keys[self.active].is_static() || self.callback.is_some()
    }

    /// Locate the keyframe window containing `progress`. The last keyframe is
    /// selected whenever `progress` reaches its start, so exact-boundary ties
    /// break toward the later keyframe.
    fn find_keyframe(&self, progress: f32) -> usize {
        let idx = self
            .keys
            .partition_point(|k| k.start_progress <= progress);
        idx.saturating_sub(1)
    }

    /// Resolve the value at the current progress. Re-uses the cached result
    /// while the active keyframe and its eased progress are unchanged; an
    /// override callback always re-runs.
    pub fn value(&mut self) -> T {
        let kf = &self.keys[self.active];
        let linear = if kf.is_static() {
            0.0
        } else {
            kf.linear_progress(self.progress)
        };

        if self.callback.is_none()
            && let Some(v) = self.cached_value(linear)
        {
            return v;
        }

        let value = self.resolve(linear);
        self.cached_at = Some((self.active, linear));
        self.cached = Some(value.clone());
        value
    }

    /// Resolve with a custom endpoint blend for owners that mix in another
    /// space (gamma-correct color). Shares the resolved-value cache, so the
    /// caller must pass the same blend on every read. Override callbacks are
    /// the caller's concern; this path ignores them.
    pub(crate) fn value_with<F>(&mut self, blend: F) -> T
    where
        F: FnOnce(&T, &T, f32) -> T,
    {
        let kf = &self.keys[self.active];
        let linear = if kf.is_static() {
            0.0
        } else {
            kf.linear_progress(self.progress)
        };
        if let Some(v) = self.cached_value(linear) {
            return v;
        }

        let kf = &self.keys[self.active];
        let value = match (&kf.end_value, &kf.easing) {
            (None, _) | (_, Easing::Hold) => kf.start_value.clone(),
            (Some(end), easing) => {
                let eased = match easing {
                    Easing::Linear | Easing::Hold => linear,
                    Easing::Bezier(curve) => curve.apply(linear),
                    Easing::Split { x, .. } => x.apply(linear),
                };
                blend(&kf.start_value, end, eased)
            }
        };
        self.cached_at = Some((self.active, linear));
        self.cached = Some(value.clone());
        value
    }

    fn cached_value(&self, linear: f32) -> Option<T> {
        match (self.cached_at, &self.cached) {
            (Some((idx, at)), Some(v)) if idx == self.active && at == linear => Some(v.clone()),
            _ => None,
        }
    }

    fn resolve(&mut self, linear: f32) -> T {
        let kf = &self.keys[self.active];
        let (eased_x, eased_y) = match &kf.easing {
            Easing::Linear => (linear, linear),
            Easing::Hold => (0.0, 0.0),
            Easing::Bezier(curve) => {
                let e = curve.apply(linear);
                (e, e)
            }
            Easing::Split { x, y } => (x.apply(linear), y.apply(linear)),
        };

        if let Some(mut cb) = self.callback.take() {
            let kf = &self.keys[self.active];
            let end = kf.end_value.as_ref().unwrap_or(&kf.start_value);
            let info = FrameInfo {
                start_frame: kf.start_frame,
                end_frame: kf.end_frame,
                start_value: &kf.start_value,
                end_value: end,
                linear_progress: linear,
                eased_progress: eased_x,
                overall_progress: self.progress,
            };
            let value = cb(&info);
            self.callback = Some(cb);
            return value;
        }

        let kf = &self.keys[self.active];
        let Some(end) = kf.end_value.as_ref() else {
            return kf.start_value.clone();
        };
        if matches!(kf.easing, Easing::Hold) {
            return kf.start_value.clone();
        }
        if let Some(curve) = &kf.spatial
            && let Some(v) = T::along_curve(curve, eased_x)
        {
            return v;
        }
        if matches!(kf.easing, Easing::Split { .. }) {
            T::interpolate_split(&kf.start_value, end, eased_x, eased_y)
        } else {
            T::interpolate(&kf.start_value, end, eased_x)
        }
    }
}

impl<T: Interpolate + std::fmt::Debug> std::fmt::Debug for AnimatedValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("keys", &self.keys.len())
            .field("progress", &self.progress)
            .field("active", &self.active)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
