use kurbo::CubicBez;

use crate::animation::bezier::CubicEase;
use crate::foundation::core::FrameRange;

/// Interpolation applied across one keyframe window.
#[derive(Clone, Debug)]
pub enum Easing {
    /// Uneased linear progress.
    Linear,
    /// Step function: the start value holds for the whole window.
    Hold,
    /// One authored cubic-bezier curve for the whole value.
    Bezier(CubicEase),
    /// Independent per-axis curves (split-dimension position easing).
    Split {
        /// Curve applied to the x component.
        x: CubicEase,
        /// Curve applied to the y component.
        y: CubicEase,
    },
}

/// One authored value change: a start value at `start_frame`, an optional end
/// value reached at `end_frame`, and the easing shaping the travel between
/// them.
///
/// Within one animated property, keyframes are frame-ordered and contiguous
/// (`end_frame[i] == start_frame[i + 1]`); the track builder enforces this
/// and the final keyframe's window runs to the composition's end frame.
/// Progress fields are normalized against the composition's frame range when
/// the track is bound (see [`bind_track`]).
#[derive(Clone, Debug)]
pub struct Keyframe<T> {
    /// Value at the start of the window.
    pub start_value: T,
    /// Value at the end of the window; `None` for terminal keyframes.
    pub end_value: Option<T>,
    /// Window start, in composition frames.
    pub start_frame: f32,
    /// Window end, in composition frames.
    pub end_frame: f32,
    /// Easing across the window.
    pub easing: Easing,
    /// Authored spatial travel curve for position values: a cubic from the
    /// start to the end value. `None` for componentwise-linear travel.
    pub spatial: Option<CubicBez>,
    pub(crate) start_progress: f32,
    pub(crate) end_progress: f32,
}

impl<T> Keyframe<T> {
    /// An animated keyframe starting at `start_frame`. The window end and the
    /// normalized progress fields are filled in by [`bind_track`].
    pub fn new(start_value: T, end_value: Option<T>, start_frame: f32, easing: Easing) -> Self {
        Self {
            start_value,
            end_value,
            start_frame,
            end_frame: start_frame,
            easing,
            spatial: None,
            start_progress: 0.0,
            end_progress: 1.0,
        }
    }

    /// A single static keyframe covering the entire timeline.
    pub fn constant(value: T) -> Self {
        Self {
            start_value: value,
            end_value: None,
            start_frame: 0.0,
            end_frame: f32::MAX,
            easing: Easing::Hold,
            spatial: None,
            start_progress: 0.0,
            end_progress: 1.0,
        }
    }

    /// Attach an authored spatial travel curve.
    pub fn with_spatial(mut self, curve: CubicBez) -> Self {
        self.spatial = Some(curve);
        self
    }

    /// Whether this keyframe never interpolates: terminal keyframes and hold
    /// keyframes resolve to their start value at every progress.
    pub fn is_static(&self) -> bool {
        self.end_value.is_none() || matches!(self.easing, Easing::Hold)
    }

    /// Whether `progress` falls inside this keyframe's half-open window.
    pub fn contains_progress(&self, progress: f32) -> bool {
        self.start_progress <= progress && progress < self.end_progress
    }

    pub(crate) fn linear_progress(&self, progress: f32) -> f32 {
        let span = self.end_progress - self.start_progress;
        if span <= 0.0 {
            return 0.0;
        }
        ((progress - self.start_progress) / span).clamp(0.0, 1.0)
    }
}

/// Chain a keyframe list into contiguous windows and normalize its frames
/// against the owning composition's range: every keyframe ends where the next
/// one starts, and the last window runs to the composition's end frame.
///
/// Progress values are deliberately not clamped to `0..1`: precomp assets may
/// author keyframes outside the root range, reachable through time remapping.
pub fn bind_track<T>(keys: &mut [Keyframe<T>], range: FrameRange) {
    let len = keys.len();
    for i in 0..len {
        let next_start = if i + 1 < len {
            keys[i + 1].start_frame
        } else {
            range.end
        };
        let kf = &mut keys[i];
        kf.end_frame = next_start.max(kf.start_frame);
        kf.start_progress = range.progress_for_frame(kf.start_frame);
        kf.end_progress = range.progress_for_frame(kf.end_frame);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
