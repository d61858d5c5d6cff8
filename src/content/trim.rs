//! Trim paths: cutting a percentage window out of a path's arc length.

use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathSeg};

use crate::animation::value::AnimatedValue;
use crate::composition::model::{TrimMode, TrimModel};
use crate::foundation::error::AnimyteResult;
use crate::foundation::math::floor_mod64;

/// Arc-length accuracy. Trim boundaries are visual, not geometric joins, so
/// a tenth of a document unit is plenty.
const ARCLEN_ACCURACY: f64 = 1e-3;

/// Evaluated trim modifier.
#[derive(Debug)]
pub(crate) struct TrimContent {
    start: AnimatedValue<f32>,
    end: AnimatedValue<f32>,
    offset: AnimatedValue<f32>,
    mode: TrimMode,
}

impl TrimContent {
    pub(crate) fn new(model: &TrimModel) -> AnimyteResult<Self> {
        Ok(Self {
            start: AnimatedValue::new(model.start.clone())?,
            end: AnimatedValue::new(model.end.clone())?,
            offset: AnimatedValue::new(model.offset.clone())?,
            mode: model.mode,
        })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.start.set_progress(progress);
        changed |= self.end.set_progress(progress);
        changed |= self.offset.set_progress(progress);
        changed
    }

    pub(crate) fn mode(&self) -> TrimMode {
        self.mode
    }

    /// Resolve the window at the current progress. Start and end come out
    /// normalized to `0..=1`, the offset in whole rotations.
    pub(crate) fn resolve(&mut self) -> ResolvedTrim {
        ResolvedTrim {
            start: self.start.value() / 100.0,
            end: self.end.value() / 100.0,
            offset: self.offset.value() / 360.0,
            mode: self.mode,
        }
    }
}

/// A trim window resolved at one progress, passed by value to the geometry
/// it applies to.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedTrim {
    pub(crate) start: f32,
    pub(crate) end: f32,
    pub(crate) offset: f32,
    pub(crate) mode: TrimMode,
}

impl ResolvedTrim {
    fn fraction(start: f64, end: f64, mode: TrimMode) -> Self {
        Self {
            start: start as f32,
            end: end as f32,
            offset: 0.0,
            mode,
        }
    }
}

/// Total arc length of a path across all of its subpaths.
pub(crate) fn path_length(path: &BezPath) -> f64 {
    path.segments().map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum()
}

/// Cut `trim`'s window out of `path`. The window may wrap past the end of
/// the path, producing two disjoint pieces.
pub(crate) fn apply_trim(path: &BezPath, trim: ResolvedTrim) -> BezPath {
    // A reversed full window is authored as start 100 / end 0.
    if trim.start == 1.0 && trim.end == 0.0 {
        return path.clone();
    }
    if (f64::from(trim.end) - f64::from(trim.start) - 1.0).abs() < 0.01 {
        return path.clone();
    }
    let length = path_length(path);
    if length < 1.0 {
        return path.clone();
    }

    let start = length * f64::from(trim.start);
    let end = length * f64::from(trim.end);
    let mut new_start = start.min(end);
    let mut new_end = start.max(end);
    let offset = f64::from(trim.offset) * length;
    new_start += offset;
    new_end += offset;
    if new_start >= length && new_end >= length {
        new_start = floor_mod64(new_start, length);
        new_end = floor_mod64(new_end, length);
    }
    if new_start < 0.0 {
        new_start = floor_mod64(new_start, length);
    }
    if new_end < 0.0 {
        new_end = floor_mod64(new_end, length);
    }
    if new_start == new_end {
        return BezPath::new();
    }
    if new_start >= new_end {
        new_start -= length;
    }

    let mut out = extract_range(path, new_start.max(0.0), new_end.min(length));
    if new_end > length {
        append(&mut out, extract_range(path, 0.0, floor_mod64(new_end, length)));
    } else if new_start < 0.0 {
        append(&mut out, extract_range(path, new_start + length, length));
    }
    out
}

/// Trim a set of paths as one continuous arc-length domain, the
/// [`TrimMode::Individual`] behavior. Empty pieces are dropped.
pub(crate) fn apply_joint_trim(paths: &[BezPath], trim: ResolvedTrim) -> Vec<BezPath> {
    let total: f64 = paths.iter().map(path_length).sum();
    if total == 0.0 {
        return Vec::new();
    }
    let offset_len = total * f64::from(trim.offset);
    let start_len = total * f64::from(trim.start.min(trim.end)) + offset_len;
    let end_len = total * f64::from(trim.start.max(trim.end)) + offset_len;

    let mut out = Vec::with_capacity(paths.len());
    let mut current = 0.0;
    for path in paths {
        let len = path_length(path);
        let piece = if end_len > total && end_len - total < current + len && current < end_len - total
        {
            // The window wraps; this path holds the wrapped head.
            let sv = if start_len > total {
                (start_len - total) / len
            } else {
                0.0
            };
            let ev = ((end_len - total) / len).min(1.0);
            apply_trim(path, ResolvedTrim::fraction(sv, ev, trim.mode))
        } else if current + len < start_len || current > end_len {
            BezPath::new()
        } else if current + len <= end_len && start_len < current {
            path.clone()
        } else {
            let sv = if start_len < current {
                0.0
            } else {
                (start_len - current) / len
            };
            let ev = if end_len > current + len {
                1.0
            } else {
                (end_len - current) / len
            };
            apply_trim(path, ResolvedTrim::fraction(sv, ev, trim.mode))
        };
        if !piece.elements().is_empty() {
            out.push(piece);
        }
        current += len;
    }
    out
}

/// Extract the `[from, to]` arc-length window as path geometry. Windows
/// crossing a subpath boundary keep the boundary's discontinuity.
fn extract_range(path: &BezPath, from: f64, to: f64) -> BezPath {
    let mut out = BezPath::new();
    let mut travelled = 0.0;
    let mut last_end: Option<kurbo::Point> = None;
    for seg in path.segments() {
        let len = seg.arclen(ARCLEN_ACCURACY);
        let seg_start = travelled;
        travelled += len;
        if len == 0.0 || travelled <= from || seg_start >= to {
            continue;
        }
        let t0 = if from > seg_start {
            seg.inv_arclen(from - seg_start, ARCLEN_ACCURACY)
        } else {
            0.0
        };
        let t1 = if to < travelled {
            seg.inv_arclen(to - seg_start, ARCLEN_ACCURACY)
        } else {
            1.0
        };
        let sub = seg.subsegment(t0..t1);
        let start = sub.start();
        let contiguous = last_end.is_some_and(|p| (p - start).hypot() < 1e-9);
        if !contiguous {
            out.move_to(start);
        }
        match sub {
            PathSeg::Line(line) => out.line_to(line.p1),
            PathSeg::Quad(quad) => out.quad_to(quad.p1, quad.p2),
            PathSeg::Cubic(cubic) => out.curve_to(cubic.p1, cubic.p2, cubic.p3),
        }
        last_end = Some(sub.end());
    }
    out
}

fn append(target: &mut BezPath, piece: BezPath) {
    for el in piece.elements() {
        target.push(*el);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/trim.rs"]
mod tests;
