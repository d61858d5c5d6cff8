//! Parametric geometry producers. Each one evaluates its animated
//! parameters and rebuilds a cached [`BezPath`] only when they moved.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Affine, BezPath, Point};

use crate::animation::value::AnimatedValue;
use crate::composition::model::{
    EllipseModel, PathModel, PolystarModel, RectangleModel, StarType,
};
use crate::content::modifiers::{round_corners, CORNER_MAGIC};
use crate::content::shape_data::ShapeData;
use crate::content::{animated, opt_animated};
use crate::foundation::error::AnimyteResult;

/// Cubic control distance approximating a quarter ellipse.
const ELLIPSE_MAGIC: f64 = 0.55228;
/// Control scale applied to star point roundness.
const STAR_MAGIC: f64 = 0.47829;
/// Control scale applied to polygon roundness.
const POLYGON_MAGIC: f64 = 0.25;

/// One geometry item of a shape layer, dispatching to the concrete producer.
#[derive(Debug)]
pub(crate) enum PathProducer {
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
    Polystar(PolystarShape),
    Freeform(FreeformShape),
}

impl PathProducer {
    pub(crate) fn name(&self) -> Option<&str> {
        match self {
            Self::Rectangle(s) => s.name.as_deref(),
            Self::Ellipse(s) => s.name.as_deref(),
            Self::Polystar(s) => s.name.as_deref(),
            Self::Freeform(s) => s.name.as_deref(),
        }
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        match self {
            Self::Rectangle(s) => s.set_progress(progress),
            Self::Ellipse(s) => s.set_progress(progress),
            Self::Polystar(s) => s.set_progress(progress),
            Self::Freeform(s) => s.set_progress(progress),
        }
    }

    /// Feed in the radius of a rounded-corner modifier in scope. Ellipses
    /// and polystars ignore it.
    pub(crate) fn set_round_radius(&mut self, radius: f32) {
        match self {
            Self::Rectangle(s) => s.set_round_radius(radius),
            Self::Freeform(s) => s.set_round_radius(radius),
            Self::Ellipse(_) | Self::Polystar(_) => {}
        }
    }

    pub(crate) fn path(&mut self) -> &BezPath {
        match self {
            Self::Rectangle(s) => s.path(),
            Self::Ellipse(s) => s.path(),
            Self::Polystar(s) => s.path(),
            Self::Freeform(s) => s.path(),
        }
    }
}

/// Rectangle with an optional corner radius.
#[derive(Debug)]
pub(crate) struct RectangleShape {
    name: Option<String>,
    position: AnimatedValue<Point>,
    size: AnimatedValue<Point>,
    radius: AnimatedValue<f32>,
    reversed: bool,
    round_radius: f32,
    path: BezPath,
    dirty: bool,
}

impl RectangleShape {
    pub(crate) fn new(model: &RectangleModel) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            position: animated(&model.position)?,
            size: animated(&model.size)?,
            radius: animated(&model.radius)?,
            reversed: model.reversed,
            round_radius: 0.0,
            path: BezPath::new(),
            dirty: true,
        })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.position.set_progress(progress);
        changed |= self.size.set_progress(progress);
        changed |= self.radius.set_progress(progress);
        self.dirty |= changed;
        changed
    }

    pub(crate) fn set_round_radius(&mut self, radius: f32) {
        if radius != self.round_radius {
            self.round_radius = radius;
            self.dirty = true;
        }
    }

    pub(crate) fn path(&mut self) -> &BezPath {
        if self.dirty {
            self.rebuild();
            self.dirty = false;
        }
        &self.path
    }

    fn rebuild(&mut self) {
        let center = self.position.value();
        let size = self.size.value();
        let half_w = size.x / 2.0;
        let half_h = size.y / 2.0;
        // An external rounded-corner modifier can only widen the radius.
        let radius = f64::from(self.radius.value())
            .max(f64::from(self.round_radius))
            .min(half_w)
            .min(half_h)
            .max(0.0);

        let left = center.x - half_w;
        let right = center.x + half_w;
        let top = center.y - half_h;
        let bottom = center.y + half_h;
        let k = radius * CORNER_MAGIC;

        // Clockwise from the right edge, just below the top-right corner.
        let mut path = BezPath::new();
        path.move_to((right, top + radius));
        path.line_to((right, bottom - radius));
        if radius > 0.0 {
            path.curve_to(
                (right, bottom - radius + k),
                (right - radius + k, bottom),
                (right - radius, bottom),
            );
        }
        path.line_to((left + radius, bottom));
        if radius > 0.0 {
            path.curve_to(
                (left + radius - k, bottom),
                (left, bottom - radius + k),
                (left, bottom - radius),
            );
        }
        path.line_to((left, top + radius));
        if radius > 0.0 {
            path.curve_to(
                (left, top + radius - k),
                (left + radius - k, top),
                (left + radius, top),
            );
        }
        path.line_to((right - radius, top));
        if radius > 0.0 {
            path.curve_to(
                (right - radius + k, top),
                (right, top + radius - k),
                (right, top + radius),
            );
        }
        path.close_path();
        if self.reversed {
            path = path.reverse_subpaths();
        }
        self.path = path;
    }
}

/// Ellipse drawn as four cubic quarters.
#[derive(Debug)]
pub(crate) struct EllipseShape {
    name: Option<String>,
    position: AnimatedValue<Point>,
    size: AnimatedValue<Point>,
    reversed: bool,
    path: BezPath,
    dirty: bool,
}

impl EllipseShape {
    pub(crate) fn new(model: &EllipseModel) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            position: animated(&model.position)?,
            size: animated(&model.size)?,
            reversed: model.reversed,
            path: BezPath::new(),
            dirty: true,
        })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.position.set_progress(progress);
        changed |= self.size.set_progress(progress);
        self.dirty |= changed;
        changed
    }

    pub(crate) fn path(&mut self) -> &BezPath {
        if self.dirty {
            self.rebuild();
            self.dirty = false;
        }
        &self.path
    }

    fn rebuild(&mut self) {
        let center = self.position.value();
        let size = self.size.value();
        let half_w = size.x / 2.0;
        let half_h = size.y / 2.0;
        let cp_w = half_w * ELLIPSE_MAGIC;
        let cp_h = half_h * ELLIPSE_MAGIC;
        let (cx, cy) = (center.x, center.y);

        // Starts at the top of the ellipse and runs clockwise, or counter
        // clockwise when reversed.
        let mut path = BezPath::new();
        path.move_to((cx, cy - half_h));
        if self.reversed {
            path.curve_to((cx - cp_w, cy - half_h), (cx - half_w, cy - cp_h), (cx - half_w, cy));
            path.curve_to((cx - half_w, cy + cp_h), (cx - cp_w, cy + half_h), (cx, cy + half_h));
            path.curve_to((cx + cp_w, cy + half_h), (cx + half_w, cy + cp_h), (cx + half_w, cy));
            path.curve_to((cx + half_w, cy - cp_h), (cx + cp_w, cy - half_h), (cx, cy - half_h));
        } else {
            path.curve_to((cx + cp_w, cy - half_h), (cx + half_w, cy - cp_h), (cx + half_w, cy));
            path.curve_to((cx + half_w, cy + cp_h), (cx + cp_w, cy + half_h), (cx, cy + half_h));
            path.curve_to((cx - cp_w, cy + half_h), (cx - half_w, cy + cp_h), (cx - half_w, cy));
            path.curve_to((cx - half_w, cy - cp_h), (cx - cp_w, cy - half_h), (cx, cy - half_h));
        }
        path.close_path();
        self.path = path;
    }
}

/// Star or regular polygon around a center point.
#[derive(Debug)]
pub(crate) struct PolystarShape {
    name: Option<String>,
    star_type: StarType,
    points: AnimatedValue<f32>,
    position: AnimatedValue<Point>,
    rotation: AnimatedValue<f32>,
    inner_radius: Option<AnimatedValue<f32>>,
    inner_roundness: Option<AnimatedValue<f32>>,
    outer_radius: AnimatedValue<f32>,
    outer_roundness: Option<AnimatedValue<f32>>,
    path: BezPath,
    dirty: bool,
}

impl PolystarShape {
    pub(crate) fn new(model: &PolystarModel) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            star_type: model.star_type,
            points: animated(&model.points)?,
            position: animated(&model.position)?,
            rotation: animated(&model.rotation)?,
            inner_radius: opt_animated(&model.inner_radius)?,
            inner_roundness: opt_animated(&model.inner_roundness)?,
            outer_radius: animated(&model.outer_radius)?,
            outer_roundness: opt_animated(&model.outer_roundness)?,
            path: BezPath::new(),
            dirty: true,
        })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.points.set_progress(progress);
        changed |= self.position.set_progress(progress);
        changed |= self.rotation.set_progress(progress);
        changed |= self.outer_radius.set_progress(progress);
        for value in [
            self.inner_radius.as_mut(),
            self.inner_roundness.as_mut(),
            self.outer_roundness.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            changed |= value.set_progress(progress);
        }
        self.dirty |= changed;
        changed
    }

    pub(crate) fn path(&mut self) -> &BezPath {
        if self.dirty {
            self.rebuild();
            self.dirty = false;
        }
        &self.path
    }

    fn rebuild(&mut self) {
        let points = f64::from(self.points.value());
        let rotation = f64::from(self.rotation.value());
        let outer_radius = f64::from(self.outer_radius.value());
        let outer_roundness = f64::from(opt_value(&mut self.outer_roundness)) / 100.0;
        let mut path = match self.star_type {
            StarType::Star => {
                let inner_radius = f64::from(opt_value(&mut self.inner_radius));
                let inner_roundness = f64::from(opt_value(&mut self.inner_roundness)) / 100.0;
                star_path(
                    points,
                    rotation,
                    outer_radius,
                    inner_radius,
                    outer_roundness,
                    inner_roundness,
                )
            }
            StarType::Polygon => polygon_path(points, rotation, outer_radius, outer_roundness),
        };
        path.apply_affine(Affine::translate(self.position.value().to_vec2()));
        self.path = path;
    }
}

fn opt_value(value: &mut Option<AnimatedValue<f32>>) -> f32 {
    value.as_mut().map_or(0.0, |v| v.value())
}

fn star_path(
    points: f64,
    rotation: f64,
    outer_radius: f64,
    inner_radius: f64,
    outer_roundness: f64,
    inner_roundness: f64,
) -> BezPath {
    let mut angle = (rotation - 90.0).to_radians();
    let angle_per_point = TAU / points;
    let half_angle = angle_per_point / 2.0;
    // A fractional point count grows one partial point, which keeps the
    // count animatable without popping.
    let partial = points - points.floor();
    if partial != 0.0 {
        angle += half_angle * (1.0 - partial);
    }

    let partial_radius = if partial != 0.0 {
        inner_radius + partial * (outer_radius - inner_radius)
    } else {
        0.0
    };
    let mut path = BezPath::new();
    let mut x;
    let mut y;
    if partial != 0.0 {
        x = partial_radius * angle.cos();
        y = partial_radius * angle.sin();
        path.move_to((x, y));
        angle += angle_per_point * partial / 2.0;
    } else {
        x = outer_radius * angle.cos();
        y = outer_radius * angle.sin();
        path.move_to((x, y));
        angle += half_angle;
    }

    let count = (points.ceil() * 2.0) as usize;
    // Alternates between the inner and outer radius.
    let mut long_segment = false;
    for i in 0..count {
        let mut radius = if long_segment { outer_radius } else { inner_radius };
        let mut d_theta = half_angle;
        if partial_radius != 0.0 && i == count - 2 {
            d_theta = angle_per_point * partial / 2.0;
        }
        if partial_radius != 0.0 && i == count - 1 {
            radius = partial_radius;
        }
        let prev_x = x;
        let prev_y = y;
        x = radius * angle.cos();
        y = radius * angle.sin();

        if inner_roundness == 0.0 && outer_roundness == 0.0 {
            path.line_to((x, y));
        } else {
            let cp1_theta = prev_y.atan2(prev_x) - FRAC_PI_2;
            let cp2_theta = y.atan2(x) - FRAC_PI_2;
            let (cp1_roundness, cp2_roundness) = if long_segment {
                (inner_roundness, outer_roundness)
            } else {
                (outer_roundness, inner_roundness)
            };
            let (cp1_radius, cp2_radius) = if long_segment {
                (inner_radius, outer_radius)
            } else {
                (outer_radius, inner_radius)
            };
            let scale1 = cp1_radius * cp1_roundness * STAR_MAGIC;
            let scale2 = cp2_radius * cp2_roundness * STAR_MAGIC;
            let mut cp1 = (scale1 * cp1_theta.cos(), scale1 * cp1_theta.sin());
            let mut cp2 = (scale2 * cp2_theta.cos(), scale2 * cp2_theta.sin());
            if partial != 0.0 {
                if i == 0 {
                    cp1 = (cp1.0 * partial, cp1.1 * partial);
                } else if i == count - 1 {
                    cp2 = (cp2.0 * partial, cp2.1 * partial);
                }
            }
            path.curve_to(
                (prev_x - cp1.0, prev_y - cp1.1),
                (x + cp2.0, y + cp2.1),
                (x, y),
            );
        }
        angle += d_theta;
        long_segment = !long_segment;
    }
    path.close_path();
    path
}

fn polygon_path(points: f64, rotation: f64, radius: f64, roundness: f64) -> BezPath {
    let sides = points.floor().max(3.0);
    let mut angle = (rotation - 90.0).to_radians();
    let angle_per_point = TAU / sides;

    let mut path = BezPath::new();
    let mut x = radius * angle.cos();
    let mut y = radius * angle.sin();
    path.move_to((x, y));
    angle += angle_per_point;
    for _ in 0..sides as usize {
        let prev_x = x;
        let prev_y = y;
        x = radius * angle.cos();
        y = radius * angle.sin();
        if roundness != 0.0 {
            let cp1_theta = prev_y.atan2(prev_x) - FRAC_PI_2;
            let cp2_theta = y.atan2(x) - FRAC_PI_2;
            let scale = radius * roundness * POLYGON_MAGIC;
            path.curve_to(
                (prev_x - scale * cp1_theta.cos(), prev_y - scale * cp1_theta.sin()),
                (x + scale * cp2_theta.cos(), y + scale * cp2_theta.sin()),
                (x, y),
            );
        } else {
            path.line_to((x, y));
        }
        angle += angle_per_point;
    }
    path.close_path();
    path
}

/// Keyframed freeform path, with corner rounding applied to the control
/// data before it is flattened to a path.
#[derive(Debug)]
pub(crate) struct FreeformShape {
    name: Option<String>,
    shape: AnimatedValue<ShapeData>,
    round_radius: f32,
    path: BezPath,
    dirty: bool,
}

impl FreeformShape {
    pub(crate) fn new(model: &PathModel) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            shape: animated(&model.shape)?,
            round_radius: 0.0,
            path: BezPath::new(),
            dirty: true,
        })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let changed = self.shape.set_progress(progress);
        self.dirty |= changed;
        changed
    }

    pub(crate) fn set_round_radius(&mut self, radius: f32) {
        if radius != self.round_radius {
            self.round_radius = radius;
            self.dirty = true;
        }
    }

    pub(crate) fn path(&mut self) -> &BezPath {
        if self.dirty {
            let data = self.shape.value();
            self.path = if self.round_radius > 0.0 {
                round_corners(&data, self.round_radius).to_path()
            } else {
                data.to_path()
            };
            self.dirty = false;
        }
        &self.path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/shapes.rs"]
mod tests;
