//! Rounded corner modifier. Operates on the keyframed control data, so the
//! rounding survives shape interpolation.

use kurbo::Vec2;

use crate::animation::value::AnimatedValue;
use crate::composition::model::RoundedCornersModel;
use crate::content::animated;
use crate::content::shape_data::ShapeData;
use crate::foundation::error::AnimyteResult;

/// Cubic control distance for a circular quarter arc, as a fraction of the
/// radius.
pub(crate) const CORNER_MAGIC: f64 = 0.5519;

/// Evaluated rounded-corner modifier.
#[derive(Debug)]
pub(crate) struct RoundedCornersContent {
    name: Option<String>,
    radius: AnimatedValue<f32>,
}

impl RoundedCornersContent {
    pub(crate) fn new(model: &RoundedCornersModel) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            radius: animated(&model.radius)?,
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        self.radius.set_progress(progress)
    }

    pub(crate) fn radius(&mut self) -> f32 {
        self.radius.value()
    }
}

/// Replace each sharp vertex with two vertices pulled back along the
/// adjacent edges, joined by a quarter-arc cubic.
///
/// A vertex is sharp when both of its tangent handles are zero. Vertices
/// with handles keep their authored curvature, as do the endpoints of open
/// paths. The pull-back distance is `radius`, capped at half the edge so
/// neighboring corners cannot overlap.
pub(crate) fn round_corners(data: &ShapeData, radius: f32) -> ShapeData {
    let n = data.vertex_count();
    if n <= 2 || radius <= 0.0 {
        return data.clone();
    }
    let radius = f64::from(radius);

    let mut vertices = Vec::with_capacity(n * 2);
    let mut in_tangents = Vec::with_capacity(n * 2);
    let mut out_tangents = Vec::with_capacity(n * 2);
    for i in 0..n {
        let vertex = data.vertices[i];
        let in_t = data.in_tangents[i];
        let out_t = data.out_tangents[i];
        let open_end = !data.closed && (i == 0 || i == n - 1);
        let sharp = in_t.hypot2() == 0.0 && out_t.hypot2() == 0.0;
        if open_end || !sharp {
            vertices.push(vertex);
            in_tangents.push(in_t);
            out_tangents.push(out_t);
            continue;
        }

        let previous = data.vertices[(i + n - 1) % n];
        let next = data.vertices[(i + 1) % n];
        let to_previous = previous - vertex;
        let to_next = next - vertex;
        let a = vertex + to_previous * pull_back(radius, to_previous.hypot());
        let b = vertex + to_next * pull_back(radius, to_next.hypot());

        vertices.push(a);
        in_tangents.push(Vec2::ZERO);
        out_tangents.push((vertex - a) * CORNER_MAGIC);

        vertices.push(b);
        in_tangents.push((vertex - b) * CORNER_MAGIC);
        out_tangents.push(Vec2::ZERO);
    }
    ShapeData::new(vertices, in_tangents, out_tangents, data.closed)
}

fn pull_back(radius: f64, edge: f64) -> f64 {
    if edge == 0.0 {
        0.0
    } else {
        (radius / edge).min(0.5)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/modifiers.rs"]
mod tests;
