use kurbo::{BezPath, Point, Vec2};

use crate::animation::value::Interpolate;

/// Freeform bezier geometry: absolute vertices plus relative control
/// tangents, the unit every path-producing shape resolves to.
///
/// Tangents are stored relative to their vertex, as authored. Two keyframed
/// `ShapeData` values interpolate per vertex and per tangent; the track
/// builder rejects tracks whose keyframes disagree on vertex count, so
/// blending always sees equal topologies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeData {
    /// Curve vertices, absolute document coordinates.
    pub vertices: Vec<Point>,
    /// Incoming control tangents, relative to their vertex.
    pub in_tangents: Vec<Vec2>,
    /// Outgoing control tangents, relative to their vertex.
    pub out_tangents: Vec<Vec2>,
    /// Whether the contour closes back to the first vertex.
    pub closed: bool,
}

impl ShapeData {
    /// Build from parallel vertex and tangent lists.
    pub fn new(
        vertices: Vec<Point>,
        in_tangents: Vec<Vec2>,
        out_tangents: Vec<Vec2>,
        closed: bool,
    ) -> Self {
        debug_assert_eq!(vertices.len(), in_tangents.len());
        debug_assert_eq!(vertices.len(), out_tangents.len());
        Self {
            vertices,
            in_tangents,
            out_tangents,
            closed,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the shape has no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Emit the shape as a path. Edges whose controlling tangents are both
    /// zero-length come out as straight lines; every other edge is a cubic.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(&first) = self.vertices.first() else {
            return path;
        };
        path.move_to(first);
        for i in 1..self.vertices.len() {
            push_edge(
                &mut path,
                self.vertices[i - 1],
                self.out_tangents[i - 1],
                self.in_tangents[i],
                self.vertices[i],
            );
        }
        if self.closed && self.vertices.len() > 1 {
            push_edge(
                &mut path,
                self.vertices[self.vertices.len() - 1],
                self.out_tangents[self.vertices.len() - 1],
                self.in_tangents[0],
                first,
            );
            path.close_path();
        }
        path
    }
}

impl Interpolate for ShapeData {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        debug_assert_eq!(a.vertex_count(), b.vertex_count());
        let t = f64::from(t);
        let vertices = a
            .vertices
            .iter()
            .zip(&b.vertices)
            .map(|(va, vb)| Point::new(va.x + (vb.x - va.x) * t, va.y + (vb.y - va.y) * t))
            .collect();
        let in_tangents = lerp_tangents(&a.in_tangents, &b.in_tangents, t);
        let out_tangents = lerp_tangents(&a.out_tangents, &b.out_tangents, t);
        Self {
            vertices,
            in_tangents,
            out_tangents,
            closed: a.closed,
        }
    }
}

fn push_edge(path: &mut BezPath, from: Point, out: Vec2, inward: Vec2, to: Point) {
    if out == Vec2::ZERO && inward == Vec2::ZERO {
        path.line_to(to);
    } else {
        path.curve_to(from + out, to + inward, to);
    }
}

fn lerp_tangents(a: &[Vec2], b: &[Vec2], t: f64) -> Vec<Vec2> {
    a.iter()
        .zip(b)
        .map(|(ta, tb)| Vec2::new(ta.x + (tb.x - ta.x) * t, ta.y + (tb.y - ta.y) * t))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/content/shape_data.rs"]
mod tests;
