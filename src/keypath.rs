//! Property paths: addressing animated values inside the evaluated graph by
//! the names the document authored, with wildcard matching.
//!
//! A [`KeyPath`] is a list of name segments walked from the root layer stack
//! down through precomp stacks, shape groups, and paints. `*` matches any
//! single node, `**` matches any run of nodes including none. Resolution
//! happens against the runtime graph, so one path can land on several nodes
//! and the same override applies to each of them (see the `override_*`
//! methods on [`crate::Player`]).

use std::sync::Arc;

use smallvec::SmallVec;

use crate::animation::transform::TransformAnimator;
use crate::animation::value::FrameInfo;
use crate::content::{ContentGroup, ContentNode};
use crate::layer::{LayerPayload, LayerStack};

/// Shared override function applied to every node a key path resolves to.
///
/// The same callback instance serves all resolved nodes, so it is handed
/// around in an [`Arc`]; each invocation receives the resolving property's
/// frame interpolation context.
pub type PropertyOverride<T> = Arc<dyn Fn(&FrameInfo<'_, T>) -> T>;

/// A name path into the evaluated graph.
///
/// Segments match layer names first, then shape group, repeater, and paint
/// names inside a shape layer, and nested layer names inside a precomp.
/// Matching is exact and case-sensitive apart from the wildcards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Build a path from its segments, outermost first.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The path's segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Depths the walk can be at after consuming a node called `name` while
    /// at `depth`. Empty when the node falls off the path.
    fn advance(&self, depth: usize, name: Option<&str>) -> SmallVec<[usize; 2]> {
        let mut next = SmallVec::new();
        let Some(segment) = self.segments.get(depth) else {
            return next;
        };
        if segment == "**" {
            // The globstar consumes any node without moving, and may also
            // hand this node to the segment after it.
            next.push(depth);
            if let Some(after) = self.segments.get(depth + 1)
                && segment_matches(after, name)
            {
                next.push(depth + 2);
            }
        } else if segment_matches(segment, name) {
            next.push(depth + 1);
        }
        next
    }

    /// Whether a node reached at `depth` is a final match for the path.
    fn complete(&self, depth: usize) -> bool {
        depth >= self.segments.len()
            || (depth + 1 == self.segments.len() && self.segments[depth] == "**")
    }
}

fn segment_matches(segment: &str, name: Option<&str>) -> bool {
    segment == "*" || segment == "**" || name == Some(segment)
}

/// A node a key path resolved to, exposed as its override surface.
pub(crate) enum OverrideTarget<'a> {
    /// A layer, shape group, or repeater transform.
    Transform(&'a mut TransformAnimator),
    /// A solid fill paint.
    Fill(&'a mut crate::content::paint::FillContent),
    /// A solid stroke paint.
    Stroke(&'a mut crate::content::paint::StrokeContent),
}

/// Walk `stack` with `path`, handing every resolved node to `visit`.
pub(crate) fn resolve(
    stack: &mut LayerStack,
    path: &KeyPath,
    visit: &mut dyn FnMut(OverrideTarget<'_>),
) {
    visit_layers(stack, path, 0, visit);
}

fn visit_layers(
    stack: &mut LayerStack,
    path: &KeyPath,
    depth: usize,
    visit: &mut dyn FnMut(OverrideTarget<'_>),
) {
    for layer in stack.layers_mut() {
        let next = path.advance(depth, layer.name());
        for d in next {
            if path.complete(d) {
                visit(OverrideTarget::Transform(layer.transform_mut()));
            }
            match layer.payload_mut() {
                LayerPayload::Shape(content) => {
                    visit_group_children(content, path, d, visit);
                }
                LayerPayload::Precomp { stack, .. } => visit_layers(stack, path, d, visit),
                _ => {}
            }
        }
    }
}

fn visit_group_children(
    group: &mut ContentGroup,
    path: &KeyPath,
    depth: usize,
    visit: &mut dyn FnMut(OverrideTarget<'_>),
) {
    for child in group.children_mut() {
        match child {
            ContentNode::Group(nested) => {
                for d in path.advance(depth, nested.name()) {
                    if path.complete(d)
                        && let Some(transform) = nested.transform_animator_mut()
                    {
                        visit(OverrideTarget::Transform(transform));
                    }
                    visit_group_children(nested, path, d, visit);
                }
            }
            ContentNode::Repeater(repeater) => {
                for d in path.advance(depth, repeater.name()) {
                    if path.complete(d) {
                        visit(OverrideTarget::Transform(repeater.transform_animator_mut()));
                    }
                    visit_group_children(repeater.contents_mut(), path, d, visit);
                }
            }
            ContentNode::Fill(fill) => {
                for d in path.advance(depth, fill.name()) {
                    if path.complete(d) {
                        visit(OverrideTarget::Fill(fill));
                    }
                }
            }
            ContentNode::Stroke(stroke) => {
                for d in path.advance(depth, stroke.name()) {
                    if path.complete(d) {
                        visit(OverrideTarget::Stroke(stroke));
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/keypath.rs"]
mod tests;
