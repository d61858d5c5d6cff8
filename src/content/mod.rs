//! Shape content tree: parametric geometry, paints, and path modifiers
//! instantiated from a layer's shape items.
//!
//! The tree mirrors the document's item order, which doubles as its paint
//! order: the last item of a group draws first (bottom), so a paint covers
//! everything recorded after it in the list. A paint takes its geometry
//! from the items above it in the same group, while trims and rounded
//! corners modify the geometry of items above themselves, including items
//! inside nested groups. Repeaters and merges are greedy: they swallow the
//! siblings above them when the tree is built.

pub mod modifiers;
pub mod paint;
pub mod shape_data;
pub mod shapes;
pub mod trim;

use std::sync::Arc;

use kurbo::{Affine, BezPath};

use crate::animation::color::ColorMixing;
use crate::animation::transform::TransformAnimator;
use crate::animation::value::{AnimatedValue, Interpolate};
use crate::composition::model::{
    MergeMode, RepeaterComposite, RepeaterModel, ShapeModel, Track, TrimMode,
};
use crate::content::modifiers::RoundedCornersContent;
use crate::content::paint::{FillContent, GradientFillContent, GradientStrokeContent, StrokeContent};
use crate::content::shapes::{
    EllipseShape, FreeformShape, PathProducer, PolystarShape, RectangleShape,
};
use crate::content::trim::{apply_joint_trim, apply_trim, ResolvedTrim, TrimContent};
use crate::foundation::error::AnimyteResult;
use crate::foundation::math::lerp;
use crate::render::display_list::{DisplayList, Geometry};

pub(crate) fn animated<T: Interpolate>(track: &Track<T>) -> AnimyteResult<AnimatedValue<T>> {
    AnimatedValue::new(Arc::clone(track))
}

pub(crate) fn opt_animated<T: Interpolate>(
    track: &Option<Track<T>>,
) -> AnimyteResult<Option<AnimatedValue<T>>> {
    track
        .as_ref()
        .map(|t| AnimatedValue::new(Arc::clone(t)))
        .transpose()
}

/// Multiply two 8-bit alphas.
pub(crate) fn combine_alpha(parent: u8, child: u8) -> u8 {
    ((u16::from(parent) * u16::from(child) + 127) / 255) as u8
}

/// Build the runtime content tree for a shape layer's item list.
pub(crate) fn build_content(
    shapes: &[ShapeModel],
    mixing: ColorMixing,
) -> AnimyteResult<ContentGroup> {
    Ok(ContentGroup {
        name: None,
        transform: None,
        children: build_nodes(shapes, mixing)?,
    })
}

fn build_nodes(shapes: &[ShapeModel], mixing: ColorMixing) -> AnimyteResult<Vec<ContentNode>> {
    let mut nodes = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let node = match shape {
            ShapeModel::Group(model) => ContentNode::Group(ContentGroup {
                name: model.name.clone(),
                transform: model
                    .transform
                    .as_ref()
                    .map(|t| TransformAnimator::from_model(t, false))
                    .transpose()?,
                children: build_nodes(&model.items, mixing)?,
            }),
            ShapeModel::Rectangle(model) => {
                ContentNode::Shape(PathProducer::Rectangle(RectangleShape::new(model)?))
            }
            ShapeModel::Ellipse(model) => {
                ContentNode::Shape(PathProducer::Ellipse(EllipseShape::new(model)?))
            }
            ShapeModel::Polystar(model) => {
                ContentNode::Shape(PathProducer::Polystar(PolystarShape::new(model)?))
            }
            ShapeModel::Path(model) => {
                ContentNode::Shape(PathProducer::Freeform(FreeformShape::new(model)?))
            }
            ShapeModel::Fill(model) => ContentNode::Fill(FillContent::new(model, mixing)?),
            ShapeModel::Stroke(model) => ContentNode::Stroke(StrokeContent::new(model, mixing)?),
            ShapeModel::GradientFill(model) => {
                ContentNode::GradientFill(GradientFillContent::new(model, mixing)?)
            }
            ShapeModel::GradientStroke(model) => {
                ContentNode::GradientStroke(GradientStrokeContent::new(model, mixing)?)
            }
            ShapeModel::Trim(model) => ContentNode::Trim(TrimContent::new(model)?),
            ShapeModel::RoundedCorners(model) => {
                ContentNode::RoundedCorners(RoundedCornersContent::new(model)?)
            }
            ShapeModel::Repeater(model) => ContentNode::Repeater(RepeaterContent::new(model)?),
            ShapeModel::Merge(model) => ContentNode::Merge(MergeContent {
                name: model.name.clone(),
                mode: model.mode,
                children: Vec::new(),
            }),
        };
        nodes.push(node);
    }
    absorb_greedy(&mut nodes);
    Ok(nodes)
}

/// Repeaters and merges swallow siblings above them: a repeater takes
/// everything, a merge takes only geometry sources and leaves paints and
/// modifiers in place.
fn absorb_greedy(nodes: &mut Vec<ContentNode>) {
    let mut i = 0;
    while i < nodes.len() {
        match &nodes[i] {
            ContentNode::Repeater(_) => {
                let absorbed: Vec<ContentNode> = nodes.drain(..i).collect();
                if let ContentNode::Repeater(repeater) = &mut nodes[0] {
                    repeater.children.children = absorbed;
                }
                i = 1;
            }
            ContentNode::Merge(_) => {
                let mut absorbed = Vec::new();
                let mut j = 0;
                let mut at = i;
                while j < at {
                    if produces_geometry(&nodes[j]) {
                        absorbed.push(nodes.remove(j));
                        at -= 1;
                    } else {
                        j += 1;
                    }
                }
                if let ContentNode::Merge(merge) = &mut nodes[at] {
                    merge.children = absorbed;
                }
                i = at + 1;
            }
            _ => i += 1,
        }
    }
}

fn produces_geometry(node: &ContentNode) -> bool {
    matches!(
        node,
        ContentNode::Shape(_)
            | ContentNode::Group(_)
            | ContentNode::Merge(_)
            | ContentNode::Repeater(_)
    )
}

/// One item of a content group.
#[derive(Debug)]
pub(crate) enum ContentNode {
    Group(ContentGroup),
    Shape(PathProducer),
    Fill(FillContent),
    Stroke(StrokeContent),
    GradientFill(GradientFillContent),
    GradientStroke(GradientStrokeContent),
    Trim(TrimContent),
    RoundedCorners(RoundedCornersContent),
    Repeater(RepeaterContent),
    Merge(MergeContent),
}

impl ContentNode {
    fn set_progress(&mut self, progress: f32) -> bool {
        match self {
            Self::Group(n) => n.set_progress(progress),
            Self::Shape(n) => n.set_progress(progress),
            Self::Fill(n) => n.set_progress(progress),
            Self::Stroke(n) => n.set_progress(progress),
            Self::GradientFill(n) => n.set_progress(progress),
            Self::GradientStroke(n) => n.set_progress(progress),
            Self::Trim(n) => n.set_progress(progress),
            Self::RoundedCorners(n) => n.set_progress(progress),
            Self::Repeater(n) => n.set_progress(progress),
            Self::Merge(n) => n.set_progress(progress),
        }
    }
}

/// Trims and corner rounding flowing into a nested scope from the groups
/// around it.
#[derive(Clone, Copy, Default)]
struct InheritedScope<'a> {
    trims: &'a [ResolvedTrim],
    round: Option<f32>,
}

/// This group's own trim and rounding modifiers, resolved at the current
/// progress and keyed by child index.
struct ModifierScope {
    sims: Vec<(usize, ResolvedTrim)>,
    indivs: Vec<(usize, ResolvedTrim)>,
    rounds: Vec<(usize, f32)>,
}

fn resolve_modifiers(children: &mut [ContentNode]) -> ModifierScope {
    let mut scope = ModifierScope {
        sims: Vec::new(),
        indivs: Vec::new(),
        rounds: Vec::new(),
    };
    for (i, child) in children.iter_mut().enumerate() {
        match child {
            ContentNode::Trim(trim) => {
                let resolved = trim.resolve();
                match trim.mode() {
                    TrimMode::Simultaneous => scope.sims.push((i, resolved)),
                    TrimMode::Individual => scope.indivs.push((i, resolved)),
                }
            }
            ContentNode::RoundedCorners(corners) => scope.rounds.push((i, corners.radius())),
            _ => {}
        }
    }
    scope
}

/// Trims applying to the child at `index`: inherited ones first, then this
/// scope's trims below the child, nearest last.
fn trims_for(
    inherited: InheritedScope<'_>,
    sims: &[(usize, ResolvedTrim)],
    index: usize,
) -> Vec<ResolvedTrim> {
    let mut trims: Vec<ResolvedTrim> = inherited.trims.to_vec();
    trims.extend(
        sims.iter()
            .rev()
            .filter(|(k, _)| *k > index)
            .map(|(_, trim)| *trim),
    );
    trims
}

/// Corner radius applying to the child at `index`: the nearest modifier
/// below it in this scope, falling back to the inherited one.
fn round_for(inherited: InheritedScope<'_>, rounds: &[(usize, f32)], index: usize) -> Option<f32> {
    rounds
        .iter()
        .find(|(k, _)| *k > index)
        .map(|(_, radius)| *radius)
        .or(inherited.round)
}

fn append_path(target: &mut BezPath, mut piece: BezPath, transform: Affine) {
    if transform != Affine::IDENTITY {
        piece.apply_affine(transform);
    }
    for el in piece.elements() {
        target.push(*el);
    }
}

/// Geometry of every producing child in `children`, trims and nested group
/// transforms already applied, with each child's index for grouping.
///
/// Boolean merges keep their operands separate so the paint can emit the
/// operator to the backend; a trim on top needs a concrete path and
/// collapses the merge to its concatenation first.
fn collect_entries(
    children: &mut [ContentNode],
    scope: &ModifierScope,
    inherited: InheritedScope<'_>,
    out: &mut Vec<(usize, Geometry)>,
) {
    for (i, child) in children.iter_mut().enumerate() {
        let path = match child {
            ContentNode::Shape(producer) => {
                producer.set_round_radius(round_for(inherited, &scope.rounds, i).unwrap_or(0.0));
                let mut path = producer.path().clone();
                for trim in trims_for(inherited, &scope.sims, i) {
                    path = apply_trim(&path, trim);
                }
                path
            }
            ContentNode::Merge(merge) => {
                let trims = trims_for(inherited, &scope.sims, i);
                if merge.mode().is_boolean() && trims.is_empty() {
                    let mode = merge.mode();
                    let operands = merge.operand_paths();
                    out.push((i, Geometry::Merged { mode, operands }));
                    continue;
                }
                let mut path = merge.merged_path();
                for trim in trims {
                    path = apply_trim(&path, trim);
                }
                path
            }
            ContentNode::Group(group) => {
                let trims = trims_for(inherited, &scope.sims, i);
                let round = round_for(inherited, &scope.rounds, i);
                group.group_path(InheritedScope {
                    trims: &trims,
                    round,
                })
            }
            ContentNode::Repeater(repeater) => {
                let trims = trims_for(inherited, &scope.sims, i);
                let round = round_for(inherited, &scope.rounds, i);
                repeater.repeated_path(InheritedScope {
                    trims: &trims,
                    round,
                })
            }
            _ => continue,
        };
        out.push((i, Geometry::Path(path)));
    }
}

/// Shape group: an ordered child list with an optional transform.
#[derive(Debug)]
pub(crate) struct ContentGroup {
    name: Option<String>,
    transform: Option<TransformAnimator>,
    children: Vec<ContentNode>,
}

impl ContentGroup {
    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn children_mut(&mut self) -> &mut [ContentNode] {
        &mut self.children
    }

    pub(crate) fn transform_animator_mut(&mut self) -> Option<&mut TransformAnimator> {
        self.transform.as_mut()
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = match self.transform.as_mut() {
            Some(transform) => transform.set_progress(progress),
            None => false,
        };
        for child in &mut self.children {
            changed |= child.set_progress(progress);
        }
        changed
    }

    /// Record this group's draw commands at the current progress.
    pub(crate) fn draw(&mut self, list: &mut DisplayList, parent: Affine, parent_alpha: u8) {
        self.draw_scoped(list, parent, parent_alpha, InheritedScope::default());
    }

    fn draw_scoped(
        &mut self,
        list: &mut DisplayList,
        parent: Affine,
        parent_alpha: u8,
        inherited: InheritedScope<'_>,
    ) {
        let (matrix, alpha) = match self.transform.as_mut() {
            Some(transform) => (
                parent * transform.matrix(),
                combine_alpha(parent_alpha, transform.opacity()),
            ),
            None => (parent, parent_alpha),
        };
        let scope = resolve_modifiers(&mut self.children);

        // Last child draws first, so earlier items paint on top.
        for i in (0..self.children.len()).rev() {
            let (before, rest) = self.children.split_at_mut(i);
            match &mut rest[0] {
                ContentNode::Group(group) => {
                    let trims = trims_for(inherited, &scope.sims, i);
                    let round = round_for(inherited, &scope.rounds, i);
                    group.draw_scoped(
                        list,
                        matrix,
                        alpha,
                        InheritedScope {
                            trims: &trims,
                            round,
                        },
                    );
                }
                ContentNode::Repeater(repeater) => {
                    let trims = trims_for(inherited, &scope.sims, i);
                    let round = round_for(inherited, &scope.rounds, i);
                    repeater.draw(
                        list,
                        matrix,
                        alpha,
                        InheritedScope {
                            trims: &trims,
                            round,
                        },
                    );
                }
                ContentNode::Fill(fill) => {
                    let mut entries = Vec::new();
                    collect_entries(before, &scope, inherited, &mut entries);
                    fill.emit(list, concat_entries(entries), matrix, alpha);
                }
                ContentNode::GradientFill(fill) => {
                    let mut entries = Vec::new();
                    collect_entries(before, &scope, inherited, &mut entries);
                    fill.emit(list, concat_entries(entries), matrix, alpha);
                }
                ContentNode::Stroke(stroke) => {
                    let mut entries = Vec::new();
                    collect_entries(before, &scope, inherited, &mut entries);
                    for path in stroke_groups(entries, &scope.indivs, i) {
                        stroke.emit(list, path, matrix, alpha);
                    }
                }
                ContentNode::GradientStroke(stroke) => {
                    let mut entries = Vec::new();
                    collect_entries(before, &scope, inherited, &mut entries);
                    for path in stroke_groups(entries, &scope.indivs, i) {
                        stroke.emit(list, path, matrix, alpha);
                    }
                }
                ContentNode::Shape(_)
                | ContentNode::Trim(_)
                | ContentNode::RoundedCorners(_)
                | ContentNode::Merge(_) => {}
            }
        }
    }

    /// The group's geometry as one path, outside any modifier scope.
    pub(crate) fn combined_path(&mut self) -> BezPath {
        self.group_path(InheritedScope::default())
    }

    /// This group as one path: every producing child concatenated, with the
    /// group's own transform applied. Group opacity does not affect
    /// geometry.
    fn group_path(&mut self, inherited: InheritedScope<'_>) -> BezPath {
        let matrix = match self.transform.as_mut() {
            Some(transform) => transform.matrix(),
            None => Affine::IDENTITY,
        };
        let scope = resolve_modifiers(&mut self.children);
        let mut entries = Vec::new();
        collect_entries(&mut self.children, &scope, inherited, &mut entries);
        let mut path = BezPath::new();
        for (_, piece) in entries {
            append_path(&mut path, piece.into_path(), matrix);
        }
        path
    }
}

/// Fold collected entries into the geometry one paint draws. A lone boolean
/// merge passes through intact; anything else flattens into a single path,
/// a merge beside other producers contributing its concatenation.
fn concat_entries(mut entries: Vec<(usize, Geometry)>) -> Geometry {
    if entries.len() == 1
        && let Some((_, geometry)) = entries.pop()
    {
        return geometry;
    }
    let mut path = BezPath::new();
    for (_, piece) in entries {
        append_path(&mut path, piece.into_path(), Affine::IDENTITY);
    }
    Geometry::Path(path)
}

/// Partition a stroke's geometry by the individual-mode trims above it.
/// A trim governs the entries between it and the next trim above; entries
/// below every trim pass through untouched. Each partition becomes one
/// stroked path so dash phase and trim windows run across its members.
fn stroke_groups(
    entries: Vec<(usize, Geometry)>,
    indivs: &[(usize, ResolvedTrim)],
    upto: usize,
) -> Vec<Geometry> {
    let applicable: Vec<(usize, ResolvedTrim)> = indivs
        .iter()
        .filter(|(k, _)| *k < upto)
        .copied()
        .collect();
    if applicable.is_empty() {
        return vec![concat_entries(entries)];
    }

    let mut groups = Vec::with_capacity(applicable.len() + 1);
    let mut start = 0usize;
    for (k, trim) in applicable {
        let members: Vec<BezPath> = entries
            .iter()
            .filter(|(i, _)| *i >= start && *i < k)
            .map(|(_, g)| g.clone().into_path())
            .collect();
        if !members.is_empty() {
            let mut path = BezPath::new();
            for piece in apply_joint_trim(&members, trim) {
                append_path(&mut path, piece, Affine::IDENTITY);
            }
            groups.push(Geometry::Path(path));
        }
        start = k;
    }
    let tail: Vec<BezPath> = entries
        .iter()
        .filter(|(i, _)| *i >= start)
        .map(|(_, g)| g.clone().into_path())
        .collect();
    if !tail.is_empty() {
        let mut path = BezPath::new();
        for piece in tail {
            append_path(&mut path, piece, Affine::IDENTITY);
        }
        groups.push(Geometry::Path(path));
    }
    groups
}

/// Repeater: draws its swallowed children several times with a per-copy
/// transform and opacity fade.
#[derive(Debug)]
pub(crate) struct RepeaterContent {
    name: Option<String>,
    copies: AnimatedValue<f32>,
    offset: Option<AnimatedValue<f32>>,
    composite: RepeaterComposite,
    transform: TransformAnimator,
    children: ContentGroup,
}

impl RepeaterContent {
    fn new(model: &RepeaterModel) -> AnimyteResult<Self> {
        Ok(Self {
            name: model.name.clone(),
            copies: animated(&model.copies)?,
            offset: opt_animated(&model.offset)?,
            composite: model.composite,
            transform: TransformAnimator::from_model(&model.transform, false)?,
            children: ContentGroup {
                name: None,
                transform: None,
                children: Vec::new(),
            },
        })
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn contents_mut(&mut self) -> &mut ContentGroup {
        &mut self.children
    }

    pub(crate) fn transform_animator_mut(&mut self) -> &mut TransformAnimator {
        &mut self.transform
    }

    fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = self.copies.set_progress(progress);
        if let Some(offset) = self.offset.as_mut() {
            changed |= offset.set_progress(progress);
        }
        changed |= self.transform.set_progress(progress);
        changed |= self.children.set_progress(progress);
        changed
    }

    fn draw(
        &mut self,
        list: &mut DisplayList,
        parent: Affine,
        parent_alpha: u8,
        inherited: InheritedScope<'_>,
    ) {
        let copies = self.copies.value();
        let count = copies as i64;
        let offset = self.offset.as_mut().map_or(0.0, |v| v.value());
        let start = self.transform.start_opacity().map_or(1.0, |p| p / 100.0);
        let end = self.transform.end_opacity().map_or(1.0, |p| p / 100.0);

        // Copy zero lands on top unless the document asks for the reverse.
        let order: Vec<i64> = match self.composite {
            RepeaterComposite::Above => (0..count).rev().collect(),
            RepeaterComposite::Below => (0..count).collect(),
        };
        for i in order {
            let matrix = parent * self.transform.matrix_for_repeater(i as f32 + offset);
            let fade = lerp(start, end, i as f32 / copies);
            let alpha = (f32::from(parent_alpha) * fade).round().clamp(0.0, 255.0) as u8;
            self.children.draw_scoped(list, matrix, alpha, inherited);
        }
    }

    /// The repeater as geometry: each copy of the swallowed children under
    /// its copy transform, top copy first.
    fn repeated_path(&mut self, inherited: InheritedScope<'_>) -> BezPath {
        let copies = self.copies.value();
        let count = copies as i64;
        let offset = self.offset.as_mut().map_or(0.0, |v| v.value());
        let base = self.children.group_path(inherited);
        let mut path = BezPath::new();
        for i in (0..count).rev() {
            let matrix = self.transform.matrix_for_repeater(i as f32 + offset);
            append_path(&mut path, base.clone(), matrix);
        }
        path
    }
}

/// Merge paths: combines the geometry sources it swallowed. Merge and Add
/// concatenate; boolean modes hand their operands to the paint so the draw
/// command can carry the operator to the backend.
#[derive(Debug)]
pub(crate) struct MergeContent {
    name: Option<String>,
    mode: MergeMode,
    children: Vec<ContentNode>,
}

impl MergeContent {
    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn mode(&self) -> MergeMode {
        self.mode
    }

    fn set_progress(&mut self, progress: f32) -> bool {
        let mut changed = false;
        for child in &mut self.children {
            changed |= child.set_progress(progress);
        }
        changed
    }

    /// Swallowed geometry concatenated in reverse document order. The
    /// fallback shape when the boolean operands cannot survive (a trim on
    /// top, or nesting inside another producer).
    fn merged_path(&mut self) -> BezPath {
        let mut path = BezPath::new();
        for node in self.children.iter_mut().rev() {
            if let Some(piece) = node_geometry(node) {
                append_path(&mut path, piece, Affine::IDENTITY);
            }
        }
        path
    }

    /// Swallowed geometry as separate operands, document order. The first
    /// is the base the boolean operator folds the rest onto.
    fn operand_paths(&mut self) -> Vec<BezPath> {
        self.children
            .iter_mut()
            .filter_map(node_geometry)
            .collect()
    }
}

/// Raw geometry of a swallowed node. Swallowed nodes sit outside every
/// modifier scope, so no trims or rounding apply.
fn node_geometry(node: &mut ContentNode) -> Option<BezPath> {
    match node {
        ContentNode::Shape(producer) => Some(producer.path().clone()),
        ContentNode::Merge(merge) => Some(merge.merged_path()),
        ContentNode::Group(group) => Some(group.group_path(InheritedScope::default())),
        ContentNode::Repeater(repeater) => {
            Some(repeater.repeated_path(InheritedScope::default()))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/tree.rs"]
mod tests;
