//! Backend-agnostic draw command list for a single frame.
//!
//! Evaluating a frame produces a [`DisplayList`]: a flat, self-contained
//! sequence of [`DrawCommand`]s with resolved geometry, paints, and
//! transforms. The list holds no references into the evaluation graph, so it
//! can be replayed any number of times, inspected in tests, or shipped across
//! a thread boundary to the embedder's rasterizer.

use kurbo::{Affine, BezPath, Point, Vec2};

use crate::animation::color::GradientColor;
use crate::composition::model::{BlendMode, FillRule, LineCap, LineJoin, MatteType, MergeMode};
use crate::foundation::core::Rgba;

#[derive(Clone, Debug)]
/// Geometry a paint command draws: one resolved path, or merge-path operands
/// kept separate so backends with native path booleans can apply the real
/// combine.
pub enum Geometry {
    /// One concrete path.
    Path(BezPath),
    /// Paths combined by a boolean operator. Operands are in document
    /// order: the first is the base and each following operand is applied
    /// with `mode`.
    Merged {
        /// Boolean operator.
        mode: MergeMode,
        /// Operand paths in document order.
        operands: Vec<BezPath>,
    },
}

impl Geometry {
    /// Collapse to a single path, concatenating merged operands. The
    /// fallback for surfaces without boolean path support.
    pub fn into_path(self) -> BezPath {
        match self {
            Self::Path(path) => path,
            Self::Merged { operands, .. } => concat_paths(&operands),
        }
    }
}

impl From<BezPath> for Geometry {
    fn from(path: BezPath) -> Self {
        Self::Path(path)
    }
}

/// One path holding every element of `operands`, in order.
pub(crate) fn concat_paths(operands: &[BezPath]) -> BezPath {
    let mut path = BezPath::new();
    for operand in operands {
        for el in operand.elements() {
            path.push(*el);
        }
    }
    path
}

#[derive(Clone, Debug)]
/// Resolved paint for a fill or stroke command.
pub enum Paint {
    /// Flat color.
    Solid(Rgba),
    /// Linear gradient between two points in command-local space.
    Linear {
        /// Ramp start point.
        start: Point,
        /// Ramp end point.
        end: Point,
        /// Resolved stop ramp.
        stops: GradientColor,
    },
    /// Radial gradient from a center point.
    Radial {
        /// Gradient center.
        center: Point,
        /// Gradient radius.
        radius: f64,
        /// Resolved stop ramp.
        stops: GradientColor,
    },
}

#[derive(Clone, Debug)]
/// Resolved stroke geometry parameters.
pub struct StrokeStyle {
    /// Stroke width in document units.
    pub width: f64,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Miter limit (meaningful for [`LineJoin::Miter`]).
    pub miter_limit: f64,
    /// Dash/gap run lengths; empty means a solid stroke.
    pub dashes: Vec<f64>,
    /// Phase offset into the dash pattern.
    pub dash_offset: f64,
}

#[derive(Clone, Debug)]
/// Resolved layer effect, applied when the owning layer group is composited.
pub enum LayerEffect {
    /// Gaussian blur over the finished group.
    Blur {
        /// Blur radius in document units.
        radius: f64,
    },
    /// Drop shadow painted behind the group's content.
    DropShadow {
        /// Shadow color; the effect's opacity is folded into the alpha
        /// channel.
        color: Rgba,
        /// Offset from the content in document units.
        offset: Vec2,
        /// Softening blur radius.
        softness: f64,
    },
}

#[derive(Clone, Debug)]
/// One drawing or grouping operation.
///
/// Grouping commands nest: every [`DrawCommand::PushLayer`] is closed by a
/// matching [`DrawCommand::PopLayer`], every [`DrawCommand::PushClip`] by a
/// [`DrawCommand::PopClip`]. A [`DrawCommand::BeginMatte`] switches the
/// innermost open layer from content to matte recording; the matte gates the
/// layer's content when the layer is popped.
pub enum DrawCommand {
    /// Fill a path.
    Fill {
        /// Path geometry in command-local space.
        path: BezPath,
        /// Local-to-canvas transform.
        transform: Affine,
        /// Resolved paint.
        paint: Paint,
        /// Fill rule.
        rule: FillRule,
        /// Opacity in `0..=255`.
        alpha: u8,
    },
    /// Stroke a path.
    Stroke {
        /// Path geometry in command-local space.
        path: BezPath,
        /// Local-to-canvas transform.
        transform: Affine,
        /// Resolved paint.
        paint: Paint,
        /// Stroke parameters.
        style: StrokeStyle,
        /// Opacity in `0..=255`.
        alpha: u8,
    },
    /// Fill merge-path operands combined by a boolean operator. Surfaces
    /// without native path booleans concatenate the operands.
    FillMerged {
        /// Operand paths in document order.
        operands: Vec<BezPath>,
        /// Boolean operator folding the operands left to right.
        mode: MergeMode,
        /// Local-to-canvas transform.
        transform: Affine,
        /// Resolved paint.
        paint: Paint,
        /// Fill rule.
        rule: FillRule,
        /// Opacity in `0..=255`.
        alpha: u8,
    },
    /// Stroke the outline of merge-path operands combined by a boolean
    /// operator.
    StrokeMerged {
        /// Operand paths in document order.
        operands: Vec<BezPath>,
        /// Boolean operator folding the operands left to right.
        mode: MergeMode,
        /// Local-to-canvas transform.
        transform: Affine,
        /// Resolved paint.
        paint: Paint,
        /// Stroke parameters.
        style: StrokeStyle,
        /// Opacity in `0..=255`.
        alpha: u8,
    },
    /// Draw a bitmap asset. Pixel data is owned by the embedder; the command
    /// carries the document's asset id.
    Image {
        /// Image asset id (see `Composition::asset`).
        asset: String,
        /// Local-to-canvas transform.
        transform: Affine,
        /// Opacity in `0..=255`.
        alpha: u8,
    },
    /// Open an isolated group. Content drawn until the matching
    /// [`DrawCommand::PopLayer`] is composited as a unit.
    PushLayer {
        /// Group opacity in `0..=255`.
        alpha: u8,
        /// Blend mode against the backdrop.
        blend: BlendMode,
        /// Effects applied to the finished group before compositing.
        effects: Vec<LayerEffect>,
    },
    /// Switch the innermost open layer to matte recording: subsequent
    /// commands up to the matching [`DrawCommand::PopLayer`] draw the matte
    /// source, which gates the layer's content per `mode`.
    BeginMatte {
        /// How the matte gates the content.
        mode: MatteType,
    },
    /// Close the innermost open layer and composite it.
    PopLayer,
    /// Clip subsequent commands to a path until the matching
    /// [`DrawCommand::PopClip`].
    PushClip {
        /// Clip geometry in command-local space.
        path: BezPath,
        /// Local-to-canvas transform.
        transform: Affine,
        /// Clip to the outside of the path instead of the inside.
        inverted: bool,
        /// Mask opacity in `0..=255`. Values below 255 request a soft mask;
        /// surfaces without soft-mask support may treat this as on/off.
        alpha: u8,
    },
    /// Pop the innermost clip.
    PopClip,
}

#[derive(Debug, Default)]
/// Recorded draw commands for one frame.
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all recorded commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Append a command.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Recorded commands in draw order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display_list.rs"]
mod tests;
