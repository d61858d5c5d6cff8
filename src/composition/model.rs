use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Point, Vec2};

use crate::animation::color::GradientColor;
use crate::animation::keyframe::Keyframe;
use crate::content::shape_data::ShapeData;
use crate::foundation::core::{Canvas, FrameRange, Rgba};

/// Immutable, shared keyframe track. Players wrap these in per-instance
/// animators; the track data itself is never mutated after build.
pub type Track<T> = Arc<Vec<Keyframe<T>>>;

#[derive(Clone, Debug)]
/// A parsed animation document: canvas, frame range, layer stack, assets,
/// markers, fonts and glyphs, plus any warnings collected while building.
///
/// The composition is a pure data model. It is safe to cache, share across
/// threads behind an [`Arc`], and instantiate any number of players from.
pub struct Composition {
    /// Document name, when authored.
    pub name: Option<String>,
    /// Exporter version string.
    pub version: Option<String>,
    /// Canvas size in document units.
    pub canvas: Canvas,
    /// Authored frame range.
    pub range: FrameRange,
    /// Frames per second.
    pub frame_rate: f32,
    /// Root layer stack, topmost first (document order).
    pub layers: Vec<LayerModel>,
    /// Precomp and image assets by id.
    pub assets: HashMap<String, Asset>,
    /// Named timeline markers.
    pub markers: Vec<Marker>,
    /// Declared fonts by font name.
    pub fonts: HashMap<String, Font>,
    /// Embedded glyph geometry.
    pub characters: HashMap<CharacterId, Character>,
    /// Non-fatal issues found while parsing, deduplicated.
    pub warnings: Vec<String>,
}

impl Composition {
    /// Playback duration in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        if self.frame_rate == 0.0 {
            return 0.0;
        }
        self.range.duration_frames() / self.frame_rate * 1000.0
    }

    /// Frame for a normalized progress across the composition.
    pub fn frame_for_progress(&self, progress: f32) -> f32 {
        self.range.frame_for_progress(progress)
    }

    /// Normalized progress for an absolute frame.
    pub fn progress_for_frame(&self, frame: f32) -> f32 {
        self.range.progress_for_frame(frame)
    }

    /// Look up a marker by exact name.
    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.matches(name))
    }

    /// Look up an asset by id.
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Look up a declared font by its unique name.
    pub fn font(&self, name: &str) -> Option<&Font> {
        self.fonts.get(name)
    }

    /// Look up embedded glyph geometry.
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }
}

#[derive(Clone, Debug)]
/// Named timeline span.
pub struct Marker {
    /// Marker name.
    pub name: String,
    /// First frame.
    pub start_frame: f32,
    /// Span length in frames.
    pub duration_frames: f32,
}

impl Marker {
    /// Frame the marker's span ends at.
    pub fn end_frame(&self) -> f32 {
        self.start_frame + self.duration_frames
    }

    /// Whether `name` refers to this marker. The match is case-sensitive
    /// and exact.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }
}

#[derive(Clone, Debug)]
/// One reusable asset.
pub enum Asset {
    /// Nested layer stack instantiated by precomp layers.
    Precomp(PrecompAsset),
    /// Bitmap reference drawn by image layers.
    Image(ImageAsset),
}

#[derive(Clone, Debug)]
/// Precomp asset: an independently authored layer stack.
pub struct PrecompAsset {
    /// Layer stack, topmost first.
    pub layers: Vec<LayerModel>,
}

#[derive(Clone, Debug)]
/// Image asset metadata. Pixel data is resolved by the embedding
/// application; this core only forwards the reference.
pub struct ImageAsset {
    /// Intrinsic width, document units.
    pub width: u32,
    /// Intrinsic height, document units.
    pub height: u32,
    /// File name, or a data URI for embedded images.
    pub file: String,
    /// Directory prefix for `file`.
    pub directory: String,
}

#[derive(Clone, Debug)]
/// One layer in a stack.
pub struct LayerModel {
    /// Layer name, when authored.
    pub name: Option<String>,
    /// Stack-unique id referenced by children.
    pub id: Option<u32>,
    /// Parent layer id for transform inheritance.
    pub parent: Option<u32>,
    /// Type-specific payload.
    pub kind: LayerKind,
    /// Layer transform.
    pub transform: TransformModel,
    /// Derive rotation from position travel.
    pub auto_orient: bool,
    /// First visible frame (layer-local timeline).
    pub in_frame: f32,
    /// First invisible frame.
    pub out_frame: f32,
    /// Offset of the layer's local timeline, in parent frames.
    pub start_frame: f32,
    /// Time stretch factor; local frames advance at `1 / stretch`.
    pub stretch: f32,
    /// Blend mode against the backdrop.
    pub blend_mode: BlendMode,
    /// Matte applied from the layer above, when this layer consumes one.
    pub matte: Option<MatteType>,
    /// Whether this layer is a matte source consumed by the layer below.
    pub is_matte_source: bool,
    /// Masks intersected with the layer's own content.
    pub masks: Vec<MaskModel>,
    /// Effect stack.
    pub effects: Vec<EffectModel>,
    /// Hidden layers parse but never draw.
    pub hidden: bool,
}

#[derive(Clone, Debug)]
/// Layer type payload.
pub enum LayerKind {
    /// Nested sub-composition.
    Precomp {
        /// Asset id of the nested layer stack.
        asset: String,
        /// Reference size used to clip the nested content.
        size: Canvas,
        /// Time remap track, in seconds of the asset's timeline.
        time_remap: Option<Track<f32>>,
    },
    /// Flat color rectangle.
    Solid {
        /// Fill color.
        color: Rgba,
        /// Solid size.
        size: Canvas,
    },
    /// Bitmap layer.
    Image {
        /// Image asset id.
        asset: String,
    },
    /// Transform-only layer, a parenting target.
    Null,
    /// Vector shape stack.
    Shape {
        /// Shape items, document order.
        shapes: Vec<ShapeModel>,
    },
    /// Styled text.
    Text {
        /// Keyframed text documents (hold-stepped).
        documents: Track<TextDocument>,
    },
}

#[derive(Clone, Debug, Default)]
/// Parsed transform tracks. Absent tracks fall back to identity defaults
/// when instantiated.
pub struct TransformModel {
    /// Anchor point track.
    pub anchor: Option<Track<Point>>,
    /// Position track, unified or split.
    pub position: Option<PositionModel>,
    /// Scale factor track.
    pub scale: Option<Track<Vec2>>,
    /// Rotation track, degrees.
    pub rotation: Option<Track<f32>>,
    /// Opacity track, percent.
    pub opacity: Option<Track<f32>>,
    /// Skew track, degrees.
    pub skew: Option<Track<f32>>,
    /// Skew axis track, degrees.
    pub skew_angle: Option<Track<f32>>,
    /// Repeater-only first-copy opacity percent.
    pub start_opacity: Option<Track<f32>>,
    /// Repeater-only last-copy opacity percent.
    pub end_opacity: Option<Track<f32>>,
}

#[derive(Clone, Debug)]
/// Position data, mirroring the document's unified/split forms.
pub enum PositionModel {
    /// One 2D track.
    Unified(Track<Point>),
    /// Independently keyframed axes.
    Split {
        /// X axis track.
        x: Track<f32>,
        /// Y axis track.
        y: Track<f32>,
    },
}

#[derive(Clone, Debug)]
/// One mask on a layer.
pub struct MaskModel {
    /// How the mask combines with others on the same layer.
    pub mode: MaskMode,
    /// Mask geometry track.
    pub path: Track<ShapeData>,
    /// Mask opacity percent.
    pub opacity: Option<Track<f32>>,
    /// Inverted flag.
    pub inverted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Mask combine mode.
pub enum MaskMode {
    /// Union with the accumulated mask.
    Add,
    /// Subtract from the accumulated mask.
    Subtract,
    /// Intersect with the accumulated mask.
    Intersect,
    /// Parsed but not applied.
    None,
}

#[derive(Clone, Debug)]
/// One layer effect.
pub enum EffectModel {
    /// Gaussian blur with an animatable blurriness.
    GaussianBlur {
        /// Blurriness track, document units.
        radius: Track<f32>,
    },
    /// Drop shadow behind the layer's content.
    DropShadow {
        /// Shadow color.
        color: Track<Rgba>,
        /// Shadow opacity, `0..=255` in the document.
        opacity: Track<f32>,
        /// Light direction, degrees.
        direction: Track<f32>,
        /// Shadow distance, document units.
        distance: Track<f32>,
        /// Blur softness, document units.
        softness: Track<f32>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Layer blend mode against the backdrop.
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Color dodge.
    ColorDodge,
    /// Color burn.
    ColorBurn,
    /// Hard light.
    HardLight,
    /// Soft light.
    SoftLight,
    /// Difference.
    Difference,
    /// Exclusion.
    Exclusion,
    /// Hue.
    Hue,
    /// Saturation.
    Saturation,
    /// Color.
    Color,
    /// Luminosity.
    Luminosity,
    /// Linear dodge (add).
    Add,
}

impl BlendMode {
    /// Map a document blend mode index; unknown indices fall back to
    /// [`BlendMode::Normal`].
    pub fn from_index(index: u32) -> Option<Self> {
        Some(match index {
            0 => Self::Normal,
            1 => Self::Multiply,
            2 => Self::Screen,
            3 => Self::Overlay,
            4 => Self::Darken,
            5 => Self::Lighten,
            6 => Self::ColorDodge,
            7 => Self::ColorBurn,
            8 => Self::HardLight,
            9 => Self::SoftLight,
            10 => Self::Difference,
            11 => Self::Exclusion,
            12 => Self::Hue,
            13 => Self::Saturation,
            14 => Self::Color,
            15 => Self::Luminosity,
            16 => Self::Add,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How a consumer layer reads its matte source.
pub enum MatteType {
    /// Source alpha gates the consumer.
    Alpha,
    /// Inverse of the source alpha.
    AlphaInverted,
    /// Source luminance gates the consumer.
    Luma,
    /// Inverse of the source luminance.
    LumaInverted,
}

impl MatteType {
    /// Map a document `tt` index.
    pub fn from_index(index: u32) -> Option<Self> {
        Some(match index {
            1 => Self::Alpha,
            2 => Self::AlphaInverted,
            3 => Self::Luma,
            4 => Self::LumaInverted,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
/// One shape item.
pub enum ShapeModel {
    /// Nested group with its own transform.
    Group(GroupModel),
    /// Parametric rectangle.
    Rectangle(RectangleModel),
    /// Parametric ellipse.
    Ellipse(EllipseModel),
    /// Parametric star or polygon.
    Polystar(PolystarModel),
    /// Freeform bezier path.
    Path(PathModel),
    /// Solid fill.
    Fill(FillModel),
    /// Solid stroke.
    Stroke(StrokeModel),
    /// Gradient fill.
    GradientFill(GradientFillModel),
    /// Gradient stroke.
    GradientStroke(GradientStrokeModel),
    /// Trim paths modifier.
    Trim(TrimModel),
    /// Rounded corners modifier.
    RoundedCorners(RoundedCornersModel),
    /// Repeater modifier.
    Repeater(RepeaterModel),
    /// Merge paths operator.
    Merge(MergeModel),
}

#[derive(Clone, Debug)]
/// Shape group: ordered children plus an optional transform.
pub struct GroupModel {
    /// Group name.
    pub name: Option<String>,
    /// Child items, document order (drawn back-to-front in reverse).
    pub items: Vec<ShapeModel>,
    /// Group transform extracted from the trailing `tr` item.
    pub transform: Option<TransformModel>,
}

#[derive(Clone, Debug)]
/// Parametric rectangle.
pub struct RectangleModel {
    /// Shape name.
    pub name: Option<String>,
    /// Center position.
    pub position: Track<Point>,
    /// Width/height pair.
    pub size: Track<Point>,
    /// Corner radius.
    pub radius: Track<f32>,
    /// Reverse the default winding.
    pub reversed: bool,
}

#[derive(Clone, Debug)]
/// Parametric ellipse.
pub struct EllipseModel {
    /// Shape name.
    pub name: Option<String>,
    /// Center position.
    pub position: Track<Point>,
    /// Width/height pair.
    pub size: Track<Point>,
    /// Reverse the default winding.
    pub reversed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Polystar family.
pub enum StarType {
    /// Alternating outer/inner points.
    Star,
    /// Regular polygon.
    Polygon,
}

#[derive(Clone, Debug)]
/// Parametric star or polygon.
pub struct PolystarModel {
    /// Shape name.
    pub name: Option<String>,
    /// Star or polygon.
    pub star_type: StarType,
    /// Point count (fractional while animating).
    pub points: Track<f32>,
    /// Center position.
    pub position: Track<Point>,
    /// Rotation, degrees.
    pub rotation: Track<f32>,
    /// Inner radius (stars only).
    pub inner_radius: Option<Track<f32>>,
    /// Inner roundness percent (stars only).
    pub inner_roundness: Option<Track<f32>>,
    /// Outer radius.
    pub outer_radius: Track<f32>,
    /// Outer roundness percent.
    pub outer_roundness: Option<Track<f32>>,
}

#[derive(Clone, Debug)]
/// Freeform path geometry.
pub struct PathModel {
    /// Shape name.
    pub name: Option<String>,
    /// Keyframed geometry.
    pub shape: Track<ShapeData>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Path fill rule.
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd.
    EvenOdd,
}

#[derive(Clone, Debug)]
/// Solid fill paint.
pub struct FillModel {
    /// Shape name.
    pub name: Option<String>,
    /// Fill color.
    pub color: Track<Rgba>,
    /// Opacity percent.
    pub opacity: Option<Track<f32>>,
    /// Fill rule.
    pub rule: FillRule,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Stroke cap style.
pub enum LineCap {
    /// Flat cap at the endpoint.
    #[default]
    Butt,
    /// Semicircular cap.
    Round,
    /// Square cap extending past the endpoint.
    Square,
}

impl LineCap {
    /// Map a document `lc` index.
    pub fn from_index(index: u32) -> Self {
        match index {
            2 => Self::Round,
            3 => Self::Square,
            _ => Self::Butt,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Stroke join style.
pub enum LineJoin {
    /// Miter join.
    #[default]
    Miter,
    /// Round join.
    Round,
    /// Bevel join.
    Bevel,
}

impl LineJoin {
    /// Map a document `lj` index.
    pub fn from_index(index: u32) -> Self {
        match index {
            2 => Self::Round,
            3 => Self::Bevel,
            _ => Self::Miter,
        }
    }
}

#[derive(Clone, Debug)]
/// One dash pattern entry.
pub struct DashElement {
    /// Dash, gap, or phase offset.
    pub kind: DashKind,
    /// Entry length (or offset distance).
    pub value: Track<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Dash entry kind.
pub enum DashKind {
    /// Painted run length.
    Dash,
    /// Unpainted run length.
    Gap,
    /// Pattern phase offset.
    Offset,
}

#[derive(Clone, Debug)]
/// Solid stroke paint.
pub struct StrokeModel {
    /// Shape name.
    pub name: Option<String>,
    /// Stroke color.
    pub color: Track<Rgba>,
    /// Opacity percent.
    pub opacity: Option<Track<f32>>,
    /// Stroke width, document units.
    pub width: Track<f32>,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Miter limit.
    pub miter_limit: f32,
    /// Dash pattern entries.
    pub dashes: Vec<DashElement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Gradient geometry.
pub enum GradientKind {
    /// Linear ramp between two points.
    Linear,
    /// Radial ramp from a center to an edge point.
    Radial,
}

#[derive(Clone, Debug)]
/// Gradient fill paint.
pub struct GradientFillModel {
    /// Shape name.
    pub name: Option<String>,
    /// Linear or radial.
    pub kind: GradientKind,
    /// Keyframed stop ramp.
    pub stops: Track<GradientColor>,
    /// Gradient start point.
    pub start: Track<Point>,
    /// Gradient end point.
    pub end: Track<Point>,
    /// Radial highlight length percent.
    pub highlight_length: Option<Track<f32>>,
    /// Radial highlight angle, degrees.
    pub highlight_angle: Option<Track<f32>>,
    /// Opacity percent.
    pub opacity: Option<Track<f32>>,
    /// Fill rule.
    pub rule: FillRule,
}

#[derive(Clone, Debug)]
/// Gradient stroke paint.
pub struct GradientStrokeModel {
    /// Gradient paint parameters.
    pub gradient: GradientFillModel,
    /// Stroke width, document units.
    pub width: Track<f32>,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Miter limit.
    pub miter_limit: f32,
    /// Dash pattern entries.
    pub dashes: Vec<DashElement>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Whether a trim applies across sibling paths jointly or to each path.
pub enum TrimMode {
    /// One arc-length domain across all affected paths.
    #[default]
    Simultaneous,
    /// Each path trimmed independently.
    Individual,
}

#[derive(Clone, Debug)]
/// Trim paths modifier.
pub struct TrimModel {
    /// Shape name.
    pub name: Option<String>,
    /// Segment start percent.
    pub start: Track<f32>,
    /// Segment end percent.
    pub end: Track<f32>,
    /// Segment rotation offset, degrees.
    pub offset: Track<f32>,
    /// Joint or per-path application.
    pub mode: TrimMode,
}

#[derive(Clone, Debug)]
/// Rounded corners modifier.
pub struct RoundedCornersModel {
    /// Shape name.
    pub name: Option<String>,
    /// Corner radius, document units.
    pub radius: Track<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Stacking order of repeater copies.
pub enum RepeaterComposite {
    /// The original copy stays on top of the stack.
    #[default]
    Above,
    /// Copies stack over the original.
    Below,
}

#[derive(Clone, Debug)]
/// Repeater modifier.
pub struct RepeaterModel {
    /// Shape name.
    pub name: Option<String>,
    /// Copy count (fractional while animating).
    pub copies: Track<f32>,
    /// Copy index offset.
    pub offset: Option<Track<f32>>,
    /// Copy stacking order.
    pub composite: RepeaterComposite,
    /// Per-copy transform, including start/end opacity fade.
    pub transform: TransformModel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Merge paths operator mode.
pub enum MergeMode {
    /// Append all absorbed geometry.
    Merge,
    /// Boolean union.
    Add,
    /// Boolean subtract.
    Subtract,
    /// Boolean intersect.
    Intersect,
    /// Boolean exclusive-or.
    ExcludeIntersections,
}

impl MergeMode {
    /// Map a document `mm` index.
    pub fn from_index(index: u32) -> Option<Self> {
        Some(match index {
            1 => Self::Merge,
            2 => Self::Add,
            3 => Self::Subtract,
            4 => Self::Intersect,
            5 => Self::ExcludeIntersections,
            _ => return None,
        })
    }

    /// Whether this mode needs a real path boolean. Merge and Add draw the
    /// same as appended geometry under a nonzero fill; the remaining modes
    /// change the outline.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            Self::Subtract | Self::Intersect | Self::ExcludeIntersections
        )
    }
}

#[derive(Clone, Debug)]
/// Merge paths operator.
pub struct MergeModel {
    /// Shape name.
    pub name: Option<String>,
    /// Operator mode.
    pub mode: MergeMode,
}

#[derive(Clone, Debug)]
/// Declared font.
pub struct Font {
    /// Unique name referenced by text documents.
    pub name: String,
    /// Family name.
    pub family: String,
    /// Style string.
    pub style: String,
    /// Ascent, percent of em size.
    pub ascent: f32,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
/// Key for embedded glyph lookup.
pub struct CharacterId {
    /// The character.
    pub ch: char,
    /// Font family.
    pub family: String,
    /// Style string.
    pub style: String,
}

#[derive(Clone, Debug)]
/// Embedded glyph geometry.
pub struct Character {
    /// The character.
    pub ch: char,
    /// Advance width at the authored size.
    pub width: f32,
    /// Em size the outlines are authored at.
    pub size: f32,
    /// Outline shapes.
    pub shapes: Vec<ShapeModel>,
}

#[derive(Clone, Debug, PartialEq)]
/// Styled text content at one keyframe. Text never interpolates; document
/// keyframes hold until the next one.
pub struct TextDocument {
    /// Text content, `\r` separating lines.
    pub text: String,
    /// Font name, resolved through [`Composition::font`].
    pub font: String,
    /// Font size, document units.
    pub size: f32,
    /// Fill color.
    pub fill: Rgba,
    /// Stroke color, if stroked.
    pub stroke: Option<Rgba>,
    /// Stroke width.
    pub stroke_width: f32,
    /// Line height, document units.
    pub line_height: f32,
    /// Extra tracking, thousandths of em.
    pub tracking: f32,
    /// Paragraph justification.
    pub justify: Justify,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Text justification.
pub enum Justify {
    /// Left aligned.
    #[default]
    Left,
    /// Right aligned.
    Right,
    /// Centered.
    Center,
}

impl Justify {
    /// Map a document `j` index.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Self::Right,
            2 => Self::Center,
            _ => Self::Left,
        }
    }
}

impl crate::animation::value::Interpolate for TextDocument {
    // Documents step, never blend.
    fn interpolate(a: &Self, _b: &Self, _t: f32) -> Self {
        a.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
