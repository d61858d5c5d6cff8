//! Raw document schema: serde mirror of the JSON animation format.
//!
//! Types here stay as close to the wire as practical (short field names,
//! permissive defaults, `serde_json::Value` where the format is polymorphic).
//! Interpretation into typed keyframe tracks happens in
//! [`crate::document::property`]; structural conversion into the evaluated
//! model happens in [`crate::composition::build`]. Unknown fields and unknown
//! item types are skipped, never fatal.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Top-level animation document.
pub struct RawDocument {
    /// Format version string, e.g. `"5.7.4"`.
    #[serde(default)]
    pub v: Option<String>,
    /// Document name.
    #[serde(default)]
    pub nm: Option<String>,
    /// First frame.
    pub ip: f32,
    /// Last frame (exclusive for layer visibility).
    pub op: f32,
    /// Frame rate, frames per second.
    pub fr: f32,
    /// Canvas width in document units.
    pub w: u32,
    /// Canvas height in document units.
    pub h: u32,
    /// 3D flag; unsupported content, carried for diagnostics only.
    #[serde(default)]
    pub ddd: u8,
    /// Layer stack, topmost first.
    #[serde(default)]
    pub layers: Vec<RawLayer>,
    /// Precomp and image assets.
    #[serde(default)]
    pub assets: Vec<RawAsset>,
    /// Named timeline markers.
    #[serde(default)]
    pub markers: Vec<RawMarker>,
    /// Font declarations for text layers.
    #[serde(default)]
    pub fonts: Option<RawFontList>,
    /// Embedded glyph geometry for document-supplied fonts.
    #[serde(default)]
    pub chars: Vec<RawCharacter>,
}

#[derive(Clone, Debug, Deserialize)]
/// One layer entry in a document or precomp asset.
pub struct RawLayer {
    /// Layer type: 0 precomp, 1 solid, 2 image, 3 null, 4 shape, 5 text.
    pub ty: u32,
    /// Layer name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Stacking-unique id referenced by `parent`.
    #[serde(default)]
    pub ind: Option<u32>,
    /// Parent layer id for transform inheritance.
    #[serde(default)]
    pub parent: Option<u32>,
    /// Asset reference (precomp or image id).
    #[serde(default, rename = "refId")]
    pub ref_id: Option<String>,
    /// Layer transform.
    #[serde(default)]
    pub ks: RawTransform,
    /// Auto-orient flag (0/1): derive rotation from position travel.
    #[serde(default)]
    pub ao: u8,
    /// Shape items (shape layers only).
    #[serde(default)]
    pub shapes: Vec<RawShape>,
    /// In point, frames.
    #[serde(default)]
    pub ip: f32,
    /// Out point, frames. Absent means the layer runs to the composition end.
    #[serde(default)]
    pub op: Option<f32>,
    /// Start time offset, frames.
    #[serde(default)]
    pub st: f32,
    /// Time stretch factor.
    #[serde(default = "default_one")]
    pub sr: f32,
    /// Blend mode index.
    #[serde(default)]
    pub bm: u32,
    /// Matte consumer type: 1 alpha, 2 alpha-inverted, 3 luma, 4 luma-inverted.
    #[serde(default)]
    pub tt: Option<u32>,
    /// Matte source flag on the layer above the consumer.
    #[serde(default)]
    pub td: Option<u32>,
    /// Masks intersected with the layer's own content.
    #[serde(default, rename = "masksProperties")]
    pub masks: Vec<RawMask>,
    /// Precomp reference width.
    #[serde(default)]
    pub w: Option<u32>,
    /// Precomp reference height.
    #[serde(default)]
    pub h: Option<u32>,
    /// Solid width.
    #[serde(default)]
    pub sw: Option<u32>,
    /// Solid height.
    #[serde(default)]
    pub sh: Option<u32>,
    /// Solid color, `#rrggbb`.
    #[serde(default)]
    pub sc: Option<String>,
    /// Text payload (text layers only).
    #[serde(default)]
    pub t: Option<RawTextData>,
    /// Time remap property (precomp layers only).
    #[serde(default)]
    pub tm: Option<RawProperty>,
    /// Effect stack.
    #[serde(default)]
    pub ef: Vec<RawEffect>,
    /// Hidden flag; hidden layers parse but never draw.
    #[serde(default)]
    pub hd: bool,
}

fn default_one() -> f32 {
    1.0
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Transform group (`ks` on layers, `tr` on shape groups).
pub struct RawTransform {
    /// Anchor point.
    #[serde(default)]
    pub a: Option<RawProperty>,
    /// Position, unified or split per axis.
    #[serde(default)]
    pub p: Option<RawPosition>,
    /// Scale, percent.
    #[serde(default)]
    pub s: Option<RawProperty>,
    /// Rotation, degrees.
    #[serde(default)]
    pub r: Option<RawProperty>,
    /// Opacity, percent.
    #[serde(default)]
    pub o: Option<RawProperty>,
    /// Skew, degrees.
    #[serde(default)]
    pub sk: Option<RawProperty>,
    /// Skew axis, degrees.
    #[serde(default)]
    pub sa: Option<RawProperty>,
    /// Repeater only: opacity percent of the first copy.
    #[serde(default)]
    pub so: Option<RawProperty>,
    /// Repeater only: opacity percent of the last copy.
    #[serde(default)]
    pub eo: Option<RawProperty>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
/// Position property: one 2D track, or split x/y tracks.
pub enum RawPosition {
    /// Split-dimension form `{"s": true, "x": {...}, "y": {...}}`.
    Split {
        /// Split marker, always true in this form.
        s: bool,
        /// X axis track.
        x: RawProperty,
        /// Y axis track.
        y: RawProperty,
    },
    /// Ordinary animatable value.
    Value(RawProperty),
}

#[derive(Clone, Debug, Default, Deserialize)]
/// One animatable property: `{"a": 0|1, "k": <value or keyframes>}`.
///
/// `k` is polymorphic (scalar, component array, or keyframe object list) and
/// is interpreted by [`crate::document::property`].
pub struct RawProperty {
    /// Animated flag. Some exporters omit it; the shape of `k` decides.
    #[serde(default)]
    pub a: Option<u8>,
    /// Static value or keyframe list.
    #[serde(default)]
    pub k: serde_json::Value,
    /// Property index (authoring metadata, unused here).
    #[serde(default)]
    pub ix: Option<u32>,
    /// Expression source. Expressions are not evaluated; presence is
    /// surfaced as a document warning.
    #[serde(default)]
    pub x: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// One raw keyframe object inside an animated property's `k` array.
pub struct RawKeyframe {
    /// Start frame of the keyframe window.
    pub t: f32,
    /// Start value. Missing on legacy terminator entries.
    #[serde(default)]
    pub s: Option<serde_json::Value>,
    /// End value (legacy exports; newer files rely on the next `s`).
    #[serde(default)]
    pub e: Option<serde_json::Value>,
    /// Incoming easing control handle.
    #[serde(default)]
    pub i: Option<RawEasingHandle>,
    /// Outgoing easing control handle.
    #[serde(default)]
    pub o: Option<RawEasingHandle>,
    /// Hold flag: 1 freezes the start value for the whole window.
    #[serde(default)]
    pub h: Option<u8>,
    /// Spatial out-tangent, relative to the start value.
    #[serde(default)]
    pub to: Option<Vec<f32>>,
    /// Spatial in-tangent, relative to the end value.
    #[serde(default)]
    pub ti: Option<Vec<f32>>,
}

#[derive(Clone, Debug, Deserialize)]
/// Easing handle: scalar per keyframe, or one entry per value dimension.
pub struct RawEasingHandle {
    /// Handle x (time axis), `0..=1`.
    pub x: FloatOrFloats,
    /// Handle y (value axis).
    pub y: FloatOrFloats,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
/// Scalar-or-array float, as exporters emit both.
pub enum FloatOrFloats {
    /// Single shared value.
    Float(f32),
    /// Per-dimension values.
    Floats(Vec<f32>),
}

impl FloatOrFloats {
    /// Value for dimension `dim`, falling back across shorter arrays.
    pub fn dim(&self, dim: usize) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Floats(vs) => vs.get(dim).or_else(|| vs.first()).copied(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "ty")]
/// One shape item, discriminated by the `ty` string.
pub enum RawShape {
    /// Group of nested items with its own transform item.
    #[serde(rename = "gr")]
    Group {
        /// Group name.
        #[serde(default)]
        nm: Option<String>,
        /// Nested items, including one trailing `tr` transform.
        #[serde(default)]
        it: Vec<RawShape>,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Group transform item (trailing entry of a group's `it` list).
    #[serde(rename = "tr")]
    Transform(RawTransform),
    /// Parametric rectangle.
    #[serde(rename = "rc")]
    Rectangle {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Center position.
        p: RawProperty,
        /// Size, width and height.
        s: RawProperty,
        /// Corner radius.
        r: RawProperty,
        /// Draw direction (3 = reversed).
        #[serde(default)]
        d: u32,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Parametric ellipse.
    #[serde(rename = "el")]
    Ellipse {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Center position.
        p: RawProperty,
        /// Size, width and height.
        s: RawProperty,
        /// Draw direction (3 = reversed).
        #[serde(default)]
        d: u32,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Parametric star or polygon.
    #[serde(rename = "sr")]
    Polystar {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// 1 star, 2 polygon.
        #[serde(default = "default_star_type")]
        sy: u32,
        /// Point count.
        pt: RawProperty,
        /// Center position.
        p: RawProperty,
        /// Rotation, degrees.
        r: RawProperty,
        /// Inner radius (stars only).
        #[serde(default)]
        ir: Option<RawProperty>,
        /// Inner roundness percent (stars only).
        #[serde(default)]
        is: Option<RawProperty>,
        /// Outer radius.
        or: RawProperty,
        /// Outer roundness percent.
        #[serde(default)]
        os: Option<RawProperty>,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Freeform bezier path.
    #[serde(rename = "sh")]
    Path {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Keyframed path geometry.
        ks: RawProperty,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Solid fill.
    #[serde(rename = "fl")]
    Fill {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Fill color.
        c: RawProperty,
        /// Opacity percent.
        #[serde(default)]
        o: Option<RawProperty>,
        /// Fill rule: 1 nonzero, 2 evenodd.
        #[serde(default)]
        r: u32,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Solid stroke.
    #[serde(rename = "st")]
    Stroke {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Stroke color.
        c: RawProperty,
        /// Opacity percent.
        #[serde(default)]
        o: Option<RawProperty>,
        /// Stroke width.
        w: RawProperty,
        /// Line cap: 1 butt, 2 round, 3 square.
        #[serde(default)]
        lc: u32,
        /// Line join: 1 miter, 2 round, 3 bevel.
        #[serde(default)]
        lj: u32,
        /// Miter limit.
        #[serde(default)]
        ml: f32,
        /// Dash pattern entries.
        #[serde(default)]
        d: Vec<RawDashElement>,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Gradient fill.
    #[serde(rename = "gf")]
    GradientFill {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Stop data.
        g: RawGradientStops,
        /// Gradient start point.
        s: RawProperty,
        /// Gradient end point.
        e: RawProperty,
        /// 1 linear, 2 radial.
        t: u32,
        /// Radial highlight length percent.
        #[serde(default)]
        h: Option<RawProperty>,
        /// Radial highlight angle, degrees.
        #[serde(default)]
        a: Option<RawProperty>,
        /// Opacity percent.
        #[serde(default)]
        o: Option<RawProperty>,
        /// Fill rule: 1 nonzero, 2 evenodd.
        #[serde(default)]
        r: u32,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Gradient stroke.
    #[serde(rename = "gs")]
    GradientStroke {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Stop data.
        g: RawGradientStops,
        /// Gradient start point.
        s: RawProperty,
        /// Gradient end point.
        e: RawProperty,
        /// 1 linear, 2 radial.
        t: u32,
        /// Radial highlight length percent.
        #[serde(default)]
        h: Option<RawProperty>,
        /// Radial highlight angle, degrees.
        #[serde(default)]
        a: Option<RawProperty>,
        /// Opacity percent.
        #[serde(default)]
        o: Option<RawProperty>,
        /// Stroke width.
        w: RawProperty,
        /// Line cap: 1 butt, 2 round, 3 square.
        #[serde(default)]
        lc: u32,
        /// Line join: 1 miter, 2 round, 3 bevel.
        #[serde(default)]
        lj: u32,
        /// Miter limit.
        #[serde(default)]
        ml: f32,
        /// Dash pattern entries.
        #[serde(default)]
        d: Vec<RawDashElement>,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Trim paths modifier.
    #[serde(rename = "tm")]
    Trim {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Segment start percent.
        s: RawProperty,
        /// Segment end percent.
        e: RawProperty,
        /// Segment rotation offset, degrees.
        o: RawProperty,
        /// 1 applies to paths simultaneously, 2 individually.
        #[serde(default = "default_trim_mode")]
        m: u32,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Rounded corners modifier.
    #[serde(rename = "rd")]
    RoundedCorners {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Corner radius.
        r: RawProperty,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Repeater modifier.
    #[serde(rename = "rp")]
    Repeater {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Copy count.
        c: RawProperty,
        /// Copy index offset.
        #[serde(default)]
        o: Option<RawProperty>,
        /// Composite order: 1 above, 2 below.
        #[serde(default = "default_trim_mode")]
        m: u32,
        /// Per-copy transform, including start/end opacity.
        tr: RawTransform,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Merge paths operator.
    #[serde(rename = "mm")]
    Merge {
        /// Shape name.
        #[serde(default)]
        nm: Option<String>,
        /// Merge mode: 1 merge, 2 add, 3 subtract, 4 intersect, 5 exclude.
        #[serde(default = "default_star_type")]
        mm: u32,
        /// Hidden flag.
        #[serde(default)]
        hd: bool,
    },
    /// Unrecognized item type, skipped with a warning.
    #[serde(other)]
    Unknown,
}

fn default_star_type() -> u32 {
    1
}

fn default_trim_mode() -> u32 {
    1
}

#[derive(Clone, Debug, Deserialize)]
/// Gradient stop payload: flattened stop array plus declared stop count.
pub struct RawGradientStops {
    /// Number of color stops. The `k` array holds `4 * p` color components
    /// (offset, r, g, b per stop) optionally followed by opacity stop pairs.
    pub p: usize,
    /// Animatable flattened stop array.
    pub k: RawProperty,
}

#[derive(Clone, Debug, Deserialize)]
/// One dash pattern entry on a stroke.
pub struct RawDashElement {
    /// Entry kind: `"d"` dash, `"g"` gap, `"o"` offset.
    pub n: String,
    /// Entry length (or offset distance).
    pub v: RawProperty,
}

#[derive(Clone, Debug, Deserialize)]
/// One mask on a layer.
pub struct RawMask {
    /// Mode: `"a"` add, `"s"` subtract, `"i"` intersect, `"n"` none.
    #[serde(default = "default_mask_mode")]
    pub mode: String,
    /// Mask path geometry.
    pub pt: RawProperty,
    /// Mask opacity percent.
    #[serde(default)]
    pub o: Option<RawProperty>,
    /// Inverted flag.
    #[serde(default)]
    pub inv: bool,
}

fn default_mask_mode() -> String {
    "a".to_owned()
}

#[derive(Clone, Debug, Deserialize)]
/// One asset: precomp layer list or image reference.
pub struct RawAsset {
    /// Asset id referenced by layers.
    pub id: String,
    /// Precomp layer stack, when this asset is a precomp.
    #[serde(default)]
    pub layers: Option<Vec<RawLayer>>,
    /// Image width.
    #[serde(default)]
    pub w: Option<u32>,
    /// Image height.
    #[serde(default)]
    pub h: Option<u32>,
    /// Image file name.
    #[serde(default)]
    pub p: Option<String>,
    /// Image directory.
    #[serde(default)]
    pub u: Option<String>,
    /// Embedded flag: 1 when `p` is a data URI.
    #[serde(default)]
    pub e: Option<u8>,
}

#[derive(Clone, Debug, Deserialize)]
/// Named timeline marker.
pub struct RawMarker {
    /// Marker name.
    #[serde(default)]
    pub cm: String,
    /// Start frame.
    #[serde(default)]
    pub tm: f32,
    /// Duration in frames.
    #[serde(default)]
    pub dr: f32,
}

#[derive(Clone, Debug, Deserialize)]
/// Font declarations.
pub struct RawFontList {
    /// Declared fonts.
    #[serde(default)]
    pub list: Vec<RawFont>,
}

#[derive(Clone, Debug, Deserialize)]
/// One font declaration.
pub struct RawFont {
    /// Unique font name referenced by text documents.
    #[serde(rename = "fName")]
    pub name: String,
    /// Font family.
    #[serde(default, rename = "fFamily")]
    pub family: String,
    /// Style string, e.g. `"Bold"`.
    #[serde(default, rename = "fStyle")]
    pub style: String,
    /// Ascent in percent of em size.
    #[serde(default)]
    pub ascent: f32,
}

#[derive(Clone, Debug, Deserialize)]
/// Embedded glyph geometry for one character.
pub struct RawCharacter {
    /// The character.
    pub ch: String,
    /// Owning font family.
    #[serde(default, rename = "fFamily")]
    pub family: String,
    /// Owning style string.
    #[serde(default)]
    pub style: String,
    /// Advance width at `size`, document units.
    #[serde(default)]
    pub w: f32,
    /// Em size the geometry is authored at.
    #[serde(default)]
    pub size: f32,
    /// Glyph outline shapes.
    #[serde(default)]
    pub data: Option<RawCharacterData>,
}

#[derive(Clone, Debug, Deserialize)]
/// Container for glyph outline shapes.
pub struct RawCharacterData {
    /// Outline shape items.
    #[serde(default)]
    pub shapes: Vec<RawShape>,
}

#[derive(Clone, Debug, Deserialize)]
/// Text payload on a text layer.
pub struct RawTextData {
    /// Keyframed text document.
    pub d: RawTextDocumentTrack,
}

#[derive(Clone, Debug, Deserialize)]
/// Keyframe list of text documents (text changes are hold-stepped).
pub struct RawTextDocumentTrack {
    /// Document keyframes.
    #[serde(default)]
    pub k: Vec<RawTextDocumentKeyframe>,
}

#[derive(Clone, Debug, Deserialize)]
/// One text document keyframe.
pub struct RawTextDocumentKeyframe {
    /// Start frame.
    #[serde(default)]
    pub t: f32,
    /// Document value.
    pub s: RawTextDocument,
}

#[derive(Clone, Debug, Deserialize)]
/// Styled text content at one keyframe.
pub struct RawTextDocument {
    /// Text, with `\r` as the line separator.
    #[serde(default)]
    pub t: String,
    /// Font name, matching a [`RawFont::name`].
    #[serde(default)]
    pub f: String,
    /// Font size, document units.
    #[serde(default)]
    pub s: f32,
    /// Fill color components, `0..=1`.
    #[serde(default)]
    pub fc: Vec<f32>,
    /// Stroke color components, `0..=1`.
    #[serde(default)]
    pub sc: Vec<f32>,
    /// Stroke width.
    #[serde(default)]
    pub sw: f32,
    /// Line height, document units.
    #[serde(default)]
    pub lh: f32,
    /// Extra tracking, thousandths of em.
    #[serde(default)]
    pub tr: f32,
    /// Justification: 0 left, 1 right, 2 center.
    #[serde(default)]
    pub j: u32,
}

#[derive(Clone, Debug, Deserialize)]
/// One effect on a layer.
pub struct RawEffect {
    /// Effect type: 25 drop shadow, 29 gaussian blur.
    pub ty: u32,
    /// Effect name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Enabled flag.
    #[serde(default = "default_enabled")]
    pub en: u8,
    /// Effect parameters, positional per effect type.
    #[serde(default)]
    pub ef: Vec<RawEffectValue>,
}

fn default_enabled() -> u8 {
    1
}

#[derive(Clone, Debug, Deserialize)]
/// One positional effect parameter.
pub struct RawEffectValue {
    /// Parameter name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Parameter value.
    #[serde(default)]
    pub v: Option<RawProperty>,
}

#[cfg(test)]
#[path = "../../tests/unit/document/schema.rs"]
mod tests;
