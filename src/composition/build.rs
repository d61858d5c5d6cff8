//! Structural conversion of a raw document into the evaluated composition
//! model: every track bound against the root frame range, layer stacks and
//! assets resolved, matte pairs marked, document warnings collected.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::animation::color::GradientColor;
use crate::animation::keyframe::{Easing, Keyframe, bind_track};
use crate::composition::model::{
    Asset, BlendMode, Character, CharacterId, Composition, DashElement, DashKind, EffectModel,
    EllipseModel, FillModel, FillRule, Font, GradientFillModel, GradientKind, GradientStrokeModel,
    GroupModel, ImageAsset, Justify, LayerKind, LayerModel, LineCap, LineJoin, Marker, MaskMode,
    MaskModel, MatteType, MergeMode, MergeModel, PathModel, PolystarModel, PositionModel,
    PrecompAsset, RectangleModel, RepeaterComposite, RepeaterModel, RoundedCornersModel,
    ShapeModel, StarType, StrokeModel, TextDocument, Track, TransformModel, TrimMode, TrimModel,
};
use crate::content::shape_data::ShapeData;
use crate::document::property;
use crate::document::schema::{
    RawDashElement, RawDocument, RawEffect, RawGradientStops, RawLayer, RawMask, RawPosition,
    RawProperty, RawShape, RawTextData, RawTextDocument, RawTransform,
};
use crate::foundation::core::{Canvas, FrameRange, Point, Rgba, Vec2};
use crate::foundation::error::{AnimyteError, AnimyteResult};

impl Composition {
    /// Parse a JSON animation document.
    pub fn from_slice(bytes: &[u8]) -> AnimyteResult<Self> {
        let raw: RawDocument = serde_json::from_slice(bytes)
            .map_err(|err| AnimyteError::parse(format!("invalid animation document: {err}")))?;
        build(raw)
    }

    /// Parse a JSON animation document from a string.
    pub fn from_json(text: &str) -> AnimyteResult<Self> {
        Self::from_slice(text.as_bytes())
    }
}

pub(crate) fn build(raw: RawDocument) -> AnimyteResult<Composition> {
    let range = FrameRange::new(raw.ip, raw.op)?;
    let mut b = Builder {
        range,
        warnings: Vec::new(),
        fatal: None,
    };

    if raw.ddd != 0 {
        b.warn("3d compositions are not supported; layers are flattened to 2d");
    }

    let mut assets = HashMap::new();
    for asset in &raw.assets {
        if let Some(layers) = &asset.layers {
            let layers = b.layers(layers);
            assets.insert(asset.id.clone(), Asset::Precomp(PrecompAsset { layers }));
        } else if let Some(file) = &asset.p {
            assets.insert(
                asset.id.clone(),
                Asset::Image(ImageAsset {
                    width: asset.w.unwrap_or(0),
                    height: asset.h.unwrap_or(0),
                    file: file.clone(),
                    directory: asset.u.clone().unwrap_or_default(),
                }),
            );
        } else {
            b.warn(format!(
                "asset '{}' has neither layers nor image data; skipped",
                asset.id
            ));
        }
    }

    let layers = b.layers(&raw.layers);

    let markers = raw
        .markers
        .iter()
        .map(|m| Marker {
            name: m.cm.clone(),
            start_frame: m.tm,
            duration_frames: m.dr,
        })
        .collect();

    let fonts: HashMap<String, Font> = raw
        .fonts
        .iter()
        .flat_map(|list| &list.list)
        .map(|f| {
            (
                f.name.clone(),
                Font {
                    name: f.name.clone(),
                    family: f.family.clone(),
                    style: f.style.clone(),
                    ascent: f.ascent,
                },
            )
        })
        .collect();

    let mut characters = HashMap::new();
    for c in &raw.chars {
        let Some(ch) = c.ch.chars().next() else {
            continue;
        };
        let shapes = c
            .data
            .as_ref()
            .map(|d| b.shapes(&d.shapes))
            .unwrap_or_default();
        characters.insert(
            CharacterId {
                ch,
                family: c.family.clone(),
                style: c.style.clone(),
            },
            Character {
                ch,
                width: c.w,
                size: c.size,
                shapes,
            },
        );
    }

    if let Some(message) = b.fatal {
        return Err(AnimyteError::configuration(message));
    }

    // Parsers report issues as they hit them; keep the first of each.
    let mut seen = HashSet::new();
    b.warnings.retain(|w| seen.insert(w.clone()));

    debug!(
        layers = layers.len(),
        assets = assets.len(),
        markers = raw.markers.len(),
        warnings = b.warnings.len(),
        "built composition"
    );

    Ok(Composition {
        name: raw.nm,
        version: raw.v,
        canvas: Canvas::new(raw.w, raw.h),
        range,
        frame_rate: raw.fr,
        layers,
        assets,
        markers,
        fonts,
        characters,
        warnings: b.warnings,
    })
}

struct Builder {
    range: FrameRange,
    warnings: Vec<String>,
    fatal: Option<String>,
}

impl Builder {
    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Record a construction-aborting defect. The first one wins; `build`
    /// surfaces it as a configuration error instead of a composition.
    fn fail(&mut self, msg: impl Into<String>) {
        if self.fatal.is_none() {
            self.fatal = Some(msg.into());
        }
    }

    fn layers(&mut self, raws: &[RawLayer]) -> Vec<LayerModel> {
        let mut out: Vec<LayerModel> = Vec::with_capacity(raws.len());
        for raw in raws {
            let consumes_matte = raw.tt.is_some();
            if let Some(layer) = self.layer(raw) {
                // A matte consumer reads the layer directly above it, which
                // is its predecessor in document order.
                if consumes_matte && let Some(source) = out.last_mut() {
                    source.is_matte_source = true;
                }
                out.push(layer);
            }
        }
        out
    }

    fn layer(&mut self, raw: &RawLayer) -> Option<LayerModel> {
        let name = raw.nm.clone();
        let kind = match raw.ty {
            0 => {
                let Some(asset) = raw.ref_id.clone() else {
                    self.warn(format!(
                        "precomp layer '{}' has no asset reference; skipped",
                        name.as_deref().unwrap_or("?")
                    ));
                    return None;
                };
                LayerKind::Precomp {
                    asset,
                    size: Canvas::new(raw.w.unwrap_or(0), raw.h.unwrap_or(0)),
                    time_remap: raw.tm.as_ref().and_then(|p| self.scalar_track(p)),
                }
            }
            1 => LayerKind::Solid {
                color: match raw.sc.as_deref().map(parse_hex_color) {
                    Some(Some(color)) => color,
                    _ => {
                        self.warn(format!(
                            "solid layer '{}' has an unreadable color",
                            name.as_deref().unwrap_or("?")
                        ));
                        Rgba::TRANSPARENT
                    }
                },
                size: Canvas::new(raw.sw.unwrap_or(0), raw.sh.unwrap_or(0)),
            },
            2 => {
                let Some(asset) = raw.ref_id.clone() else {
                    self.warn(format!(
                        "image layer '{}' has no asset reference; skipped",
                        name.as_deref().unwrap_or("?")
                    ));
                    return None;
                };
                LayerKind::Image { asset }
            }
            3 => LayerKind::Null,
            4 => LayerKind::Shape {
                shapes: self.shapes(&raw.shapes),
            },
            5 => {
                let Some(documents) = raw.t.as_ref().and_then(|t| self.text_track(t)) else {
                    self.warn(format!(
                        "text layer '{}' has no documents; skipped",
                        name.as_deref().unwrap_or("?")
                    ));
                    return None;
                };
                LayerKind::Text { documents }
            }
            ty => {
                self.warn(format!("layer type {ty} is not supported; skipped"));
                return None;
            }
        };

        let matte = match raw.tt {
            None => None,
            Some(tt) => {
                let matte = MatteType::from_index(tt);
                if matte.is_none() {
                    self.warn(format!("unknown matte type {tt}; ignored"));
                }
                matte
            }
        };
        let blend_mode = BlendMode::from_index(raw.bm).unwrap_or_else(|| {
            self.warn(format!("unknown blend mode {}; treated as normal", raw.bm));
            BlendMode::Normal
        });
        // A zero stretch would stall the layer's local clock.
        let stretch = if raw.sr == 0.0 { 1.0 } else { raw.sr };

        Some(LayerModel {
            name,
            id: raw.ind,
            parent: raw.parent,
            kind,
            transform: self.transform(&raw.ks),
            auto_orient: raw.ao != 0,
            in_frame: raw.ip,
            out_frame: raw.op.unwrap_or(self.range.end),
            start_frame: raw.st,
            stretch,
            blend_mode,
            matte,
            is_matte_source: raw.td.unwrap_or(0) != 0,
            masks: raw.masks.iter().filter_map(|m| self.mask(m)).collect(),
            effects: raw.ef.iter().filter_map(|e| self.effect(e)).collect(),
            hidden: raw.hd,
        })
    }

    fn mask(&mut self, raw: &RawMask) -> Option<MaskModel> {
        let mode = match raw.mode.as_str() {
            "a" => MaskMode::Add,
            "s" => MaskMode::Subtract,
            "i" => MaskMode::Intersect,
            "n" => MaskMode::None,
            other => {
                self.warn(format!("unsupported mask mode '{other}'; treated as add"));
                MaskMode::Add
            }
        };
        let Some(path) = self.shape_track(&raw.pt) else {
            self.warn("mask without readable geometry; skipped");
            return None;
        };
        Some(MaskModel {
            mode,
            path,
            opacity: raw.o.as_ref().and_then(|p| self.scalar_track(p)),
            inverted: raw.inv,
        })
    }

    fn effect(&mut self, raw: &RawEffect) -> Option<EffectModel> {
        if raw.en == 0 {
            return None;
        }
        let name = raw.nm.as_deref().unwrap_or("?");
        match raw.ty {
            29 => {
                let Some(radius) = self.effect_scalar(raw, 0) else {
                    self.warn(format!("gaussian blur '{name}' has no blurriness; skipped"));
                    return None;
                };
                Some(EffectModel::GaussianBlur { radius })
            }
            25 => {
                let color = self.effect_color(raw, 0);
                let opacity = self.effect_scalar(raw, 1);
                let direction = self.effect_scalar(raw, 2);
                let distance = self.effect_scalar(raw, 3);
                let softness = self.effect_scalar(raw, 4);
                match (color, opacity, direction, distance, softness) {
                    (Some(color), Some(opacity), Some(direction), Some(distance), Some(softness)) => {
                        Some(EffectModel::DropShadow {
                            color,
                            opacity,
                            direction,
                            distance,
                            softness,
                        })
                    }
                    _ => {
                        self.warn(format!("drop shadow '{name}' is missing parameters; skipped"));
                        None
                    }
                }
            }
            ty => {
                self.warn(format!("effect '{name}' (type {ty}) is not supported; skipped"));
                None
            }
        }
    }

    fn effect_scalar(&mut self, raw: &RawEffect, index: usize) -> Option<Track<f32>> {
        let prop = raw.ef.get(index)?.v.as_ref()?;
        self.scalar_track(prop)
    }

    fn effect_color(&mut self, raw: &RawEffect, index: usize) -> Option<Track<Rgba>> {
        let prop = raw.ef.get(index)?.v.as_ref()?;
        self.color_track(prop)
    }

    fn text_track(&mut self, raw: &RawTextData) -> Option<Track<TextDocument>> {
        let mut keys: Vec<Keyframe<TextDocument>> = raw
            .d
            .k
            .iter()
            .map(|kf| Keyframe::new(text_document(&kf.s), None, kf.t, Easing::Hold))
            .collect();
        if keys.is_empty() {
            return None;
        }
        bind_track(&mut keys, self.range);
        Some(Arc::new(keys))
    }

    fn transform(&mut self, raw: &RawTransform) -> TransformModel {
        TransformModel {
            anchor: raw.a.as_ref().and_then(|p| self.point_track(p)),
            position: raw.p.as_ref().and_then(|p| self.position(p)),
            scale: raw.s.as_ref().and_then(|p| self.scale_track(p)),
            rotation: raw.r.as_ref().and_then(|p| self.scalar_track(p)),
            opacity: raw.o.as_ref().and_then(|p| self.scalar_track(p)),
            skew: raw.sk.as_ref().and_then(|p| self.scalar_track(p)),
            skew_angle: raw.sa.as_ref().and_then(|p| self.scalar_track(p)),
            start_opacity: raw.so.as_ref().and_then(|p| self.scalar_track(p)),
            end_opacity: raw.eo.as_ref().and_then(|p| self.scalar_track(p)),
        }
    }

    fn position(&mut self, raw: &RawPosition) -> Option<PositionModel> {
        match raw {
            RawPosition::Split { x, y, .. } => {
                let x = self.scalar_track(x)?;
                let y = self.scalar_track(y)?;
                Some(PositionModel::Split { x, y })
            }
            RawPosition::Value(prop) => self.point_track(prop).map(PositionModel::Unified),
        }
    }

    fn shapes(&mut self, raws: &[RawShape]) -> Vec<ShapeModel> {
        raws.iter().filter_map(|raw| self.shape(raw)).collect()
    }

    fn shape(&mut self, raw: &RawShape) -> Option<ShapeModel> {
        match raw {
            RawShape::Group { nm, it, hd } => {
                if *hd {
                    return None;
                }
                let mut transform = None;
                let mut items = Vec::with_capacity(it.len());
                for child in it {
                    if let RawShape::Transform(tr) = child {
                        transform = Some(self.transform(tr));
                    } else if let Some(item) = self.shape(child) {
                        items.push(item);
                    }
                }
                Some(ShapeModel::Group(GroupModel {
                    name: nm.clone(),
                    items,
                    transform,
                }))
            }
            // A transform item is only meaningful inside a group.
            RawShape::Transform(_) => None,
            RawShape::Rectangle { nm, p, s, r, d, hd } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Rectangle(RectangleModel {
                    name: nm.clone(),
                    position: self.point_track(p)?,
                    size: self.point_track(s)?,
                    radius: self.scalar_track(r)?,
                    reversed: *d == 3,
                }))
            }
            RawShape::Ellipse { nm, p, s, d, hd } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Ellipse(EllipseModel {
                    name: nm.clone(),
                    position: self.point_track(p)?,
                    size: self.point_track(s)?,
                    reversed: *d == 3,
                }))
            }
            RawShape::Polystar {
                nm,
                sy,
                pt,
                p,
                r,
                ir,
                is,
                or,
                os,
                hd,
            } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Polystar(PolystarModel {
                    name: nm.clone(),
                    star_type: if *sy == 2 {
                        StarType::Polygon
                    } else {
                        StarType::Star
                    },
                    points: self.scalar_track(pt)?,
                    position: self.point_track(p)?,
                    rotation: self.scalar_track(r)?,
                    inner_radius: ir.as_ref().and_then(|p| self.scalar_track(p)),
                    inner_roundness: is.as_ref().and_then(|p| self.scalar_track(p)),
                    outer_radius: self.scalar_track(or)?,
                    outer_roundness: os.as_ref().and_then(|p| self.scalar_track(p)),
                }))
            }
            RawShape::Path { nm, ks, hd } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Path(PathModel {
                    name: nm.clone(),
                    shape: self.shape_track(ks)?,
                }))
            }
            RawShape::Fill { nm, c, o, r, hd } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Fill(FillModel {
                    name: nm.clone(),
                    color: self.color_track(c)?,
                    opacity: o.as_ref().and_then(|p| self.scalar_track(p)),
                    rule: fill_rule(*r),
                }))
            }
            RawShape::Stroke {
                nm,
                c,
                o,
                w,
                lc,
                lj,
                ml,
                d,
                hd,
            } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Stroke(StrokeModel {
                    name: nm.clone(),
                    color: self.color_track(c)?,
                    opacity: o.as_ref().and_then(|p| self.scalar_track(p)),
                    width: self.scalar_track(w)?,
                    cap: LineCap::from_index(*lc),
                    join: LineJoin::from_index(*lj),
                    miter_limit: *ml,
                    dashes: self.dashes(d),
                }))
            }
            RawShape::GradientFill {
                nm,
                g,
                s,
                e,
                t,
                h,
                a,
                o,
                r,
                hd,
            } => {
                if *hd {
                    return None;
                }
                self.gradient(nm, g, s, e, *t, h, a, o, fill_rule(*r))
                    .map(ShapeModel::GradientFill)
            }
            RawShape::GradientStroke {
                nm,
                g,
                s,
                e,
                t,
                h,
                a,
                o,
                w,
                lc,
                lj,
                ml,
                d,
                hd,
            } => {
                if *hd {
                    return None;
                }
                let gradient = self.gradient(nm, g, s, e, *t, h, a, o, FillRule::NonZero)?;
                Some(ShapeModel::GradientStroke(GradientStrokeModel {
                    gradient,
                    width: self.scalar_track(w)?,
                    cap: LineCap::from_index(*lc),
                    join: LineJoin::from_index(*lj),
                    miter_limit: *ml,
                    dashes: self.dashes(d),
                }))
            }
            RawShape::Trim { nm, s, e, o, m, hd } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Trim(TrimModel {
                    name: nm.clone(),
                    start: self.scalar_track(s)?,
                    end: self.scalar_track(e)?,
                    offset: self.scalar_track(o)?,
                    mode: if *m == 2 {
                        TrimMode::Individual
                    } else {
                        TrimMode::Simultaneous
                    },
                }))
            }
            RawShape::RoundedCorners { nm, r, hd } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::RoundedCorners(RoundedCornersModel {
                    name: nm.clone(),
                    radius: self.scalar_track(r)?,
                }))
            }
            RawShape::Repeater {
                nm,
                c,
                o,
                m,
                tr,
                hd,
            } => {
                if *hd {
                    return None;
                }
                Some(ShapeModel::Repeater(RepeaterModel {
                    name: nm.clone(),
                    copies: self.scalar_track(c)?,
                    offset: o.as_ref().and_then(|p| self.scalar_track(p)),
                    composite: if *m == 2 {
                        RepeaterComposite::Below
                    } else {
                        RepeaterComposite::Above
                    },
                    transform: self.transform(tr),
                }))
            }
            RawShape::Merge { nm, mm, hd } => {
                if *hd {
                    return None;
                }
                let mode = MergeMode::from_index(*mm).unwrap_or_else(|| {
                    self.warn(format!("unknown merge mode {mm}; treated as merge"));
                    MergeMode::Merge
                });
                Some(ShapeModel::Merge(MergeModel {
                    name: nm.clone(),
                    mode,
                }))
            }
            RawShape::Unknown => {
                self.warn("unknown shape item type; skipped");
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn gradient(
        &mut self,
        nm: &Option<String>,
        g: &RawGradientStops,
        s: &RawProperty,
        e: &RawProperty,
        t: u32,
        h: &Option<RawProperty>,
        a: &Option<RawProperty>,
        o: &Option<RawProperty>,
        rule: FillRule,
    ) -> Option<GradientFillModel> {
        Some(GradientFillModel {
            name: nm.clone(),
            kind: if t == 2 {
                GradientKind::Radial
            } else {
                GradientKind::Linear
            },
            stops: self.gradient_track(g)?,
            start: self.point_track(s)?,
            end: self.point_track(e)?,
            highlight_length: h.as_ref().and_then(|p| self.scalar_track(p)),
            highlight_angle: a.as_ref().and_then(|p| self.scalar_track(p)),
            opacity: o.as_ref().and_then(|p| self.scalar_track(p)),
            rule,
        })
    }

    fn dashes(&mut self, raws: &[RawDashElement]) -> Vec<DashElement> {
        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
            let kind = match raw.n.as_str() {
                "d" => DashKind::Dash,
                "g" => DashKind::Gap,
                "o" => DashKind::Offset,
                other => {
                    self.warn(format!("unknown dash element '{other}'; skipped"));
                    continue;
                }
            };
            if let Some(value) = self.scalar_track(&raw.v) {
                out.push(DashElement { kind, value });
            }
        }
        out
    }

    fn scalar_track(&mut self, prop: &RawProperty) -> Option<Track<f32>> {
        let keys = property::parse_scalar(prop, &mut self.warnings);
        self.bind(keys)
    }

    fn point_track(&mut self, prop: &RawProperty) -> Option<Track<Point>> {
        let keys = property::parse_point(prop, &mut self.warnings);
        self.bind(keys)
    }

    fn scale_track(&mut self, prop: &RawProperty) -> Option<Track<Vec2>> {
        let keys = property::parse_scale(prop, &mut self.warnings);
        self.bind(keys)
    }

    fn color_track(&mut self, prop: &RawProperty) -> Option<Track<Rgba>> {
        let keys = property::parse_color(prop, &mut self.warnings);
        self.bind(keys)
    }

    fn gradient_track(&mut self, stops: &RawGradientStops) -> Option<Track<GradientColor>> {
        let keys = property::parse_gradient(stops, &mut self.warnings);
        self.bind(keys)
    }

    fn shape_track(&mut self, prop: &RawProperty) -> Option<Track<ShapeData>> {
        let keys = property::parse_shape(prop, &mut self.warnings);
        // Shape keyframes blend per vertex, so every value in the track
        // (including end values) must agree on vertex count.
        let mut counts = keys
            .iter()
            .flat_map(|k| {
                std::iter::once(k.start_value.vertex_count())
                    .chain(k.end_value.as_ref().map(ShapeData::vertex_count))
            });
        if let Some(first) = counts.next()
            && let Some(other) = counts.find(|c| *c != first)
        {
            self.fail(format!(
                "shape keyframes disagree on vertex count ({first} vs {other})"
            ));
            return None;
        }
        self.bind(keys)
    }

    fn bind<T>(&mut self, mut keys: Vec<Keyframe<T>>) -> Option<Track<T>> {
        if keys.is_empty() {
            return None;
        }
        bind_track(&mut keys, self.range);
        Some(Arc::new(keys))
    }
}

fn fill_rule(index: u32) -> FillRule {
    if index == 2 {
        FillRule::EvenOdd
    } else {
        FillRule::NonZero
    }
}

fn text_document(raw: &RawTextDocument) -> TextDocument {
    TextDocument {
        text: raw.t.clone(),
        font: raw.f.clone(),
        size: raw.s,
        fill: color_from_components(&raw.fc).unwrap_or(Rgba::opaque(0.0, 0.0, 0.0)),
        stroke: color_from_components(&raw.sc),
        stroke_width: raw.sw,
        line_height: raw.lh,
        tracking: raw.tr,
        justify: Justify::from_index(raw.j),
    }
}

fn color_from_components(components: &[f32]) -> Option<Rgba> {
    if components.len() < 3 {
        return None;
    }
    Some(Rgba::new(
        components[0],
        components[1],
        components[2],
        components.get(3).copied().unwrap_or(1.0),
    ))
}

/// Parse `#rrggbb` or `#aarrggbb` solid colors.
fn parse_hex_color(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#')?;
    let value = u32::from_str_radix(digits, 16).ok()?;
    let channel = |shift: u32| ((value >> shift) & 0xff) as f32 / 255.0;
    match digits.len() {
        6 => Some(Rgba::opaque(channel(16), channel(8), channel(0))),
        8 => Some(Rgba::new(channel(16), channel(8), channel(0), channel(24))),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/build.rs"]
mod tests;
