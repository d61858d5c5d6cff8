//! Interpretation of raw `{a, k}` animatable properties into typed keyframe
//! tracks.
//!
//! The wire format is polymorphic: `k` holds either a static value or a list
//! of keyframe objects, values are scalars or component arrays, legacy
//! exports carry explicit end values and a bare `{t}` terminator entry, and
//! easing handles may be per-dimension. Everything unreadable degrades to a
//! warning, never an error.

use kurbo::{CubicBez, Point, Vec2};
use serde_json::Value;

use crate::animation::bezier::CubicEase;
use crate::animation::color::GradientColor;
use crate::animation::keyframe::{Easing, Keyframe};
use crate::content::shape_data::ShapeData;
use crate::document::schema::{
    FloatOrFloats, RawEasingHandle, RawGradientStops, RawKeyframe, RawProperty,
};
use crate::foundation::core::Rgba;

/// Parse a scalar property (opacity, rotation, width, trim percents).
pub(crate) fn parse_scalar(prop: &RawProperty, warnings: &mut Vec<String>) -> Vec<Keyframe<f32>> {
    parse_property(prop, 1, read_f32, no_attach, warnings)
}

/// Parse a 2D point property, honoring spatial travel tangents.
pub(crate) fn parse_point(prop: &RawProperty, warnings: &mut Vec<String>) -> Vec<Keyframe<Point>> {
    parse_property(prop, 2, read_point, attach_spatial, warnings)
}

/// Parse a scale property; the document's percent components become factors.
pub(crate) fn parse_scale(prop: &RawProperty, warnings: &mut Vec<String>) -> Vec<Keyframe<Vec2>> {
    parse_property(prop, 2, read_scale, no_attach, warnings)
}

/// Parse a color property.
pub(crate) fn parse_color(prop: &RawProperty, warnings: &mut Vec<String>) -> Vec<Keyframe<Rgba>> {
    parse_property(prop, 1, read_color, no_attach, warnings)
}

/// Parse a gradient ramp property with its declared stop count.
pub(crate) fn parse_gradient(
    stops: &RawGradientStops,
    warnings: &mut Vec<String>,
) -> Vec<Keyframe<GradientColor>> {
    let count = stops.p;
    parse_property(
        &stops.k,
        1,
        |v| read_gradient(v, count),
        no_attach,
        warnings,
    )
}

/// Parse a freeform shape property.
pub(crate) fn parse_shape(
    prop: &RawProperty,
    warnings: &mut Vec<String>,
) -> Vec<Keyframe<ShapeData>> {
    parse_property(prop, 1, read_shape, no_attach, warnings)
}

fn no_attach<T>(_raw: &RawKeyframe, _start: &T, _end: &T, _kf: &mut Keyframe<T>) {}

fn parse_property<T, R, A>(
    prop: &RawProperty,
    dims: usize,
    read: R,
    attach: A,
    warnings: &mut Vec<String>,
) -> Vec<Keyframe<T>>
where
    T: Clone,
    R: Fn(&Value) -> Option<T>,
    A: Fn(&RawKeyframe, &T, &T, &mut Keyframe<T>),
{
    if prop.x.is_some() {
        warnings.push("expressions are not evaluated; falling back to keyframes".to_owned());
    }
    if !is_keyframed(&prop.k) {
        return match read(&prop.k) {
            Some(value) => vec![Keyframe::constant(value)],
            None => {
                warnings.push("property has an unreadable static value".to_owned());
                Vec::new()
            }
        };
    }

    let raws: Vec<RawKeyframe> = match serde_json::from_value(prop.k.clone()) {
        Ok(raws) => raws,
        Err(err) => {
            warnings.push(format!("malformed keyframe list: {err}"));
            return Vec::new();
        }
    };

    let mut keys = Vec::with_capacity(raws.len());
    // End value of the previous window, consumed by entries without their
    // own start (the legacy terminator form).
    let mut carried: Option<T> = None;
    for (idx, raw) in raws.iter().enumerate() {
        let start = raw
            .s
            .as_ref()
            .and_then(|v| read(v))
            .or_else(|| carried.clone());
        let Some(start) = start else {
            warnings.push(format!("keyframe {idx} has no readable value; skipped"));
            continue;
        };
        let is_last = idx + 1 == raws.len();
        let end = if is_last {
            None
        } else {
            raw.e.as_ref().and_then(|v| read(v)).or_else(|| {
                raws[idx + 1].s.as_ref().and_then(|v| read(v))
            })
        };

        let easing = if raw.h == Some(1) {
            Easing::Hold
        } else {
            build_easing(raw.o.as_ref(), raw.i.as_ref(), dims)
        };

        let mut kf = Keyframe::new(start.clone(), end.clone(), raw.t, easing);
        if let Some(end) = &end {
            attach(raw, &start, end, &mut kf);
        }
        carried = Some(end.unwrap_or(start));
        keys.push(kf);
    }
    keys
}

/// Whether `k` is a keyframe object list rather than a static value.
fn is_keyframed(k: &Value) -> bool {
    match k {
        Value::Array(items) => matches!(
            items.first(),
            Some(Value::Object(obj)) if obj.contains_key("t")
        ),
        _ => false,
    }
}

fn build_easing(o: Option<&RawEasingHandle>, i: Option<&RawEasingHandle>, dims: usize) -> Easing {
    let (Some(o), Some(i)) = (o, i) else {
        return Easing::Linear;
    };
    if dims >= 2 && is_split(o, i) {
        Easing::Split {
            x: ease_for_dim(o, i, 0),
            y: ease_for_dim(o, i, 1),
        }
    } else {
        Easing::Bezier(ease_for_dim(o, i, 0))
    }
}

fn is_split(o: &RawEasingHandle, i: &RawEasingHandle) -> bool {
    per_dim_differs(&o.x) || per_dim_differs(&o.y) || per_dim_differs(&i.x) || per_dim_differs(&i.y)
}

fn per_dim_differs(f: &FloatOrFloats) -> bool {
    matches!(f, FloatOrFloats::Floats(vs) if vs.len() > 1 && vs.windows(2).any(|w| w[0] != w[1]))
}

fn ease_for_dim(o: &RawEasingHandle, i: &RawEasingHandle, dim: usize) -> CubicEase {
    // Missing handle components default onto the diagonal (linear).
    CubicEase::new(
        o.x.dim(dim).unwrap_or(1.0 / 3.0),
        o.y.dim(dim).unwrap_or(1.0 / 3.0),
        i.x.dim(dim).unwrap_or(2.0 / 3.0),
        i.y.dim(dim).unwrap_or(2.0 / 3.0),
    )
}

fn attach_spatial(raw: &RawKeyframe, start: &Point, end: &Point, kf: &mut Keyframe<Point>) {
    let (Some(to), Some(ti)) = (&raw.to, &raw.ti) else {
        return;
    };
    if to.len() < 2 || ti.len() < 2 {
        return;
    }
    let out_tangent = Vec2::new(f64::from(to[0]), f64::from(to[1]));
    let in_tangent = Vec2::new(f64::from(ti[0]), f64::from(ti[1]));
    // Zero tangents author straight travel; componentwise lerp already is one.
    if out_tangent.hypot2() == 0.0 && in_tangent.hypot2() == 0.0 {
        return;
    }
    kf.spatial = Some(CubicBez::new(
        *start,
        *start + out_tangent,
        *end + in_tangent,
        *end,
    ));
}

fn read_f32(v: &Value) -> Option<f32> {
    match v {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::Array(items) => items.first().and_then(read_f32),
        _ => None,
    }
}

fn read_point(v: &Value) -> Option<Point> {
    let items = v.as_array()?;
    let x = items.first().and_then(Value::as_f64)?;
    let y = items.get(1).and_then(Value::as_f64)?;
    Some(Point::new(x, y))
}

fn read_scale(v: &Value) -> Option<Vec2> {
    let p = read_point(v)?;
    Some(Vec2::new(p.x / 100.0, p.y / 100.0))
}

fn read_color(v: &Value) -> Option<Rgba> {
    let items = v.as_array()?;
    if items.len() < 3 {
        return None;
    }
    let provided = items.len().min(4);
    let mut channels = [0.0f32; 4];
    channels[3] = 1.0;
    for (slot, item) in channels.iter_mut().zip(items.iter().take(4)) {
        *slot = item.as_f64()? as f32;
    }
    // Legacy exports store 0..255 channels.
    if channels[..provided].iter().any(|&c| c > 1.0) {
        for c in &mut channels[..provided] {
            *c /= 255.0;
        }
    }
    Some(Rgba::new(channels[0], channels[1], channels[2], channels[3]))
}

fn read_gradient(v: &Value, stops: usize) -> Option<GradientColor> {
    let items = v.as_array()?;
    if stops == 0 || items.len() < stops * 4 {
        return None;
    }
    let floats: Vec<f32> = items
        .iter()
        .map(|item| item.as_f64().map(|f| f as f32))
        .collect::<Option<_>>()?;

    let mut positions = Vec::with_capacity(stops);
    let mut colors = Vec::with_capacity(stops);
    for s in 0..stops {
        let base = s * 4;
        positions.push(floats[base]);
        colors.push(Rgba::opaque(
            floats[base + 1],
            floats[base + 2],
            floats[base + 3],
        ));
    }

    // Trailing (offset, alpha) pairs are opacity stops, folded into the
    // color stops by sampling at each color stop's offset.
    let tail = &floats[stops * 4..];
    if tail.len() >= 2 {
        let alpha_stops: Vec<(f32, f32)> = tail.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        for (pos, color) in positions.iter().zip(colors.iter_mut()) {
            color.a = alpha_at(&alpha_stops, *pos);
        }
    }
    Some(GradientColor::new(positions, colors))
}

fn alpha_at(stops: &[(f32, f32)], pos: f32) -> f32 {
    let Some(&(first_pos, first_alpha)) = stops.first() else {
        return 1.0;
    };
    if pos <= first_pos {
        return first_alpha;
    }
    for w in stops.windows(2) {
        let (p0, a0) = w[0];
        let (p1, a1) = w[1];
        if pos <= p1 {
            let span = p1 - p0;
            if span <= 0.0 {
                return a1;
            }
            return a0 + (a1 - a0) * ((pos - p0) / span);
        }
    }
    stops[stops.len() - 1].1
}

fn read_shape(v: &Value) -> Option<ShapeData> {
    // Static shape values sometimes arrive wrapped in a one-element array.
    let v = match v {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    };
    let obj = v.as_object()?;
    let closed = obj.get("c").and_then(Value::as_bool).unwrap_or(false);
    let vertices = read_point_list(obj.get("v")?)?;
    let in_tangents = read_tangent_list(obj.get("i")?)?;
    let out_tangents = read_tangent_list(obj.get("o")?)?;
    if in_tangents.len() != vertices.len() || out_tangents.len() != vertices.len() {
        return None;
    }
    Some(ShapeData::new(vertices, in_tangents, out_tangents, closed))
}

fn read_point_list(v: &Value) -> Option<Vec<Point>> {
    v.as_array()?.iter().map(read_point).collect()
}

fn read_tangent_list(v: &Value) -> Option<Vec<Vec2>> {
    v.as_array()?
        .iter()
        .map(|item| read_point(item).map(Point::to_vec2))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/document/property.rs"]
mod tests;
