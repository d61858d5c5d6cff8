pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub(crate) fn lerp64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Floored modulo: result carries the sign of `modulus` (Euclidean for
/// positive moduli). Used for wrapping trim offsets around closed paths.
pub(crate) fn floor_mod64(x: f64, modulus: f64) -> f64 {
    x - modulus * (x / modulus).floor()
}
