//! Scalar interpolation helpers.

/// Linear interpolation between `a` and `b` at fraction `t`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
