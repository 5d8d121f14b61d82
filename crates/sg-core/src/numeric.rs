use crate::CoreError;

/// Floating point type used throughout the workspace.
pub type Real = f64;

/// Reject NaN and infinities.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Linear interpolation `a + w * (b - a)`.
#[inline]
pub fn lerp(a: Real, b: Real, w: Real) -> Real {
    a + w * (b - a)
}

/// Bound `v` below by `lo`, then above by `hi`.
///
/// Unlike `f64::clamp` this never panics: when `lo > hi` the lower bound wins.
/// A NaN input maps to `lo`.
#[inline]
pub fn bound(v: Real, lo: Real, hi: Real) -> Real {
    if v.is_nan() {
        return lo;
    }
    v.min(hi).max(lo)
}

/// Clamp to the unit interval.
#[inline]
pub fn unit_clamp(v: Real) -> Real {
    bound(v, 0.0, 1.0)
}

/// Divide, returning `fallback` when the denominator magnitude is below `min_den`.
#[inline]
pub fn safe_div(num: Real, den: Real, min_den: Real, fallback: Real) -> Real {
    if den.abs() < min_den || !den.is_finite() {
        fallback
    } else {
        num / den
    }
}
