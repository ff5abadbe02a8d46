//! Percentage math for range controls.
//!
//! All arithmetic is f64. A non-positive or non-finite max never faults:
//! the fill falls back to 0% and the inverse mapping treats the bound
//! as 1.

/// Sanitize a raw max bound: non-positive, NaN, infinite, or absent
/// values become 1 so later division cannot fault.
pub fn sanitized_max(raw: Option<f64>) -> f64 {
    match raw {
        Some(max) if max.is_finite() && max > 0.0 => max,
        _ => 1.0,
    }
}

/// Fill percentage for a value within `[0, max]`, clamped to `[0, 100]`.
///
/// A degenerate max yields 0% rather than a division fault.
pub fn fill_percent(value: f64, max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

/// Inverse mapping: pointer fraction across the hit region to the nearest
/// integer target value. The fraction is clamped to `[0, 1]` first.
pub fn value_at_fraction(fraction: f64, max: f64) -> u64 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (fraction * sanitized_max(Some(max))).round() as u64
}
