//! Angle utilities in degrees.
//!
//! Headings follow the IMU convention used across the crate: 0° is the
//! starting forward direction and angles grow clockwise. Bearings returned by
//! [`bearing_deg`] use the mathematical convention (counter-clockwise from +x)
//! because they are only ever compared against other bearings.

/// Wrap a heading into `[0, 360)`.
///
/// # Example
/// ```
/// use pathik::core::math::wrap_degrees;
///
/// assert_eq!(wrap_degrees(-90.0), 270.0);
/// assert_eq!(wrap_degrees(720.0), 0.0);
/// ```
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Normalize an angle difference into `[-180, 180)`.
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = wrap_degrees(angle + 180.0) - 180.0;
    if a < -180.0 { a + 360.0 } else { a }
}

/// Signed shortest rotation from `from` to `to` in degrees.
///
/// Positive means clockwise (heading grows).
#[inline]
pub fn heading_delta(from: f32, to: f32) -> f32 {
    normalize_degrees(to - from)
}

/// Check whether `heading` lies within `tolerance` degrees of `target`.
#[inline]
pub fn within_degrees(heading: f32, target: f32, tolerance: f32) -> bool {
    heading_delta(heading, target).abs() <= tolerance
}

/// Check whether `angle` lies in the half-open arc `[start, end)` after wrapping.
///
/// Arcs may cross zero (`start > end`).
#[inline]
pub fn in_arc(angle: f32, start: f32, end: f32) -> bool {
    let a = wrap_degrees(angle);
    if start <= end {
        a >= start && a < end
    } else {
        a >= start || a < end
    }
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg.to_radians()
}

/// Convert radians to degrees.
#[inline]
pub fn rad_to_deg(rad: f32) -> f32 {
    rad.to_degrees()
}

// ─────────────────────────────────────────────────────────────────────────────
// Point helpers
// ─────────────────────────────────────────────────────────────────────────────

use super::Point2D;

/// Mathematical bearing of a point from the origin, degrees in `[0, 360)`.
///
/// Counter-clockwise from +x, so a point straight ahead (+y) is at 90°.
#[inline]
pub fn bearing_deg(point: Point2D) -> f32 {
    wrap_degrees(rad_to_deg(point.y.atan2(point.x)))
}

/// Centroid of a point set, `None` when empty.
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f32;
    let sum = points.iter().fold(Point2D::ZERO, |acc, p| acc + *p);
    Some(sum * (1.0 / n))
}
