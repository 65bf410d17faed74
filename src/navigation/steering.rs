//! Steering law for closed-loop states.
//!
//! The wall controller turns the outer-wall distance error into a heading
//! correction. The correction is subtracted from the heading error on a
//! clockwise lap (outer wall on the left) and added on a counter-clockwise
//! lap, so a positive wall error always steers toward the outer wall. When
//! reversing, both the correction and the combined error change sign.

use crate::core::math::normalize_degrees;
use crate::core::{Point2D, RotationDirection};
use crate::geometry::ResolvedWalls;

/// Shortest signed heading error toward `target`.
#[inline]
pub fn heading_error(target: f32, heading: f32) -> f32 {
    normalize_degrees(target - heading)
}

/// Outer-wall distance minus the target offset, zero without an outer wall.
pub fn wall_error(walls: &ResolvedWalls, rotation: RotationDirection, target_offset: f32) -> f32 {
    walls
        .outer(rotation)
        .map(|w| w.perpendicular_distance(Point2D::ZERO) - target_offset)
        .unwrap_or(0.0)
}

/// Combine the heading error with the wall correction.
pub fn blend_heading_error(
    heading_error: f32,
    wall_correction: f32,
    rotation: RotationDirection,
    wall_active: bool,
    reversing: bool,
) -> f32 {
    let correction = if reversing { -wall_correction } else { wall_correction };

    let mut error = heading_error;
    if wall_active {
        match rotation {
            RotationDirection::Clockwise => error -= correction,
            RotationDirection::CounterClockwise => error += correction,
        }
    }

    if reversing { -error } else { error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LineSegment;
    use approx::assert_relative_eq;

    const CW: RotationDirection = RotationDirection::Clockwise;
    const CCW: RotationDirection = RotationDirection::CounterClockwise;

    #[test]
    fn test_clockwise_pulls_toward_outer_wall() {
        assert_eq!(blend_heading_error(0.0, 10.0, CW, true, false), -10.0);
        assert_eq!(blend_heading_error(5.0, 10.0, CCW, true, false), 15.0);
    }

    #[test]
    fn test_inactive_wall_ignored() {
        assert_eq!(blend_heading_error(5.0, 10.0, CW, false, false), 5.0);
    }

    #[test]
    fn test_reversing_flips_both_terms() {
        // (5 - (-10)) negated
        assert_eq!(blend_heading_error(5.0, 10.0, CW, true, true), -15.0);
    }

    #[test]
    fn test_heading_error_wraps() {
        assert_relative_eq!(heading_error(0.0, 350.0), 10.0);
        assert_relative_eq!(heading_error(270.0, 10.0), -100.0);
    }

    #[test]
    fn test_wall_error() {
        let walls = ResolvedWalls {
            left: Some(LineSegment::new(Point2D::new(-0.55, -1.0), Point2D::new(-0.55, 1.0))),
            ..Default::default()
        };
        assert_relative_eq!(wall_error(&walls, CW, 0.50), 0.05, epsilon = 1e-5);
        assert_eq!(wall_error(&walls, CCW, 0.50), 0.0);
    }
}
