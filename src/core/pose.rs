//! Dead-reckoned displacement between two instants.

use serde::{Deserialize, Serialize};

use super::Point2D;

/// Robot motion accumulated since a reference sample.
///
/// `dx`/`dy` are meters in the robot frame at the reference instant,
/// `dheading` is degrees in `[0, 360)` (clockwise).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DeltaPose {
    pub dx: f32,
    pub dy: f32,
    pub dheading: f32,
}

impl DeltaPose {
    /// No motion.
    pub const ZERO: DeltaPose = DeltaPose {
        dx: 0.0,
        dy: 0.0,
        dheading: 0.0,
    };

    pub fn new(dx: f32, dy: f32, dheading: f32) -> Self {
        Self { dx, dy, dheading }
    }

    /// Re-express a point observed at the reference instant in the current
    /// robot frame: translate by the displacement, then rotate
    /// counter-clockwise by the heading change.
    #[inline]
    pub fn compensate(&self, point: Point2D) -> Point2D {
        (point - Point2D::new(self.dx, self.dy)).rotate_deg(self.dheading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_is_identity() {
        let p = Point2D::new(0.4, 1.2);
        assert_eq!(DeltaPose::ZERO.compensate(p), p);
    }

    #[test]
    fn test_forward_motion_pulls_points_closer() {
        let delta = DeltaPose::new(0.0, 0.25, 0.0);
        let p = delta.compensate(Point2D::new(0.0, 1.0));
        assert_relative_eq!(p.y, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_clockwise_turn_rotates_world_ccw() {
        // Robot turned 90° right: a point that was ahead is now on the left
        let delta = DeltaPose::new(0.0, 0.0, 90.0);
        let p = delta.compensate(Point2D::new(0.0, 1.0));
        assert_relative_eq!(p.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
    }
}
