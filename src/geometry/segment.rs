//! Line segment wall candidate.

use serde::{Deserialize, Serialize};

use crate::core::Point2D;
use crate::core::math::{rad_to_deg, wrap_degrees};

/// Shortest segment the extractor will ever produce (meters).
pub const MIN_SEGMENT_LENGTH: f32 = 1e-4;

/// Undirected wall candidate between two distinct points.
///
/// Construction rejects zero-length segments so every query below is well
/// defined.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    p1: Point2D,
    p2: Point2D,
}

impl LineSegment {
    /// Segment between two points, `None` if they coincide.
    pub fn try_new(p1: Point2D, p2: Point2D) -> Option<Self> {
        (p1.distance(&p2) > MIN_SEGMENT_LENGTH).then_some(Self { p1, p2 })
    }

    /// Segment between two points.
    ///
    /// # Panics
    /// Panics if the points coincide.
    pub fn new(p1: Point2D, p2: Point2D) -> Self {
        assert!(
            p1.distance(&p2) > MIN_SEGMENT_LENGTH,
            "degenerate line segment: {p1:?} -> {p2:?}"
        );
        Self { p1, p2 }
    }

    #[inline]
    pub fn p1(&self) -> Point2D {
        self.p1
    }

    #[inline]
    pub fn p2(&self) -> Point2D {
        self.p2
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.p1.distance(&self.p2)
    }

    /// Unit vector from `p1` to `p2`.
    #[inline]
    pub fn direction(&self) -> Point2D {
        (self.p2 - self.p1).normalize()
    }

    #[inline]
    pub fn midpoint(&self) -> Point2D {
        (self.p1 + self.p2) * 0.5
    }

    /// Line orientation in degrees, `[0, 180)`.
    pub fn orientation_deg(&self) -> f32 {
        let d = self.p2 - self.p1;
        let a = wrap_degrees(rad_to_deg(d.y.atan2(d.x)));
        if a >= 180.0 { a - 180.0 } else { a }
    }

    /// Signed side test: positive when `point` is left of `p1 -> p2`.
    #[inline]
    pub fn side_of(&self, point: Point2D) -> f32 {
        (self.p2 - self.p1).cross(&(point - self.p1))
    }

    /// Distance from `point` to the infinite line through the segment.
    pub fn perpendicular_distance(&self, point: Point2D) -> f32 {
        self.side_of(point).abs() / self.length()
    }

    /// Bearing (degrees `[0, 360)`, counter-clockwise from +x) of the
    /// perpendicular dropped from `point` onto the line.
    pub fn perpendicular_bearing(&self, point: Point2D) -> f32 {
        let d = self.p2 - self.p1;
        // Normal pointing from the line towards the point
        let mut normal = Point2D::new(-d.y, d.x);
        if self.side_of(point) < 0.0 {
            normal = -normal;
        }
        wrap_degrees(rad_to_deg(normal.y.atan2(normal.x)) + 180.0)
    }

    /// Scalar position of `point` projected onto the line, measured from `p1`.
    #[inline]
    pub fn project(&self, point: Point2D) -> f32 {
        (point - self.p1).dot(&self.direction())
    }

    /// Point on the line at scalar position `t` from `p1`.
    #[inline]
    pub fn point_at(&self, t: f32) -> Point2D {
        self.p1 + self.direction() * t
    }

    /// Segment spanning the extreme projections of `points` on this line.
    ///
    /// Keeps this segment's orientation. `None` if the span collapses.
    pub fn spanning(&self, points: &[Point2D]) -> Option<LineSegment> {
        let (t_min, t_max) = points
            .iter()
            .map(|p| self.project(*p))
            .fold((f32::MAX, f32::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));
        LineSegment::try_new(self.point_at(t_min), self.point_at(t_max))
    }
}
