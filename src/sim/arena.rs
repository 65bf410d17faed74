//! Simulated arena: a square ring of walls with optional marker blocks.
//!
//! World frame: +x east, +y north, meters. Headings are compass degrees
//! (0 = north, clockwise), matching the robot's IMU convention.

use crate::core::math::deg_to_rad;
use crate::core::{MarkerColor, Point2D, RotationDirection};
use crate::geometry::LineSegment;

/// Marker block standing in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimMarker {
    /// Block center (world frame)
    pub position: Point2D,
    pub color: MarkerColor,
}

/// Robot pose in the world frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimPose {
    pub position: Point2D,
    /// Compass heading in degrees
    pub heading: f32,
}

impl SimPose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            position: Point2D::new(x, y),
            heading,
        }
    }

    /// Unit vector along a compass bearing.
    pub fn compass(bearing_deg: f32) -> Point2D {
        let r = deg_to_rad(bearing_deg);
        Point2D::new(r.sin(), r.cos())
    }

    /// Robot-frame point (forward +y, right +x) to world frame.
    pub fn to_world(&self, local: Point2D) -> Point2D {
        let r = deg_to_rad(self.heading);
        let (s, c) = r.sin_cos();
        self.position + Point2D::new(local.x * c + local.y * s, -local.x * s + local.y * c)
    }

    /// World point to robot frame.
    pub fn to_local(&self, world: Point2D) -> Point2D {
        let d = world - self.position;
        let r = deg_to_rad(self.heading);
        let (s, c) = r.sin_cos();
        Point2D::new(d.x * c - d.y * s, d.x * s + d.y * c)
    }
}

/// Walls and markers.
#[derive(Clone, Debug)]
pub struct Arena {
    size: f32,
    walls: Vec<LineSegment>,
    markers: Vec<SimMarker>,
    marker_size: f32,
}

impl Arena {
    /// Outer square of side `outer` with a centered inner square of side
    /// `inner`.
    pub fn square(outer: f32, inner: f32) -> Self {
        let lo = (outer - inner) / 2.0;
        let hi = lo + inner;
        let mut walls = square_walls(Point2D::ZERO, Point2D::new(outer, outer));
        walls.extend(square_walls(Point2D::new(lo, lo), Point2D::new(hi, hi)));
        Self {
            size: outer,
            walls,
            markers: Vec::new(),
            marker_size: 0.05,
        }
    }

    /// 3 × 3 m ring around a 1 × 1 m island.
    pub fn standard() -> Self {
        Self::square(3.0, 1.0)
    }

    pub fn with_marker(mut self, x: f32, y: f32, color: MarkerColor) -> Self {
        self.markers.push(SimMarker {
            position: Point2D::new(x, y),
            color,
        });
        self
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn walls(&self) -> &[LineSegment] {
        &self.walls
    }

    pub fn markers(&self) -> &[SimMarker] {
        &self.markers
    }

    /// Start pose in the start straight facing north. The outer wall is on
    /// the left for a clockwise lap and on the right otherwise.
    pub fn start_pose(&self, rotation: RotationDirection) -> SimPose {
        let corridor = (self.size - 1.0) / 2.0;
        let x = match rotation {
            RotationDirection::Clockwise => corridor / 2.0,
            RotationDirection::CounterClockwise => self.size - corridor / 2.0,
        };
        SimPose::new(x, self.size / 3.0, 0.0)
    }

    /// Distance along a ray to the first wall or marker face.
    pub fn raycast(&self, origin: Point2D, direction: Point2D, max_range: f32) -> Option<f32> {
        let half = self.marker_size / 2.0;
        let marker_faces = self.markers.iter().flat_map(|m| {
            square_walls(
                m.position - Point2D::new(half, half),
                m.position + Point2D::new(half, half),
            )
        });

        self.walls
            .iter()
            .copied()
            .chain(marker_faces)
            .filter_map(|wall| intersect(origin, direction, &wall))
            .filter(|&t| t <= max_range)
            .min_by(f32::total_cmp)
    }
}

/// Four walls of an axis-aligned rectangle.
fn square_walls(min: Point2D, max: Point2D) -> Vec<LineSegment> {
    let corners = [
        min,
        Point2D::new(max.x, min.y),
        max,
        Point2D::new(min.x, max.y),
    ];
    (0..4)
        .map(|i| LineSegment::new(corners[i], corners[(i + 1) % 4]))
        .collect()
}

/// Ray parameter of the hit with `wall`, if any.
fn intersect(origin: Point2D, direction: Point2D, wall: &LineSegment) -> Option<f32> {
    let edge = wall.p2() - wall.p1();
    let denom = direction.cross(&edge);
    if denom.abs() < 1e-9 {
        return None;
    }
    let to_start = wall.p1() - origin;
    let t = to_start.cross(&edge) / denom;
    let u = to_start.cross(&direction) / denom;
    (t > 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_raycast_hits_nearest_wall() {
        let arena = Arena::standard();
        let origin = Point2D::new(0.5, 1.0);

        let north = arena.raycast(origin, SimPose::compass(0.0), 8.0).unwrap();
        assert_relative_eq!(north, 2.0, epsilon = 1e-4);

        let west = arena.raycast(origin, SimPose::compass(270.0), 8.0).unwrap();
        assert_relative_eq!(west, 0.5, epsilon = 1e-4);

        // Island face at x = 1
        let east = arena.raycast(Point2D::new(0.5, 1.5), SimPose::compass(90.0), 8.0).unwrap();
        assert_relative_eq!(east, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_marker_blocks_ray() {
        let arena = Arena::standard().with_marker(0.5, 2.0, MarkerColor::Red);
        let hit = arena.raycast(Point2D::new(0.5, 1.0), SimPose::compass(0.0), 8.0).unwrap();
        assert_relative_eq!(hit, 0.975, epsilon = 1e-4);
    }

    #[test]
    fn test_frame_conversions() {
        let pose = SimPose::new(1.0, 1.0, 90.0);
        let ahead = pose.to_world(Point2D::new(0.0, 1.0));
        assert_relative_eq!(ahead.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(ahead.y, 1.0, epsilon = 1e-5);

        let local = pose.to_local(Point2D::new(1.0, 0.0));
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_start_pose_sides() {
        let arena = Arena::standard();
        assert_relative_eq!(arena.start_pose(RotationDirection::Clockwise).position.x, 0.5);
        assert_relative_eq!(arena.start_pose(RotationDirection::CounterClockwise).position.x, 2.5);
    }
}
