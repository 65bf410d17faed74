//! Wall classification relative to the intended heading, wall resolution and
//! turn-direction inference.
//!
//! A segment's side is decided by where its perpendicular from the robot
//! points in the world: the robot-frame bearing is turned into a compass
//! bearing with the measured heading and compared with the intended
//! direction's front/right/back/left headings.

use serde::{Deserialize, Serialize};

use crate::core::math::{within_degrees, wrap_degrees};
use crate::core::{Direction, Point2D, RelativeSide, RotationDirection};

use super::segment::LineSegment;

/// Relative wall classification settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Minimum wall length after collinear joining (meters)
    pub min_length: f32,
    /// Maximum deviation of a wall's perpendicular from a side's heading (degrees)
    pub angle_tolerance_deg: f32,
    /// Maximum line-to-line distance for joining same-side pieces (meters)
    pub collinear_threshold: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            min_length: 0.30,
            angle_tolerance_deg: 25.0,
            collinear_threshold: 0.22,
        }
    }
}

/// Turn-direction inference settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnInferenceConfig {
    /// Minimum length of the longest outer-wall candidate (meters)
    pub min_outer_length: f32,
    /// How much longer the outer side must be than the other side
    pub dominance_ratio: f32,
}

impl Default for TurnInferenceConfig {
    fn default() -> Self {
        Self {
            min_outer_length: 1.2,
            dominance_ratio: 1.5,
        }
    }
}

/// Wall candidates bucketed by side. Rebuilt every tick.
#[derive(Clone, Debug, Default)]
pub struct RelativeWalls {
    pub front: Vec<LineSegment>,
    pub right: Vec<LineSegment>,
    pub back: Vec<LineSegment>,
    pub left: Vec<LineSegment>,
}

impl RelativeWalls {
    pub fn side(&self, side: RelativeSide) -> &[LineSegment] {
        match side {
            RelativeSide::Front => &self.front,
            RelativeSide::Right => &self.right,
            RelativeSide::Back => &self.back,
            RelativeSide::Left => &self.left,
        }
    }

    fn side_mut(&mut self, side: RelativeSide) -> &mut Vec<LineSegment> {
        match side {
            RelativeSide::Front => &mut self.front,
            RelativeSide::Right => &mut self.right,
            RelativeSide::Back => &mut self.back,
            RelativeSide::Left => &mut self.left,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.right.is_empty() && self.back.is_empty() && self.left.is_empty()
    }
}

/// One representative wall per side; every slot may be empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResolvedWalls {
    pub front: Option<LineSegment>,
    pub back: Option<LineSegment>,
    pub left: Option<LineSegment>,
    pub right: Option<LineSegment>,
    pub far_left: Option<LineSegment>,
    pub far_right: Option<LineSegment>,
}

impl ResolvedWalls {
    pub fn side(&self, side: RelativeSide) -> Option<LineSegment> {
        match side {
            RelativeSide::Front => self.front,
            RelativeSide::Right => self.right,
            RelativeSide::Back => self.back,
            RelativeSide::Left => self.left,
        }
    }

    /// Wall on the outside of the lap.
    pub fn outer(&self, rotation: RotationDirection) -> Option<LineSegment> {
        self.side(rotation.outer_side())
    }

    /// Wall on the inside of the lap.
    pub fn inner(&self, rotation: RotationDirection) -> Option<LineSegment> {
        self.side(rotation.inner_side())
    }

    /// Distance from the robot to the front wall.
    pub fn front_distance(&self) -> Option<f32> {
        self.front.map(|w| w.perpendicular_distance(Point2D::ZERO))
    }

    /// All resolved walls.
    pub fn iter(&self) -> impl Iterator<Item = &LineSegment> {
        [
            &self.front,
            &self.back,
            &self.left,
            &self.right,
            &self.far_left,
            &self.far_right,
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Compass bearing (degrees, clockwise) of the perpendicular from the robot
/// to the segment's line.
pub fn world_bearing(segment: &LineSegment, heading: f32) -> f32 {
    // Robot-frame math bearing (CCW from +x) to clockwise-from-forward
    wrap_degrees(heading + 90.0 - segment.perpendicular_bearing(Point2D::ZERO))
}

/// Side of `direction` the segment belongs to, if within tolerance of one.
pub fn relative_side_of(
    segment: &LineSegment,
    direction: Direction,
    heading: f32,
    tolerance_deg: f32,
) -> Option<RelativeSide> {
    let bearing = world_bearing(segment, heading);
    [
        RelativeSide::Front,
        RelativeSide::Right,
        RelativeSide::Back,
        RelativeSide::Left,
    ]
    .into_iter()
    .find(|side| {
        within_degrees(
            bearing,
            direction.from_relative_side(*side).to_heading(),
            tolerance_deg,
        )
    })
}

/// Bucket segments by side, join collinear pieces and drop short walls.
pub fn relative_walls(
    lines: &[LineSegment],
    direction: Direction,
    heading: f32,
    config: &WallConfig,
) -> RelativeWalls {
    let mut walls = RelativeWalls::default();
    for line in lines {
        if let Some(side) = relative_side_of(line, direction, heading, config.angle_tolerance_deg) {
            walls.side_mut(side).push(*line);
        }
    }

    for side in [
        RelativeSide::Front,
        RelativeSide::Right,
        RelativeSide::Back,
        RelativeSide::Left,
    ] {
        let bucket = std::mem::take(walls.side_mut(side));
        *walls.side_mut(side) = join_collinear(bucket, config.collinear_threshold)
            .into_iter()
            .filter(|w| w.length() >= config.min_length)
            .collect();
    }

    walls
}

/// Join pieces lying on the same line into one spanning segment, repeating
/// until no pair qualifies.
fn join_collinear(mut segments: Vec<LineSegment>, threshold: f32) -> Vec<LineSegment> {
    let mut joined = true;
    while joined {
        joined = false;
        'search: for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let (a, b) = (segments[i], segments[j]);
                let (long, short) = if a.length() >= b.length() { (a, b) } else { (b, a) };
                if long.perpendicular_distance(short.p1()) <= threshold
                    && long.perpendicular_distance(short.p2()) <= threshold
                    && let Some(span) = long.spanning(&[a.p1(), a.p2(), b.p1(), b.p2()])
                {
                    segments[i] = span;
                    segments.remove(j);
                    joined = true;
                    break 'search;
                }
            }
        }
    }
    segments
}

/// Candidates ranked best first: longest, then closest to the robot.
fn ranked(candidates: &[LineSegment]) -> Vec<LineSegment> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        b.length().total_cmp(&a.length()).then_with(|| {
            a.perpendicular_distance(Point2D::ZERO)
                .total_cmp(&b.perpendicular_distance(Point2D::ZERO))
        })
    });
    sorted
}

/// Pick one wall per side. Far-left/far-right are the runner-up side walls.
pub fn resolve_walls(walls: &RelativeWalls) -> ResolvedWalls {
    let left = ranked(&walls.left);
    let right = ranked(&walls.right);
    ResolvedWalls {
        front: ranked(&walls.front).first().copied(),
        back: ranked(&walls.back).first().copied(),
        left: left.first().copied(),
        right: right.first().copied(),
        far_left: left.get(1).copied(),
        far_right: right.get(1).copied(),
    }
}

fn longest(candidates: &[LineSegment]) -> f32 {
    candidates
        .iter()
        .map(LineSegment::length)
        .fold(0.0, f32::max)
}

/// Infer the lap direction from which side has the long outer wall.
///
/// `None` means inconclusive; callers retry on a later tick.
pub fn infer_turn_direction(
    walls: &RelativeWalls,
    config: &TurnInferenceConfig,
) -> Option<RotationDirection> {
    let left = longest(&walls.left);
    let right = longest(&walls.right);

    if left >= config.min_outer_length && left >= config.dominance_ratio * right {
        Some(RotationDirection::Clockwise)
    } else if right >= config.min_outer_length && right >= config.dominance_ratio * left {
        Some(RotationDirection::CounterClockwise)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(x1: f32, y1: f32, x2: f32, y2: f32) -> LineSegment {
        LineSegment::new(Point2D::new(x1, y1), Point2D::new(x2, y2))
    }

    #[test]
    fn test_buckets_when_heading_matches() {
        let lines = [
            seg(-1.0, 1.5, 1.0, 1.5),   // front
            seg(0.6, -1.0, 0.6, 1.0),   // right
            seg(-1.0, -0.8, 1.0, -0.8), // back
            seg(-0.4, -1.0, -0.4, 1.0), // left
        ];
        let walls = relative_walls(&lines, Direction::North, 0.0, &WallConfig::default());
        assert_eq!(walls.front.len(), 1);
        assert_eq!(walls.right.len(), 1);
        assert_eq!(walls.back.len(), 1);
        assert_eq!(walls.left.len(), 1);
    }

    #[test]
    fn test_buckets_follow_intended_direction() {
        // Robot measured at 90° (EAST) but intended NORTH: the wall ahead of
        // the robot is the intended right side.
        let ahead = seg(-1.0, 1.5, 1.0, 1.5);
        let side = relative_side_of(&ahead, Direction::North, 90.0, 25.0);
        assert_eq!(side, Some(RelativeSide::Right));
    }

    #[test]
    fn test_oblique_wall_is_unclassified() {
        let oblique = seg(0.0, 1.0, 1.0, 0.0);
        assert_eq!(relative_side_of(&oblique, Direction::North, 0.0, 25.0), None);
    }

    #[test]
    fn test_short_walls_dropped_and_pieces_joined() {
        let lines = [
            seg(-0.4, -0.2, -0.4, -0.05), // 0.15 long
            seg(-0.42, 0.05, -0.42, 0.2), // 0.15 long, collinear within 0.22
            seg(0.6, 0.0, 0.6, 0.2),      // lone short piece
        ];
        let walls = relative_walls(&lines, Direction::North, 0.0, &WallConfig::default());
        assert_eq!(walls.left.len(), 1);
        assert_relative_eq!(walls.left[0].length(), 0.4, epsilon = 0.01);
        assert!(walls.right.is_empty());
    }

    #[test]
    fn test_resolve_prefers_longest_then_closest() {
        let walls = RelativeWalls {
            left: vec![
                seg(-1.4, -0.5, -1.4, 0.5),
                seg(-0.4, -1.0, -0.4, 1.0),
                seg(-0.9, -1.0, -0.9, 1.0),
            ],
            ..Default::default()
        };
        let resolved = resolve_walls(&walls);
        assert_relative_eq!(
            resolved.left.unwrap().perpendicular_distance(Point2D::ZERO),
            0.4
        );
        assert_relative_eq!(
            resolved.far_left.unwrap().perpendicular_distance(Point2D::ZERO),
            0.9
        );
        assert!(resolved.front.is_none());
        assert!(resolved.far_right.is_none());
    }

    #[test]
    fn test_empty_input_resolves_to_empty() {
        let walls = relative_walls(&[], Direction::North, 0.0, &WallConfig::default());
        assert!(walls.is_empty());
        assert!(resolve_walls(&walls).is_empty());
    }

    #[test]
    fn test_turn_direction_inference() {
        let config = TurnInferenceConfig::default();
        let long_left = RelativeWalls {
            left: vec![seg(-0.3, -1.0, -0.3, 1.5)],
            right: vec![seg(0.7, 0.0, 0.7, 1.0)],
            ..Default::default()
        };
        assert_eq!(
            infer_turn_direction(&long_left, &config),
            Some(RotationDirection::Clockwise)
        );

        let long_right = RelativeWalls {
            right: vec![seg(0.3, -1.0, 0.3, 1.5)],
            ..Default::default()
        };
        assert_eq!(
            infer_turn_direction(&long_right, &config),
            Some(RotationDirection::CounterClockwise)
        );

        let balanced = RelativeWalls {
            left: vec![seg(-0.3, -1.0, -0.3, 1.5)],
            right: vec![seg(0.7, -1.0, 0.7, 1.0)],
            ..Default::default()
        };
        assert_eq!(infer_turn_direction(&balanced, &config), None);
    }
}
