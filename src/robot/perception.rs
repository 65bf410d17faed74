//! Geometry for one tick: walls around the intended direction and parking
//! barriers, plus lap-direction inference before the run starts.

use crate::core::{DeltaPose, Direction, RotationDirection};
use crate::geometry::{
    LidarGeometry, LineSegment, ResolvedWalls, extract_lines, resolve_walls, scan_to_points,
};
use crate::sensors::LidarScan;

/// Wall references extracted from one scan.
#[derive(Clone, Debug, Default)]
pub struct Perception {
    pub walls: ResolvedWalls,
    pub parking_walls: Vec<LineSegment>,
}

/// Resolve walls and parking barriers of `scan` in the current robot frame.
pub fn perceive(
    geometry: &LidarGeometry,
    scan: &LidarScan,
    delta: &DeltaPose,
    direction: Direction,
    heading: f32,
) -> Perception {
    let lines = geometry.lines(scan, delta);
    let walls = resolve_walls(&geometry.relative_walls(&lines, direction, heading));
    let parking_walls = geometry.parking_walls(&lines, direction, heading);
    Perception {
        walls,
        parking_walls,
    }
}

/// Lap direction from the start position.
///
/// Uses every return of the scan, near-field included, so the long outer
/// wall is seen even while the robot stands close to it.
pub fn infer_rotation(
    geometry: &LidarGeometry,
    scan: &LidarScan,
    delta: &DeltaPose,
    heading: f32,
) -> Option<RotationDirection> {
    let lines = extract_lines(&scan_to_points(scan, delta), &geometry.config().split_merge);
    let walls = geometry.relative_walls(&lines, Direction::North, heading);
    geometry.turn_direction(&walls)
}
