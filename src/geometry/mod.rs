//! Geometry engine: LiDAR scan to wall references.
//!
//! Pipeline per scan:
//! 1. Drop near-field returns ([`filter_scan`])
//! 2. Convert to Cartesian in the current robot frame, undoing the motion
//!    since the scan was captured ([`scan_to_points`])
//! 3. Split-and-Merge into line segments ([`extract_lines`])
//! 4. Bucket into front/right/back/left relative to the intended heading
//!    ([`relative_walls`]) and pick one wall per side ([`resolve_walls`])
//!
//! Every output is optional: an empty scan yields empty walls, never an error.

pub mod clustering;
pub mod line_fitting;
pub mod parking;
pub mod preprocess;
mod segment;
pub mod split_merge;
pub mod walls;

pub use clustering::{ClusterConfig, marker_candidates};
pub use line_fitting::{FittedLine, LineFit, fit_line};
pub use parking::{ParkingWallConfig, parking_walls};
pub use preprocess::{filter_scan, scan_to_points};
pub use segment::{LineSegment, MIN_SEGMENT_LENGTH};
pub use split_merge::{SplitMergeConfig, extract_lines};
pub use walls::{
    RelativeWalls, ResolvedWalls, TurnInferenceConfig, WallConfig, infer_turn_direction,
    relative_walls, resolve_walls,
};

use serde::{Deserialize, Serialize};

use crate::core::{DeltaPose, Direction, Point2D, RotationDirection};
use crate::sensors::LidarScan;

/// Geometry engine settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Returns closer than this are dropped (meters)
    pub min_range: f32,
    pub split_merge: SplitMergeConfig,
    pub walls: WallConfig,
    pub turn_inference: TurnInferenceConfig,
    pub parking: ParkingWallConfig,
    pub clustering: ClusterConfig,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            min_range: 0.05,
            split_merge: SplitMergeConfig::default(),
            walls: WallConfig::default(),
            turn_inference: TurnInferenceConfig::default(),
            parking: ParkingWallConfig::default().with_max_length(0.30),
            clustering: ClusterConfig::default(),
        }
    }
}

/// Stateless geometry engine bound to its configuration.
#[derive(Clone, Debug, Default)]
pub struct LidarGeometry {
    config: GeometryConfig,
}

impl LidarGeometry {
    pub fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Filtered, motion-compensated points of a scan in scan order.
    pub fn points(&self, scan: &LidarScan, delta: &DeltaPose) -> Vec<Point2D> {
        scan_to_points(&filter_scan(scan, self.config.min_range), delta)
    }

    /// Line segments of a scan.
    pub fn lines(&self, scan: &LidarScan, delta: &DeltaPose) -> Vec<LineSegment> {
        extract_lines(&self.points(scan, delta), &self.config.split_merge)
    }

    /// Bucket lines into sides of the intended direction.
    pub fn relative_walls(
        &self,
        lines: &[LineSegment],
        direction: Direction,
        heading: f32,
    ) -> RelativeWalls {
        relative_walls(lines, direction, heading, &self.config.walls)
    }

    /// Lap direction from wall candidates, `None` while inconclusive.
    pub fn turn_direction(&self, walls: &RelativeWalls) -> Option<RotationDirection> {
        infer_turn_direction(walls, &self.config.turn_inference)
    }

    /// Short crosswise walls of the parking lot.
    pub fn parking_walls(
        &self,
        lines: &[LineSegment],
        direction: Direction,
        heading: f32,
    ) -> Vec<LineSegment> {
        parking_walls(lines, direction, heading, &self.config.parking)
    }

    /// Marker candidate centroids from already converted scan points.
    pub fn marker_candidates(
        &self,
        points: &[Point2D],
        walls: &ResolvedWalls,
        rotation: Option<RotationDirection>,
    ) -> Vec<Point2D> {
        marker_candidates(points, walls, rotation, &self.config.clustering)
    }
}
