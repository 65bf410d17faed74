//! Short walls bounding the parking lot.
//!
//! The lot is marked by two short barriers standing out from the outer wall,
//! perpendicular to the direction of travel. Their perpendicular from the
//! robot therefore points straight ahead or straight behind.

use serde::{Deserialize, Serialize};

use crate::core::{Direction, RelativeSide};

use super::segment::LineSegment;
use super::walls::relative_side_of;

/// Parking wall detection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingWallConfig {
    /// Longest segment still considered a parking barrier (meters)
    pub max_length: f32,
    /// Shortest segment considered at all (meters)
    pub min_length: f32,
    /// Orientation tolerance against the crosswise axis (degrees)
    pub angle_tolerance_deg: f32,
}

impl Default for ParkingWallConfig {
    fn default() -> Self {
        Self {
            max_length: 0.25,
            min_length: 0.03,
            angle_tolerance_deg: 25.0,
        }
    }
}

impl ParkingWallConfig {
    pub fn with_max_length(mut self, value: f32) -> Self {
        self.max_length = value;
        self
    }
}

/// Segments short enough to be parking barriers and lying across the
/// intended direction of travel.
pub fn parking_walls(
    lines: &[LineSegment],
    direction: Direction,
    heading: f32,
    config: &ParkingWallConfig,
) -> Vec<LineSegment> {
    lines
        .iter()
        .filter(|l| (config.min_length..=config.max_length).contains(&l.length()))
        .filter(|l| {
            matches!(
                relative_side_of(l, direction, heading, config.angle_tolerance_deg),
                Some(RelativeSide::Front | RelativeSide::Back)
            )
        })
        .copied()
        .collect()
}
