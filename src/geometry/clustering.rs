//! Marker candidate extraction from LiDAR points.
//!
//! Marker blocks stand between the inner and outer walls. Points close to a
//! resolved wall or beyond the outer or front wall are discarded; the rest
//! are grouped into clusters of consecutive nearby points.

use serde::{Deserialize, Serialize};

use crate::core::math::centroid;
use crate::core::{Point2D, RotationDirection};

use super::segment::LineSegment;
use super::walls::ResolvedWalls;

/// Marker clustering settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Maximum distance between consecutive points of one cluster (meters)
    pub gap_threshold: f32,
    /// Minimum points per cluster
    pub min_cluster_size: usize,
    /// Points closer than this to a resolved wall are wall returns (meters)
    pub wall_clearance: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 0.05,
            min_cluster_size: 10,
            wall_clearance: 0.08,
        }
    }
}

/// True when `p` is on the same side of `wall` as the robot.
fn on_robot_side(wall: &LineSegment, p: Point2D) -> bool {
    wall.side_of(p).signum() == wall.side_of(Point2D::ZERO).signum()
}

/// Points that may belong to a marker.
pub fn candidate_points(
    points: &[Point2D],
    walls: &ResolvedWalls,
    rotation: Option<RotationDirection>,
    config: &ClusterConfig,
) -> Vec<Point2D> {
    let outer = walls.outer(rotation.unwrap_or(RotationDirection::Clockwise));
    points
        .iter()
        .filter(|p| {
            walls
                .iter()
                .all(|w| w.perpendicular_distance(**p) > config.wall_clearance)
        })
        .filter(|p| outer.is_none_or(|w| on_robot_side(&w, **p)))
        .filter(|p| walls.front.is_none_or(|w| on_robot_side(&w, **p)))
        .copied()
        .collect()
}

/// Group consecutive candidates and return the centroid of every cluster
/// with enough support.
pub fn cluster_centroids(candidates: &[Point2D], config: &ClusterConfig) -> Vec<Point2D> {
    let mut centroids = Vec::new();
    let mut start = 0;

    for i in 1..=candidates.len() {
        let split = i == candidates.len()
            || candidates[i].distance(&candidates[i - 1]) >= config.gap_threshold;
        if split {
            let cluster = &candidates[start..i];
            if cluster.len() >= config.min_cluster_size
                && let Some(c) = centroid(cluster)
            {
                centroids.push(c);
            }
            start = i;
        }
    }

    centroids
}

/// Marker candidate positions.
pub fn marker_candidates(
    points: &[Point2D],
    walls: &ResolvedWalls,
    rotation: Option<RotationDirection>,
    config: &ClusterConfig,
) -> Vec<Point2D> {
    cluster_centroids(&candidate_points(points, walls, rotation, config), config)
}
