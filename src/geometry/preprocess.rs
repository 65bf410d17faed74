//! Scan filtering and polar to Cartesian conversion.

use crate::core::{DeltaPose, Point2D};
use crate::sensors::{LidarSample, LidarScan};

/// Drop returns closer than `min_range` (near-field noise and zero ranges).
pub fn filter_scan(scan: &LidarScan, min_range: f32) -> LidarScan {
    LidarScan::new(
        scan.samples
            .iter()
            .filter(|s| s.distance_m >= min_range)
            .copied()
            .collect(),
    )
}

/// Convert a sample to a point in the current robot frame.
#[inline]
pub fn sample_to_point(sample: &LidarSample, delta: &DeltaPose) -> Point2D {
    delta.compensate(Point2D::from_polar(sample.angle_deg, sample.distance_m))
}

/// Convert every sample of a scan, preserving scan order.
pub fn scan_to_points(scan: &LidarScan, delta: &DeltaPose) -> Vec<Point2D> {
    scan.samples
        .iter()
        .map(|s| sample_to_point(s, delta))
        .collect()
}
