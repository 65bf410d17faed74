//! Pose estimation and marker fusion.
//!
//! - [`PoseEstimator`]: dead reckoning between a scan and "now"
//! - [`sync_camera_lidar`]: pairs a camera frame with a scan
//! - [`associate`]: labels LiDAR marker candidates with camera colors
//! - [`MarkerClassifier`]: places a labeled marker in its slot
//! - [`MarkerMap`]: debounces slots into the committed marker map

pub mod association;
pub mod classify;
pub mod debounce;
pub mod pose;
pub mod sync;

pub use association::{AssociationConfig, FusedMarker, associate};
pub use classify::{Band, ClassifiedMarker, ClassifyConfig, MarkerClassifier};
pub use debounce::{DebounceConfig, IgnoreRule, MarkerMap};
pub use pose::{PoseConfig, PoseEstimator};
pub use sync::{Synced, sync_camera_lidar};

use serde::{Deserialize, Serialize};

use crate::core::{MarkerKey, Point2D, RotationDirection, Segment};
use crate::geometry::ResolvedWalls;
use crate::sensors::BlobBearing;

/// Fusion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub pose: PoseConfig,
    pub association: AssociationConfig,
    pub classify: ClassifyConfig,
    pub debounce: DebounceConfig,
    /// Fusion pauses above this heading rate (degrees per second)
    pub max_heading_rate: f32,
    /// Camera pipeline latency added to frame timestamps (milliseconds)
    pub camera_delay_ms: i64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            pose: PoseConfig::default(),
            association: AssociationConfig::default(),
            classify: ClassifyConfig::default(),
            debounce: DebounceConfig::default(),
            max_heading_rate: 20.0,
            camera_delay_ms: 0,
        }
    }
}

/// Marker fusion pipeline with its committed map.
#[derive(Debug)]
pub struct MarkerFusion {
    association: AssociationConfig,
    classifier: MarkerClassifier,
    map: MarkerMap,
    max_heading_rate: f32,
}

impl MarkerFusion {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            association: config.association.clone(),
            classifier: MarkerClassifier::new(config.classify.clone()),
            map: MarkerMap::new(config.debounce.clone()),
            max_heading_rate: config.max_heading_rate,
        }
    }

    /// Whether observations are trustworthy: not mid-turn and not rotating
    /// fast enough to blur the camera.
    pub fn accepts(&self, turning: bool, heading_rate: f32) -> bool {
        !turning && heading_rate.abs() <= self.max_heading_rate
    }

    /// Fuse one tick of observations into the map. Returns newly committed
    /// slots.
    pub fn process(
        &mut self,
        candidates: &[Point2D],
        bearings: &[BlobBearing],
        walls: &ResolvedWalls,
        rotation: RotationDirection,
        segment: Segment,
    ) -> Vec<MarkerKey> {
        let mut committed = Vec::new();
        for fused in associate(bearings, candidates, &self.association) {
            let Some(classified) = self.classifier.classify(&fused, walls, rotation, segment)
            else {
                continue;
            };
            if let Some(entry) = self.map.observe(classified) {
                committed.push(entry.key);
            }
        }
        committed
    }

    pub fn map(&self) -> &MarkerMap {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MarkerColor, SegmentLocation, WallSide};
    use crate::core::math::rad_to_deg;
    use crate::geometry::LineSegment;

    #[test]
    fn test_gate() {
        let fusion = MarkerFusion::new(&FusionConfig::default());
        assert!(fusion.accepts(false, 20.0));
        assert!(fusion.accepts(false, -5.0));
        assert!(!fusion.accepts(false, 20.5));
        assert!(!fusion.accepts(true, 0.0));
    }

    #[test]
    fn test_process_commits_after_three_ticks() {
        let config = FusionConfig::default();
        let mut fusion = MarkerFusion::new(&config);

        // Clockwise, outer wall 0.4 m left, front wall 2.5 m ahead
        let walls = ResolvedWalls {
            front: Some(LineSegment::new(Point2D::new(-1.0, 2.5), Point2D::new(1.0, 2.5))),
            left: Some(LineSegment::new(Point2D::new(-0.4, -1.0), Point2D::new(-0.4, 2.5))),
            ..Default::default()
        };
        // 0.8 m from the outer wall, 1.5 m from the front: inner side, mid slot
        let marker = Point2D::new(0.4, 1.0);
        let ray = marker - config.association.camera_offset;
        let bearing = BlobBearing::new(90.0 - rad_to_deg(ray.y.atan2(ray.x)), MarkerColor::Green);

        let mut newly = Vec::new();
        for _ in 0..3 {
            newly = fusion.process(
                &[marker],
                &[bearing],
                &walls,
                RotationDirection::Clockwise,
                Segment::B,
            );
        }

        let key = MarkerKey::new(Segment::B, SegmentLocation::B);
        assert_eq!(newly, vec![key]);
        let entry = fusion.map().get(key).unwrap();
        assert_eq!(entry.side, WallSide::Inner);
        assert_eq!(entry.color, MarkerColor::Green);
    }
}
