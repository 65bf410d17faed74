//! Configuration for Split-and-Merge line extraction.

use serde::{Deserialize, Serialize};

/// Configuration for Split-and-Merge.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitMergeConfig {
    /// Maximum perpendicular deviation from the running fit before a run is
    /// split. Default: 0.05m
    pub split_threshold: f32,

    /// Minimum supporting points for a segment. Default: 10
    pub min_points: usize,

    /// Maximum gap between consecutive points in one run. Default: 0.10m
    pub max_point_gap: f32,

    /// Minimum segment length kept after splitting. Default: 0.10m
    pub min_length: f32,

    /// Maximum orientation difference for merging (degrees). Default: 18°
    pub merge_angle_deg: f32,

    /// Maximum endpoint gap for merging. Default: 0.20m
    pub merge_gap: f32,
}

impl Default for SplitMergeConfig {
    fn default() -> Self {
        Self {
            split_threshold: 0.05,
            min_points: 10,
            max_point_gap: 0.10,
            min_length: 0.10,
            merge_angle_deg: 18.0,
            merge_gap: 0.20,
        }
    }
}

impl SplitMergeConfig {
    /// Builder-style setter for split threshold.
    pub fn with_split_threshold(mut self, value: f32) -> Self {
        self.split_threshold = value;
        self
    }

    /// Builder-style setter for minimum points.
    pub fn with_min_points(mut self, value: usize) -> Self {
        self.min_points = value;
        self
    }

    /// Builder-style setter for minimum length.
    pub fn with_min_length(mut self, value: f32) -> Self {
        self.min_length = value;
        self
    }

    /// Builder-style setter for maximum point gap.
    pub fn with_max_point_gap(mut self, value: f32) -> Self {
        self.max_point_gap = value;
        self
    }
}
