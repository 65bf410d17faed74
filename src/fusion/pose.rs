//! Dead reckoning from heading and wheel encoder samples.
//!
//! LiDAR scans and motion samples arrive at different rates. The estimator
//! integrates every motion sample taken after a scan's capture instant so the
//! scan can be re-expressed in the robot frame of "now".
//!
//! Conventions:
//! - heading is the compass heading in degrees (clockwise positive)
//! - the encoder reports accumulated wheel angle in degrees
//! - the returned displacement is in the robot frame at the reference
//!   instant: forward = +y, right = +x

use std::borrow::Borrow;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::math::{deg_to_rad, heading_delta, wrap_degrees};
use crate::core::{DeltaPose, Timestamped};
use crate::sensors::MotionSample;

/// Pose estimator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Drive wheel diameter (meters)
    pub wheel_diameter: f32,
    /// Samples between the two ends of the heading-rate estimate
    pub heading_rate_lookback: usize,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            wheel_diameter: 0.055,
            heading_rate_lookback: 12,
        }
    }
}

/// Dead-reckoning estimator.
#[derive(Clone, Debug, Default)]
pub struct PoseEstimator {
    config: PoseConfig,
}

impl PoseEstimator {
    pub fn new(config: PoseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoseConfig {
        &self.config
    }

    /// Linear wheel travel for an encoder angle change.
    #[inline]
    pub fn encoder_distance(&self, encoder_delta_deg: f32) -> f32 {
        encoder_delta_deg * PI * self.config.wheel_diameter / 360.0
    }

    /// Motion since `reference_us`.
    ///
    /// Starts at the latest sample taken at or before the reference instant
    /// and integrates every following sample pair. Each step is projected
    /// with the heading accumulated so far, so a curved path yields the arc
    /// end point rather than the chord. Returns [`DeltaPose::ZERO`] when no
    /// sample precedes the reference.
    pub fn estimate<S>(&self, reference_us: u64, history: &[S]) -> DeltaPose
    where
        S: Borrow<Timestamped<MotionSample>>,
    {
        let Some(start) = history
            .iter()
            .rposition(|s| s.borrow().timestamp_us <= reference_us)
        else {
            return DeltaPose::ZERO;
        };

        let mut delta = DeltaPose::ZERO;
        for pair in history[start..].windows(2) {
            let prev = &pair[0].borrow().data;
            let curr = &pair[1].borrow().data;

            let turn = heading_delta(prev.heading_deg, curr.heading_deg);
            delta.dheading = wrap_degrees(delta.dheading + turn);

            let distance = self.encoder_distance(curr.encoder_angle_deg - prev.encoder_angle_deg);
            let heading = deg_to_rad(delta.dheading);
            delta.dx += distance * heading.sin();
            delta.dy += distance * heading.cos();
        }

        delta
    }

    /// Heading rate in degrees per second over the configured lookback.
    ///
    /// Zero when the history is too short or the timestamps do not advance.
    pub fn heading_rate<S>(&self, history: &[S]) -> f32
    where
        S: Borrow<Timestamped<MotionSample>>,
    {
        let lookback = self.config.heading_rate_lookback;
        if lookback == 0 || history.len() <= lookback {
            return 0.0;
        }

        let newest = history[history.len() - 1].borrow();
        let oldest = history[history.len() - 1 - lookback].borrow();
        if newest.timestamp_us <= oldest.timestamp_us {
            return 0.0;
        }

        let dt = (newest.timestamp_us - oldest.timestamp_us) as f32 / 1e6;
        heading_delta(oldest.data.heading_deg, newest.data.heading_deg) / dt
    }
}
