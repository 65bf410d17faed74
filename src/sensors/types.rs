//! Sample payloads delivered by the LiDAR, motion and camera producers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::MarkerColor;

/// One LiDAR return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LidarSample {
    /// Angle in degrees, clockwise from the robot's forward axis
    pub angle_deg: f32,
    /// Range in meters
    pub distance_m: f32,
    /// Signal quality reported by the sensor
    pub quality: u8,
}

impl LidarSample {
    pub fn new(angle_deg: f32, distance_m: f32, quality: u8) -> Self {
        Self {
            angle_deg,
            distance_m,
            quality,
        }
    }
}

/// One full LiDAR revolution, samples in ascending angle order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LidarScan {
    pub samples: Vec<LidarSample>,
}

impl LidarScan {
    pub fn new(samples: Vec<LidarSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Heading, encoder and accelerometer reading from the motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSample {
    /// IMU heading in degrees, clockwise
    pub heading_deg: f32,
    /// Accumulated drive wheel angle in degrees (grows when driving forward)
    pub encoder_angle_deg: f32,
    /// Accelerometer reading (x, y, z) in m/s²
    pub accel: [f32; 3],
}

impl MotionSample {
    pub fn new(heading_deg: f32, encoder_angle_deg: f32) -> Self {
        Self {
            heading_deg,
            encoder_angle_deg,
            accel: [0.0; 3],
        }
    }
}

/// Raw camera frame. The pixel payload is shared, never copied per consumer.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
}

impl CameraFrame {
    pub fn new(width: u32, height: u32, data: Arc<[u8]>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Frame without pixel data.
    pub fn empty() -> Self {
        Self::new(0, 0, Arc::from(Vec::new()))
    }
}

/// Colored blob seen by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlobBearing {
    /// Bearing in degrees, clockwise from the camera's optical axis
    pub bearing_deg: f32,
    pub color: MarkerColor,
}

impl BlobBearing {
    pub fn new(bearing_deg: f32, color: MarkerColor) -> Self {
        Self { bearing_deg, color }
    }
}
