//! Hardware-facing collaborator traits.

use crate::error::Result;

use super::types::{BlobBearing, CameraFrame};

/// Drive train command sink.
///
/// Called exactly once per control tick.
pub trait Actuator: Send {
    /// Set motor speed (signed, negative reverses) and steering in `[-100, 100]`.
    fn set_movement(&mut self, motor_speed: f32, steering_percent: f32) -> Result<()>;
}

/// Camera color filter.
///
/// Maps a frame to the bearings of red and green blobs within the camera's
/// field of view.
pub trait ColorFilter: Send {
    fn blob_bearings(&mut self, frame: &CameraFrame) -> Vec<BlobBearing>;
}
