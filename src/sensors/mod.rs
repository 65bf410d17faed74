//! Sensor samples, the bounded buffers producers push them into, and the
//! collaborator traits at the hardware boundary.

mod buffer;
mod traits;
mod types;

pub use buffer::SampleBuffer;
pub use traits::{Actuator, ColorFilter};
pub use types::{BlobBearing, CameraFrame, LidarSample, LidarScan, MotionSample};
