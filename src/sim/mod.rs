//! Simulated arena, robot and sensors for running the control loop without
//! hardware.
//!
//! The world is a kinematic bicycle model inside a square ring of walls.
//! Producer threads sample it at the motion, LiDAR and camera rates and push
//! into the same [`SensorBuffers`](crate::robot::SensorBuffers) the hardware
//! producers would fill.

mod arena;
mod noise;
mod world;

pub use arena::{Arena, SimMarker, SimPose};
pub use noise::NoiseGenerator;
pub use world::{
    GroundTruthFilter, SharedWorld, SimActuator, SimConfig, SimProducers, SimWorld,
};
