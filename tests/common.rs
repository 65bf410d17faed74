//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use pathik::core::{Point2D, Timestamped};
use pathik::geometry::{LineSegment, ResolvedWalls};
use pathik::io::LogSink;
use pathik::sensors::{LidarScan, MotionSample};
use pathik::sim::{Arena, SimConfig, SimPose, SimWorld};

/// Simulation without sensor noise.
pub fn quiet_sim() -> SimConfig {
    SimConfig {
        seed: 1,
        range_noise: 0.0,
        dropout: 0.0,
        heading_noise: 0.0,
        bearing_noise: 0.0,
        ..Default::default()
    }
}

/// Noise-free world in the standard arena.
pub fn quiet_world(pose: SimPose) -> SimWorld {
    SimWorld::new(Arena::standard(), pose, quiet_sim())
}

/// One noise-free scan of the standard arena from `pose`.
pub fn scan_at(pose: SimPose) -> LidarScan {
    quiet_world(pose).scan()
}

pub fn seg(x1: f32, y1: f32, x2: f32, y2: f32) -> LineSegment {
    LineSegment::new(Point2D::new(x1, y1), Point2D::new(x2, y2))
}

/// Front wall `front` meters ahead and a side wall at `x = side` (negative
/// is left of the robot).
pub fn corridor(front: f32, side: f32) -> ResolvedWalls {
    let wall = seg(side, -1.0, side, 1.5);
    ResolvedWalls {
        front: Some(seg(-1.5, front, 1.5, front)),
        left: (side < 0.0).then_some(wall),
        right: (side > 0.0).then_some(wall),
        ..Default::default()
    }
}

/// Motion samples every `step_ms` with a constant heading and encoder rate.
pub fn motion_history(
    count: usize,
    step_ms: u64,
    heading: f32,
    encoder_per_step: f32,
) -> Vec<Timestamped<MotionSample>> {
    (0..count)
        .map(|i| {
            Timestamped::new(
                MotionSample::new(heading, i as f32 * encoder_per_step),
                i as u64 * step_ms * 1_000,
            )
        })
        .collect()
}

/// Log sink that keeps records in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    pub records: Arc<Mutex<Vec<(u64, Vec<u8>)>>>,
}

impl LogSink for MemorySink {
    fn write_record(&mut self, timestamp_ns: u64, payload: &[u8]) -> pathik::Result<()> {
        self.records.lock().push((timestamp_ns, payload.to_vec()));
        Ok(())
    }
}
