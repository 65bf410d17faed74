//! Per-tick orchestration.
//!
//! [`Robot::update`] is the single entry point of the control loop. Each
//! call snapshots the three sample buffers, runs the geometry engine, the
//! pose estimator and marker fusion, ticks the navigation controller and
//! sends exactly one command to the actuator.

mod perception;
mod telemetry;

pub use perception::{Perception, infer_rotation, perceive};
pub use telemetry::TickRecord;

use std::sync::Arc;

use log::{debug, info, trace};

use crate::config::{PathikConfig, RuntimeConfig};
use crate::core::math::wrap_degrees;
use crate::core::{Clock, Direction, MarkerKey, RotationDirection, Segment, Timestamped};
use crate::error::Result;
use crate::fusion::{MarkerFusion, PoseEstimator, sync_camera_lidar};
use crate::geometry::{LidarGeometry, ResolvedWalls};
use crate::io::LogSink;
use crate::navigation::{DriveOutput, NavController, RunContext, TickInputs};
use crate::sensors::{Actuator, CameraFrame, ColorFilter, LidarScan, MotionSample, SampleBuffer};

/// The three producer buffers.
#[derive(Clone)]
pub struct SensorBuffers {
    pub lidar: Arc<SampleBuffer<LidarScan>>,
    pub motion: Arc<SampleBuffer<MotionSample>>,
    pub camera: Arc<SampleBuffer<CameraFrame>>,
}

impl SensorBuffers {
    pub fn new(lidar: usize, motion: usize, camera: usize) -> Self {
        Self {
            lidar: Arc::new(SampleBuffer::new(lidar)),
            motion: Arc::new(SampleBuffer::new(motion)),
            camera: Arc::new(SampleBuffer::new(camera)),
        }
    }

    pub fn from_config(runtime: &RuntimeConfig) -> Self {
        Self::new(
            runtime.lidar_capacity,
            runtime.motion_capacity,
            runtime.camera_capacity,
        )
    }

    /// Control proceeds only once every buffer is full.
    pub fn ready(&self) -> bool {
        self.lidar.is_full() && self.motion.is_full() && self.camera.is_full()
    }
}

/// External collaborators of the control loop.
pub struct Collaborators {
    pub actuator: Box<dyn Actuator>,
    pub color_filter: Box<dyn ColorFilter>,
    pub logger: Box<dyn LogSink>,
}

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Buffers still filling; zero output
    Waiting,
    /// Lap direction not yet inferred; zero output
    Calibrating,
    /// Controller ran
    Drove(DriveOutput),
}

impl TickOutcome {
    pub fn terminated(&self) -> bool {
        matches!(self, TickOutcome::Drove(out) if out.terminated)
    }
}

/// Perception, fusion and navigation bound to their collaborators.
pub struct Robot {
    buffers: SensorBuffers,
    clock: Clock,
    geometry: LidarGeometry,
    pose: PoseEstimator,
    fusion: MarkerFusion,
    controller: NavController,
    collaborators: Collaborators,
    camera_delay_us: i64,
    initial_heading: Option<f32>,
    last_walls: ResolvedWalls,
}

impl Robot {
    pub fn new(
        config: &PathikConfig,
        buffers: SensorBuffers,
        clock: Clock,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            buffers,
            clock,
            geometry: LidarGeometry::new(config.geometry.clone()),
            pose: PoseEstimator::new(config.fusion.pose.clone()),
            fusion: MarkerFusion::new(&config.fusion),
            controller: NavController::new(config.navigation.clone()),
            collaborators,
            camera_delay_us: config.fusion.camera_delay_ms.saturating_mul(1_000),
            initial_heading: None,
            last_walls: ResolvedWalls::default(),
        }
    }

    pub fn controller(&self) -> &NavController {
        &self.controller
    }

    pub fn fusion(&self) -> &MarkerFusion {
        &self.fusion
    }

    /// Walls resolved on the last driving tick.
    pub fn walls(&self) -> &ResolvedWalls {
        &self.last_walls
    }

    /// Command neutral output.
    pub fn halt(&mut self) -> Result<()> {
        self.collaborators.actuator.set_movement(0.0, 0.0)
    }

    /// Run one control tick of `dt` seconds.
    pub fn update(&mut self, dt: f32, ctx: &mut RunContext) -> Result<TickOutcome> {
        if !self.buffers.ready() {
            self.halt()?;
            return Ok(TickOutcome::Waiting);
        }

        let scans = self.buffers.lidar.snapshot();
        let motions = self.buffers.motion.snapshot();
        let frames = self.buffers.camera.snapshot();
        let (Some(scan), Some(motion), Some(frame)) = (scans.last(), motions.last(), frames.last())
        else {
            self.halt()?;
            return Ok(TickOutcome::Waiting);
        };

        let now_us = self.clock.now_us();
        let record = TickRecord {
            scan_ns: scan.timestamp_ns(),
            motion_ns: motion.timestamp_ns(),
            frame_ns: frame.timestamp_ns(),
        };
        self.collaborators
            .logger
            .write_record(now_us.saturating_mul(1_000), &record.encode())?;

        let initial = *self.initial_heading.get_or_insert(motion.data.heading_deg);
        let heading = wrap_degrees(motion.data.heading_deg - initial);
        let encoder_deg = motion.data.encoder_angle_deg;
        let now_ms = now_us / 1_000;
        let delta = self.pose.estimate(scan.timestamp_us, &motions);

        if !self.controller.is_started() {
            match infer_rotation(&self.geometry, &scan.data, &delta, heading) {
                Some(rotation) => self.controller.start(rotation, ctx, now_ms, encoder_deg),
                None => {
                    trace!("[Robot] Lap direction inconclusive");
                    self.halt()?;
                    return Ok(TickOutcome::Calibrating);
                }
            }
        }

        let (direction, rotation) = self
            .controller
            .navigation()
            .map(|n| (n.direction, n.rotation))
            .unwrap_or((Direction::North, RotationDirection::Clockwise));

        let perception = perceive(&self.geometry, &scan.data, &delta, direction, heading);
        self.last_walls = perception.walls;

        let heading_rate = self.pose.heading_rate(&motions);
        if self.fusion.accepts(!self.controller.fusing(), heading_rate) {
            let committed = self.fuse(&scans, &frames, &motions, &perception.walls, direction, rotation);
            if !committed.is_empty() {
                debug!(
                    "[Robot] Marker map has {} entries after {:?}",
                    self.fusion.map().len(),
                    committed
                );
            }
        }

        let inputs = TickInputs {
            now_ms,
            heading,
            encoder_deg,
            walls: perception.walls,
            parking_walls: &perception.parking_walls,
            markers: self.fusion.map(),
        };
        let output = match self.controller.tick(ctx, &inputs, dt) {
            Ok(output) => output,
            Err(e) => {
                self.collaborators.actuator.set_movement(0.0, 0.0)?;
                return Err(e.into());
            }
        };

        self.collaborators
            .actuator
            .set_movement(output.motor_speed, output.steering)?;
        if output.terminated {
            info!("[Robot] Run finished");
            self.collaborators.logger.flush()?;
        }
        Ok(TickOutcome::Drove(output))
    }

    /// Pair the newest frame with its scan and fuse the blobs into the map.
    fn fuse(
        &mut self,
        scans: &[Arc<Timestamped<LidarScan>>],
        frames: &[Arc<Timestamped<CameraFrame>>],
        motions: &[Arc<Timestamped<MotionSample>>],
        walls: &ResolvedWalls,
        direction: Direction,
        rotation: RotationDirection,
    ) -> Vec<MarkerKey> {
        let Some(synced) = sync_camera_lidar(frames, scans, self.camera_delay_us) else {
            return Vec::new();
        };

        let delta = self.pose.estimate(synced.scan.timestamp_us, motions);
        let points = self.geometry.points(&synced.scan.data, &delta);
        let candidates = self.geometry.marker_candidates(&points, walls, Some(rotation));
        let bearings = self.collaborators.color_filter.blob_bearings(&synced.frame.data);
        trace!(
            "[Robot] {} candidates, {} blobs",
            candidates.len(),
            bearings.len()
        );

        self.fusion.process(
            &candidates,
            &bearings,
            walls,
            rotation,
            Segment::from_direction(direction),
        )
    }
}
