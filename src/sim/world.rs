//! Kinematic robot in the simulated arena, plus the collaborators and
//! producer threads that connect it to the control loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{info, warn};
use parking_lot::Mutex;

use crate::core::math::{deg_to_rad, rad_to_deg, wrap_degrees};
use crate::core::{Clock, Point2D};
use crate::error::Result;
use crate::robot::SensorBuffers;
use crate::sensors::{
    Actuator, BlobBearing, CameraFrame, ColorFilter, LidarSample, LidarScan, MotionSample,
};

use super::arena::{Arena, SimPose};
use super::noise::NoiseGenerator;

/// Simulation parameters.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// 0 = random each run
    pub seed: u64,
    /// Ground speed per unit of motor speed (m/s)
    pub speed_scale: f32,
    pub wheelbase: f32,
    /// Wheel angle at ±100 % steering (degrees)
    pub max_steer_deg: f32,
    pub wheel_diameter: f32,
    pub lidar_samples: usize,
    pub lidar_max_range: f32,
    pub range_noise: f32,
    /// Fraction of LiDAR returns dropped
    pub dropout: f32,
    pub heading_noise: f32,
    /// Camera position ahead of the robot center (meters)
    pub camera_offset: f32,
    pub camera_fov_deg: f32,
    pub camera_range: f32,
    pub bearing_noise: f32,
    pub lidar_hz: f32,
    pub motion_hz: f32,
    pub camera_hz: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            speed_scale: 0.1,
            wheelbase: 0.14,
            max_steer_deg: 30.0,
            wheel_diameter: 0.055,
            lidar_samples: 720,
            lidar_max_range: 8.0,
            range_noise: 0.005,
            dropout: 0.01,
            heading_noise: 0.1,
            camera_offset: 0.15,
            camera_fov_deg: 60.0,
            camera_range: 2.5,
            bearing_noise: 0.3,
            lidar_hz: 10.0,
            motion_hz: 120.0,
            camera_hz: 30.0,
        }
    }
}

/// Robot state in the arena.
#[derive(Debug)]
pub struct SimWorld {
    arena: Arena,
    config: SimConfig,
    pose: SimPose,
    encoder_deg: f32,
    motor_speed: f32,
    steering: f32,
    noise: NoiseGenerator,
}

/// World shared between producers and collaborators.
pub type SharedWorld = Arc<Mutex<SimWorld>>;

impl SimWorld {
    pub fn new(arena: Arena, start: SimPose, config: SimConfig) -> Self {
        let noise = NoiseGenerator::new(config.seed);
        Self {
            arena,
            config,
            pose: start,
            encoder_deg: 0.0,
            motor_speed: 0.0,
            steering: 0.0,
            noise,
        }
    }

    pub fn shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn pose(&self) -> SimPose {
        self.pose
    }

    pub fn command(&self) -> (f32, f32) {
        (self.motor_speed, self.steering)
    }

    pub fn set_command(&mut self, motor_speed: f32, steering: f32) {
        self.motor_speed = motor_speed;
        self.steering = steering.clamp(-100.0, 100.0);
    }

    /// Advance the bicycle model by `dt` seconds. Walls do not stop the
    /// robot.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let v = self.motor_speed * self.config.speed_scale;
        let steer = deg_to_rad(self.steering / 100.0 * self.config.max_steer_deg);
        let yaw_rate = rad_to_deg(v / self.config.wheelbase * steer.tan());

        // Integrate at the midpoint heading
        let mid = self.pose.heading + yaw_rate * dt / 2.0;
        let distance = v * dt;
        self.pose.position = self.pose.position + SimPose::compass(mid) * distance;
        self.pose.heading = wrap_degrees(self.pose.heading + yaw_rate * dt);
        self.encoder_deg += distance / (std::f32::consts::PI * self.config.wheel_diameter) * 360.0;
    }

    /// Motion sample as the motor controller would report it.
    pub fn motion(&mut self) -> MotionSample {
        let heading = wrap_degrees(self.pose.heading + self.noise.gaussian(self.config.heading_noise));
        MotionSample::new(heading, self.encoder_deg)
    }

    /// One LiDAR revolution; angles clockwise from forward.
    pub fn scan(&mut self) -> LidarScan {
        let n = self.config.lidar_samples.max(1);
        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            if self.noise.chance(self.config.dropout) {
                continue;
            }
            let angle = i as f32 * 360.0 / n as f32;
            let direction = SimPose::compass(self.pose.heading + angle);
            let Some(hit) = self
                .arena
                .raycast(self.pose.position, direction, self.config.lidar_max_range)
            else {
                continue;
            };
            let distance = (hit + self.noise.gaussian(self.config.range_noise)).max(0.0);
            samples.push(LidarSample::new(angle, distance, 200));
        }
        LidarScan::new(samples)
    }

    /// Bearings of the markers the camera can see.
    pub fn blob_bearings(&mut self) -> Vec<BlobBearing> {
        let camera_local = Point2D::new(0.0, self.config.camera_offset);
        let camera = self.pose.to_world(camera_local);
        let half_fov = self.config.camera_fov_deg / 2.0;

        let mut bearings = Vec::new();
        for marker in self.arena.markers().to_vec() {
            let ray = self.pose.to_local(marker.position) - camera_local;
            let distance = ray.length();
            let bearing = rad_to_deg(ray.x.atan2(ray.y));
            if bearing.abs() > half_fov || distance > self.config.camera_range || distance <= 0.0 {
                continue;
            }

            let world_dir = (marker.position - camera).normalize();
            let visible = self
                .arena
                .raycast(camera, world_dir, distance + 0.1)
                .is_some_and(|hit| hit >= distance - 0.05);
            if visible {
                let noisy = bearing + self.noise.gaussian(self.config.bearing_noise);
                bearings.push(BlobBearing::new(noisy, marker.color));
            }
        }
        bearings
    }
}

/// Drive train writing into the simulated world.
pub struct SimActuator {
    world: SharedWorld,
}

impl SimActuator {
    pub fn new(world: SharedWorld) -> Self {
        Self { world }
    }
}

impl Actuator for SimActuator {
    fn set_movement(&mut self, motor_speed: f32, steering_percent: f32) -> Result<()> {
        self.world.lock().set_command(motor_speed, steering_percent);
        Ok(())
    }
}

/// Color filter that reads marker bearings from the simulated world
/// instead of decoding the frame.
pub struct GroundTruthFilter {
    world: SharedWorld,
}

impl GroundTruthFilter {
    pub fn new(world: SharedWorld) -> Self {
        Self { world }
    }
}

impl ColorFilter for GroundTruthFilter {
    fn blob_bearings(&mut self, _frame: &CameraFrame) -> Vec<BlobBearing> {
        self.world.lock().blob_bearings()
    }
}

/// Producer threads feeding the sample buffers.
pub struct SimProducers {
    handles: Vec<JoinHandle<()>>,
}

impl SimProducers {
    /// Start the motion, LiDAR and camera producers. They run until `stop`
    /// is set.
    pub fn spawn(
        world: SharedWorld,
        buffers: &SensorBuffers,
        clock: Clock,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let config = world.lock().config.clone();
        let mut handles = Vec::with_capacity(3);

        {
            let world = Arc::clone(&world);
            let buffer = Arc::clone(&buffers.motion);
            let stop = Arc::clone(&stop);
            let period = period_of(config.motion_hz);
            handles.push(
                std::thread::Builder::new()
                    .name("sim-motion".into())
                    .spawn(move || {
                        let mut last = Instant::now();
                        while !stop.load(Ordering::Relaxed) {
                            std::thread::sleep(period);
                            let now = Instant::now();
                            let dt = now.duration_since(last).as_secs_f32();
                            last = now;
                            let sample = {
                                let mut w = world.lock();
                                w.step(dt);
                                w.motion()
                            };
                            buffer.push(clock.stamp(sample));
                        }
                    })?,
            );
        }

        {
            let world = Arc::clone(&world);
            let buffer = Arc::clone(&buffers.lidar);
            let stop = Arc::clone(&stop);
            let period = period_of(config.lidar_hz);
            handles.push(
                std::thread::Builder::new()
                    .name("sim-lidar".into())
                    .spawn(move || {
                        while !stop.load(Ordering::Relaxed) {
                            std::thread::sleep(period);
                            let scan = world.lock().scan();
                            buffer.push(clock.stamp(scan));
                        }
                    })?,
            );
        }

        {
            let buffer = Arc::clone(&buffers.camera);
            let stop = Arc::clone(&stop);
            let period = period_of(config.camera_hz);
            handles.push(
                std::thread::Builder::new()
                    .name("sim-camera".into())
                    .spawn(move || {
                        while !stop.load(Ordering::Relaxed) {
                            std::thread::sleep(period);
                            buffer.push(clock.stamp(CameraFrame::empty()));
                        }
                    })?,
            );
        }

        info!(
            "[Sim] Producers running: motion {} Hz, LiDAR {} Hz, camera {} Hz",
            config.motion_hz, config.lidar_hz, config.camera_hz
        );
        Ok(Self { handles })
    }

    /// Wait for every producer to exit.
    pub fn join(self) {
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("sim").to_string();
            if handle.join().is_err() {
                warn!("[Sim] Producer {} panicked", name);
            }
        }
    }
}

fn period_of(hz: f32) -> Duration {
    Duration::from_secs_f32(1.0 / hz.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MarkerColor, RotationDirection};
    use approx::assert_relative_eq;

    fn quiet() -> SimConfig {
        SimConfig {
            range_noise: 0.0,
            dropout: 0.0,
            heading_noise: 0.0,
            bearing_noise: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_straight_drive_and_encoder() {
        let arena = Arena::standard();
        let start = arena.start_pose(RotationDirection::Clockwise);
        let mut world = SimWorld::new(arena, start, quiet());
        world.set_command(2.0, 0.0);
        for _ in 0..10 {
            world.step(0.1);
        }

        // 0.2 m/s for one second
        assert_relative_eq!(world.pose().position.y, start.position.y + 0.2, epsilon = 1e-4);
        assert_relative_eq!(world.pose().position.x, start.position.x, epsilon = 1e-5);
        let expected = 0.2 / (std::f32::consts::PI * 0.055) * 360.0;
        assert_relative_eq!(world.motion().encoder_angle_deg, expected, epsilon = 1e-2);
    }

    #[test]
    fn test_positive_steering_turns_clockwise() {
        let arena = Arena::standard();
        let mut world = SimWorld::new(arena, SimPose::new(1.5, 0.5, 0.0), quiet());
        world.set_command(3.0, 100.0);
        world.step(0.5);
        let heading = world.pose().heading;
        assert!(heading > 0.0 && heading < 180.0);
    }

    #[test]
    fn test_scan_sees_walls() {
        let arena = Arena::standard();
        let mut world = SimWorld::new(arena, SimPose::new(0.5, 1.0, 0.0), quiet());
        let scan = world.scan();
        assert_eq!(scan.len(), 720);
        // Ahead: north wall 2 m away; left: west wall 0.5 m away
        assert_relative_eq!(scan.samples[0].distance_m, 2.0, epsilon = 1e-4);
        assert_relative_eq!(scan.samples[540].distance_m, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_camera_sees_marker_ahead() {
        let arena = Arena::standard().with_marker(0.7, 2.0, MarkerColor::Green);
        let mut world = SimWorld::new(arena, SimPose::new(0.5, 1.0, 0.0), quiet());
        let blobs = world.blob_bearings();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].color, MarkerColor::Green);
        // Right of the camera axis
        assert!(blobs[0].bearing_deg > 0.0);

        let mut behind = SimWorld::new(
            Arena::standard().with_marker(0.5, 0.3, MarkerColor::Red),
            SimPose::new(0.5, 1.0, 0.0),
            quiet(),
        );
        assert!(behind.blob_bearings().is_empty());
    }
}
