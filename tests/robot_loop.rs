//! One robot ticking against the simulated arena, with samples pushed by
//! hand instead of producer threads.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use pathik::config::{Challenge, PathikConfig};
use pathik::core::{Clock, RotationDirection};
use pathik::navigation::{NavState, RunContext};
use pathik::robot::{Collaborators, Robot, SensorBuffers, TickOutcome, TickRecord};
use pathik::sensors::CameraFrame;
use pathik::sim::{Arena, GroundTruthFilter, SharedWorld, SimActuator, SimWorld};

struct Rig {
    robot: Robot,
    world: SharedWorld,
    buffers: SensorBuffers,
    clock: Clock,
    sink: common::MemorySink,
}

fn build_rig(challenge: Challenge, rotation: RotationDirection) -> Rig {
    let config = PathikConfig::for_challenge(challenge);
    let arena = Arena::standard();
    let start = arena.start_pose(rotation);
    let world = SimWorld::new(arena, start, common::quiet_sim()).shared();

    let clock = Clock::new();
    let buffers = SensorBuffers::new(2, 2, 2);
    let sink = common::MemorySink::default();
    let collaborators = Collaborators {
        actuator: Box::new(SimActuator::new(Arc::clone(&world))),
        color_filter: Box::new(GroundTruthFilter::new(Arc::clone(&world))),
        logger: Box::new(sink.clone()),
    };
    let robot = Robot::new(&config, buffers.clone(), clock, collaborators);
    Rig {
        robot,
        world,
        buffers,
        clock,
        sink,
    }
}

impl Rig {
    fn push_samples(&self) {
        let (scan, motion) = {
            let mut world = self.world.lock();
            (world.scan(), world.motion())
        };
        self.buffers.lidar.push(self.clock.stamp(scan));
        self.buffers.motion.push(self.clock.stamp(motion));
        self.buffers.camera.push(self.clock.stamp(CameraFrame::empty()));
    }
}

#[test]
fn test_waits_for_full_buffers() {
    let mut rig = build_rig(Challenge::Open, RotationDirection::Clockwise);
    let mut ctx = RunContext::new();

    rig.push_samples();
    let outcome = rig.robot.update(0.016, &mut ctx).unwrap();
    assert_eq!(outcome, TickOutcome::Waiting);
    assert_eq!(rig.world.lock().command(), (0.0, 0.0));
    assert!(!rig.robot.controller().is_started());
    assert!(rig.sink.records.lock().is_empty());
}

#[test]
fn test_first_full_tick_starts_and_drives() {
    for rotation in [RotationDirection::Clockwise, RotationDirection::CounterClockwise] {
        let mut rig = build_rig(Challenge::Open, rotation);
        let mut ctx = RunContext::new();
        rig.push_samples();
        rig.push_samples();

        let outcome = rig.robot.update(0.016, &mut ctx).unwrap();
        let TickOutcome::Drove(out) = outcome else {
            panic!("expected a driving tick, got {:?}", outcome);
        };
        assert_eq!(out.state, NavState::Normal);
        assert_relative_eq!(out.motor_speed, 4.5);

        let nav = rig.robot.controller().navigation().unwrap();
        assert_eq!(nav.rotation, rotation);

        let (speed, steering) = rig.world.lock().command();
        assert_relative_eq!(speed, out.motor_speed);
        assert_relative_eq!(steering, out.steering.clamp(-100.0, 100.0));

        // Outer wall of the start straight is 0.5 m away
        let outer = rig.robot.walls().outer(rotation).unwrap();
        assert_relative_eq!(
            outer.perpendicular_distance(pathik::core::Point2D::ZERO),
            0.5,
            epsilon = 0.03
        );
    }
}

#[test]
fn test_obstacle_run_starts_by_unparking() {
    let mut rig = build_rig(Challenge::Obstacle, RotationDirection::Clockwise);
    let mut ctx = RunContext::new();
    rig.push_samples();
    rig.push_samples();

    let outcome = rig.robot.update(0.033, &mut ctx).unwrap();
    let TickOutcome::Drove(out) = outcome else {
        panic!("expected a driving tick, got {:?}", outcome);
    };
    assert_eq!(out.state, NavState::Unpark { step: 0 });
    assert!(!rig.robot.controller().fusing());
}

#[test]
fn test_every_full_tick_writes_one_record() {
    let mut rig = build_rig(Challenge::Open, RotationDirection::Clockwise);
    let mut ctx = RunContext::new();
    rig.push_samples();
    rig.push_samples();

    for _ in 0..3 {
        rig.robot.update(0.016, &mut ctx).unwrap();
        rig.push_samples();
    }

    let records = rig.sink.records.lock();
    assert_eq!(records.len(), 3);
    for (timestamp_ns, payload) in records.iter() {
        let record = TickRecord::decode(payload).unwrap();
        assert!(record.scan_ns <= *timestamp_ns);
        assert!(record.motion_ns <= *timestamp_ns);
        assert!(record.frame_ns <= *timestamp_ns);
    }
}

#[test]
fn test_stop_request_halts_the_robot() {
    let mut rig = build_rig(Challenge::Open, RotationDirection::Clockwise);
    let mut ctx = RunContext::new();
    rig.push_samples();
    rig.push_samples();
    rig.robot.update(0.016, &mut ctx).unwrap();

    ctx.request_stop();
    rig.push_samples();
    let outcome = rig.robot.update(0.016, &mut ctx).unwrap();
    assert!(outcome.terminated());
    assert_eq!(rig.world.lock().command(), (0.0, 0.0));
    assert!(rig.robot.controller().is_terminated());
}
