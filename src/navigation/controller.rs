//! Navigation controller.
//!
//! Drives the state machine once per control tick:
//!
//! 1. Honor an external stop request by forcing STOP
//! 2. Evaluate the current state; while the result is an instant
//!    transition, evaluate the new state within the same tick
//! 3. Configure the heading and wall PIDs for the settled state
//! 4. Turn the command into motor speed and steering percent
//!
//! The instant loop is bounded by [`MAX_INSTANT_STEPS`]. Exceeding it means
//! the tables form a cycle that never settles, which is reported as
//! [`NavError::RunawayTransitions`].

use log::{debug, info, warn};

use crate::control::PidController;
use crate::core::RotationDirection;

use super::config::{NavConfig, StartMode};
use super::context::RunContext;
use super::error::NavError;
use super::state::{Command, NavState, Navigation, Steering};
use super::steering::{blend_heading_error, heading_error, wall_error};
use super::transition::{Step, TickInputs, step};

/// Upper bound on state evaluations per tick.
pub const MAX_INSTANT_STEPS: usize = 32;

/// Actuator output of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveOutput {
    pub motor_speed: f32,
    /// Steering percent in `[-100, 100]`, positive to the right
    pub steering: f32,
    /// State the tick settled in
    pub state: NavState,
    /// Run is over; the caller should leave its loop
    pub terminated: bool,
}

impl DriveOutput {
    fn halt(state: NavState) -> Self {
        Self {
            motor_speed: 0.0,
            steering: 0.0,
            state,
            terminated: state.is_terminal(),
        }
    }
}

/// State machine plus its two PID loops.
#[derive(Debug)]
pub struct NavController {
    config: NavConfig,
    nav: Option<Navigation>,
    heading_pid: PidController,
    wall_pid: PidController,
}

impl NavController {
    pub fn new(config: NavConfig) -> Self {
        let heading_pid = PidController::new(config.pid.heading);
        let wall_pid = PidController::new(config.pid.wall);
        Self {
            config,
            nav: None,
            heading_pid,
            wall_pid,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Enter the configured start state once the lap direction is known.
    pub fn start(
        &mut self,
        rotation: RotationDirection,
        ctx: &mut RunContext,
        now_ms: u64,
        encoder_deg: f32,
    ) {
        let state = match self.config.start {
            StartMode::Unpark => NavState::Unpark { step: 0 },
            StartMode::Drive => NavState::Normal,
        };
        info!("[Nav] Starting {} lap in {}", rotation, state);

        ctx.enter(state, now_ms, encoder_deg);
        self.heading_pid.reset();
        self.wall_pid.reset();
        self.nav = Some(Navigation::new(
            state,
            rotation,
            self.config.lanes.offsets.base,
        ));
    }

    pub fn is_started(&self) -> bool {
        self.nav.is_some()
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        self.nav.as_ref()
    }

    pub fn state(&self) -> Option<NavState> {
        self.nav.as_ref().map(|n| n.state)
    }

    pub fn is_terminated(&self) -> bool {
        self.state().is_some_and(|s| s.is_terminal())
    }

    /// Whether marker observations may be fused this tick.
    pub fn fusing(&self) -> bool {
        self.nav
            .as_ref()
            .is_some_and(|n| n.wall_following() && !n.state.is_open_loop())
    }

    /// Run one control tick.
    pub fn tick(
        &mut self,
        ctx: &mut RunContext,
        inputs: &TickInputs<'_>,
        dt: f32,
    ) -> Result<DriveOutput, NavError> {
        let Some(mut nav) = self.nav.take() else {
            return Err(NavError::NotStarted);
        };

        if ctx.stop_requested() && !nav.state.is_terminal() {
            warn!("[Nav] Stop requested in {}", nav.state);
            nav = nav.to(NavState::Stop);
            ctx.enter(NavState::Stop, inputs.now_ms, inputs.encoder_deg);
        }

        let result = self.settle(nav, ctx, inputs);
        let (nav, command) = match result {
            Ok(settled) => settled,
            Err((nav, err)) => {
                self.nav = Some(nav);
                return Err(err);
            }
        };

        let output = if nav.state.is_terminal() {
            ctx.request_stop();
            DriveOutput::halt(nav.state)
        } else {
            let steering = self.steer(&nav, &command, inputs, dt);
            DriveOutput {
                motor_speed: command.motor_speed,
                steering,
                state: nav.state,
                terminated: false,
            }
        };

        self.nav = Some(nav);
        Ok(output)
    }

    /// Evaluate states until one settles or the guard trips.
    fn settle(
        &self,
        mut nav: Navigation,
        ctx: &mut RunContext,
        inputs: &TickInputs<'_>,
    ) -> Result<(Navigation, Command), (Navigation, NavError)> {
        for _ in 0..MAX_INSTANT_STEPS {
            let Step {
                next,
                command,
                instant,
            } = step(&nav, inputs, ctx, &self.config);

            if next.state != nav.state {
                info!(
                    "[Nav] {} -> {} (turn {}, heading {:.1}°)",
                    nav.state, next.state, next.turn_count, inputs.heading
                );
                ctx.enter(next.state, inputs.now_ms, inputs.encoder_deg);
            }
            nav = next;

            if !instant {
                return Ok((nav, command));
            }
        }

        let state = nav.state;
        Err((
            nav,
            NavError::RunawayTransitions {
                state,
                iterations: MAX_INSTANT_STEPS,
            },
        ))
    }

    /// Steering percent for the settled command.
    fn steer(&mut self, nav: &Navigation, command: &Command, inputs: &TickInputs<'_>, dt: f32) -> f32 {
        if let Steering::Fixed(percent) = command.steering {
            return percent;
        }

        let pid = &self.config.pid;
        let wall_active = nav.wall_following();
        self.wall_pid.set_active(wall_active);
        self.wall_pid.set_kp(if nav.wall_boosted() {
            pid.boosted_wall_kp
        } else {
            pid.wall.kp
        });
        self.heading_pid.set_kp(if nav.heading_boosted() {
            pid.boosted_heading_kp
        } else {
            pid.heading.kp
        });

        let reversing = command.motor_speed < 0.0;
        let wall_err = wall_error(&inputs.walls, nav.rotation, nav.target_offset);
        let correction = self.wall_pid.update(wall_err, dt);
        let heading_err = heading_error(nav.direction.to_heading(), inputs.heading);
        let error = blend_heading_error(heading_err, correction, nav.rotation, wall_active, reversing);
        let steering = self.heading_pid.update(error, dt);

        debug!(
            "[Nav] heading_err={:.1} wall_err={:.3} correction={:.1} steering={:.1}",
            heading_err, wall_err, correction, steering
        );
        steering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, Point2D};
    use crate::fusion::MarkerMap;
    use crate::geometry::{LineSegment, ResolvedWalls};
    use approx::assert_relative_eq;

    fn walls(front: f32, left: f32) -> ResolvedWalls {
        ResolvedWalls {
            front: Some(LineSegment::new(Point2D::new(-1.0, front), Point2D::new(1.0, front))),
            left: Some(LineSegment::new(Point2D::new(-left, -1.0), Point2D::new(-left, 1.0))),
            ..Default::default()
        }
    }

    fn inputs<'a>(walls: ResolvedWalls, markers: &'a MarkerMap, now_ms: u64, heading: f32) -> TickInputs<'a> {
        TickInputs {
            now_ms,
            heading,
            encoder_deg: 0.0,
            walls,
            parking_walls: &[],
            markers,
        }
    }

    #[test]
    fn test_tick_before_start() {
        let mut controller = NavController::new(NavConfig::open());
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        let err = controller
            .tick(&mut ctx, &inputs(ResolvedWalls::default(), &markers, 0, 0.0), 0.033)
            .unwrap_err();
        assert_eq!(err, NavError::NotStarted);
    }

    #[test]
    fn test_open_start_drives() {
        let mut controller = NavController::new(NavConfig::open());
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        controller.start(RotationDirection::Clockwise, &mut ctx, 0, 0.0);
        assert_eq!(controller.state(), Some(NavState::Normal));

        let out = controller
            .tick(&mut ctx, &inputs(walls(2.5, 0.30), &markers, 16, 0.0), 0.016)
            .unwrap();
        assert_relative_eq!(out.motor_speed, 4.5);
        assert_relative_eq!(out.steering, 0.0, epsilon = 1e-4);
        assert!(!out.terminated);
    }

    #[test]
    fn test_wall_error_steers_toward_outer_wall() {
        let mut controller = NavController::new(NavConfig::open());
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        controller.start(RotationDirection::Clockwise, &mut ctx, 0, 0.0);

        // Outer wall on the left is too far: steer left
        let out = controller
            .tick(&mut ctx, &inputs(walls(2.5, 0.40), &markers, 16, 0.0), 0.016)
            .unwrap();
        assert!(out.steering < 0.0);
    }

    #[test]
    fn test_single_tick_crosses_states() {
        let mut controller = NavController::new(NavConfig::open());
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        controller.start(RotationDirection::Clockwise, &mut ctx, 0, 0.0);

        // Front wall already inside both the pre-turn and turn distances
        let out = controller
            .tick(&mut ctx, &inputs(walls(0.6, 0.30), &markers, 16, 0.0), 0.016)
            .unwrap();
        assert_eq!(out.state, NavState::Turning);
        let nav = controller.navigation().unwrap();
        assert_eq!(nav.direction, Direction::East);
        assert_eq!(ctx.elapsed_ms(NavState::Turning, 16), Some(0));
    }

    #[test]
    fn test_stop_request_forces_stop() {
        let mut controller = NavController::new(NavConfig::obstacle());
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        controller.start(RotationDirection::CounterClockwise, &mut ctx, 0, 0.0);
        ctx.request_stop();

        let out = controller
            .tick(&mut ctx, &inputs(walls(2.5, 0.30), &markers, 16, 0.0), 0.016)
            .unwrap();
        assert_eq!(out, DriveOutput::halt(NavState::Stop));
        assert!(out.terminated);
        assert!(controller.is_terminated());
    }

    #[test]
    fn test_runaway_guard() {
        let mut config = NavConfig::open();
        config.turn.cooldown_ms = 0;
        config.turn.push_cooldown_ms = 0;
        config.turn.heading_tolerance = 180.0;
        config.final_turn_count = 1_000;

        let mut controller = NavController::new(config);
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        controller.start(RotationDirection::Clockwise, &mut ctx, 0, 0.0);

        let err = controller
            .tick(&mut ctx, &inputs(walls(0.3, 0.30), &markers, 16, 0.0), 0.016)
            .unwrap_err();
        assert!(matches!(
            err,
            NavError::RunawayTransitions {
                iterations: MAX_INSTANT_STEPS,
                ..
            }
        ));
        assert!(controller.is_started());
    }

    #[test]
    fn test_unpark_is_open_loop() {
        let mut controller = NavController::new(NavConfig::obstacle());
        let markers = MarkerMap::default();
        let mut ctx = RunContext::new();
        controller.start(RotationDirection::Clockwise, &mut ctx, 0, 0.0);
        assert!(!controller.fusing());

        let out = controller
            .tick(&mut ctx, &inputs(walls(2.5, 0.30), &markers, 16, 10.0), 0.033)
            .unwrap();
        assert_eq!(out.state, NavState::Unpark { step: 0 });
        assert_relative_eq!(out.motor_speed, 1.5);
        assert_relative_eq!(out.steering, 100.0);
    }
}
