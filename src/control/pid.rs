//! Clamped PID controller with an enable switch.

use serde::{Deserialize, Serialize};

/// PID gains and output limit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Output is clamped to `[-output_limit, output_limit]`
    pub output_limit: f32,
}

impl PidConfig {
    pub const fn new(kp: f32, ki: f32, kd: f32, output_limit: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_limit,
        }
    }

    /// Builder-style setter for the proportional gain.
    pub fn with_kp(mut self, kp: f32) -> Self {
        self.kp = kp;
        self
    }
}

/// PID controller.
///
/// An inactive controller outputs zero. Re-activating clears the integral
/// and derivative history so stale error from before the pause does not
/// kick the output.
#[derive(Clone, Debug)]
pub struct PidController {
    config: PidConfig,
    integral: f32,
    last_error: f32,
    active: bool,
}

impl PidController {
    /// New controller, active.
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            integral: 0.0,
            last_error: 0.0,
            active: true,
        }
    }

    /// Controller output for `error` after `dt` seconds.
    ///
    /// Zero while inactive or when `dt` is not positive.
    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        if !self.active || dt <= 0.0 {
            return 0.0;
        }

        self.integral += error * dt;
        let derivative = (error - self.last_error) / dt;
        self.last_error = error;

        let c = &self.config;
        (c.kp * error + c.ki * self.integral + c.kd * derivative)
            .clamp(-c.output_limit, c.output_limit)
    }

    /// Clear integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.reset();
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_kp(&mut self, kp: f32) {
        self.config.kp = kp;
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }
}
