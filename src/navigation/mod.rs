//! Navigation state machine.
//!
//! - [`NavConfig`]: thresholds and choreography tables, with presets per
//!   arena challenge
//! - [`step`]: pure evaluation of one state
//! - [`NavController`]: per-tick driver with the instant-update loop and
//!   the heading and wall PIDs
//! - [`RunContext`]: stop flag and state-local timers

pub mod config;
mod context;
mod controller;
mod error;
pub mod lane;
mod state;
pub mod steering;
mod transition;

pub use config::{FinishMode, NavConfig, PerRotation, StartMode};
pub use context::RunContext;
pub use controller::{DriveOutput, MAX_INSTANT_STEPS, NavController};
pub use error::NavError;
pub use lane::Lane;
pub use state::{Command, NavState, Navigation, ParkingPhase, Steering, UturnPhase};
pub use transition::{Step, TickInputs, select_parking_wall, step, turn_trigger_distance};
