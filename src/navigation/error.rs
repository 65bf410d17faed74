//! Navigation controller errors.

use thiserror::Error;

use super::state::NavState;

/// Navigation controller fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// The instant-update loop kept transitioning without settling.
    #[error("runaway transitions: still moving after {iterations} steps in {state}")]
    RunawayTransitions { state: NavState, iterations: usize },

    /// `tick` was called before the lap direction was known.
    #[error("controller not started")]
    NotStarted,
}
