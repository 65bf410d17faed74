//! Feedback controllers.

mod pid;

pub use pid::{PidConfig, PidController};
