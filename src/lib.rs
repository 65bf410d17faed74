//! Pathik - perception and control core for a wall-following arena robot
//!
//! Each control tick turns the newest LiDAR scan, motion samples and camera
//! frame into one drive command:
//!
//! - [`geometry`]: scan to wall segments, lap direction, marker candidates
//! - [`fusion`]: dead reckoning, camera/LiDAR pairing and the debounced
//!   marker map
//! - [`navigation`]: the lap state machine with its steering law
//! - [`robot`]: per-tick orchestration over the sample buffers
//!
//! [`sim`] provides a simulated arena so the loop can run without hardware.

pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod fusion;
pub mod geometry;
pub mod io;
pub mod navigation;
pub mod robot;
pub mod sensors;
pub mod sim;

// Re-export commonly used types
pub use config::{Challenge, PathikConfig};
pub use error::{Error, Result};
pub use robot::{Robot, SensorBuffers, TickOutcome};
