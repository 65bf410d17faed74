//! Configuration loading for Pathik.
//!
//! Everything lives in one YAML file with defaults for every field, so a
//! partial file only overrides what it names.
//!
//! | Section | Description |
//! |---------|-------------|
//! | `geometry` | Scan filter, split/merge, wall buckets, parking walls, clustering |
//! | `fusion` | Wheel size, camera offset, association, classification, debounce |
//! | `navigation` | State machine tables ([`NavConfig`](crate::navigation::NavConfig)) |
//! | `runtime` | Tick period, buffer capacities, log directory |

mod error;
mod pathik;

pub use error::ConfigLoadError;
pub use pathik::{Challenge, DEFAULT_CONFIG_PATH, PathikConfig, RuntimeConfig};
