//! Split-and-Merge line extraction.
//!
//! 1. **Split phase**: walk the scan points in angular order, growing a
//!    running TLS fit. A point that deviates from the current fit by more
//!    than the split threshold, or that is too far from its predecessor,
//!    closes the current run and starts a new one.
//!
//! 2. **Merge phase**: any two segments with similar orientation and nearby
//!    endpoints are replaced by one fit over their combined support. This
//!    repeats until no pair qualifies, which also stitches together the wall
//!    that straddles the scan's 0°/360° seam.

mod algorithm;
mod config;
mod helpers;

pub use algorithm::{FittedSegment, extract_lines, merge_segments, split_points};
pub use config::SplitMergeConfig;
