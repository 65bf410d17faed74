//! Core types shared by every layer: points, angle math, arena enums and timestamps.

pub mod arena;
pub mod math;
mod point;
mod pose;
mod timestamped;

pub use arena::{
    Direction, MarkerColor, MarkerKey, RelativeSide, RotationDirection, Segment,
    SegmentLocation, WallSide,
};
pub use point::Point2D;
pub use pose::DeltaPose;
pub use timestamped::{Clock, Timestamped};
