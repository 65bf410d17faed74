//! Arena vocabulary: cardinal directions, lap segments and marker identity.
//!
//! The arena is a square ring driven either clockwise or counter-clockwise.
//! The robot starts facing NORTH in segment A; each completed 90° turn moves
//! the intended heading one quarter in the rotation direction.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::math::wrap_degrees;

/// Intended cardinal heading of the robot (quantized, not measured).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Heading in degrees (NORTH = 0, clockwise).
    pub fn to_heading(self) -> f32 {
        self.index() as f32 * 90.0
    }

    /// Quantize a measured heading into ±45° bins.
    ///
    /// Lower bin edges are inclusive: 45° is EAST and 315° is NORTH.
    pub fn from_heading(heading: f32) -> Self {
        let h = wrap_degrees(heading);
        if !(45.0..315.0).contains(&h) {
            Direction::North
        } else if h < 135.0 {
            Direction::East
        } else if h < 225.0 {
            Direction::South
        } else {
            Direction::West
        }
    }

    /// Absolute direction of a side relative to this heading.
    pub fn from_relative_side(self, side: RelativeSide) -> Self {
        Self::from_index(self.index() + side.quarter_turns())
    }

    /// Direction after one 90° turn in `rotation`.
    pub fn turned(self, rotation: RotationDirection) -> Self {
        match rotation {
            RotationDirection::Clockwise => self.from_relative_side(RelativeSide::Right),
            RotationDirection::CounterClockwise => self.from_relative_side(RelativeSide::Left),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
        };
        f.write_str(name)
    }
}

/// Side relative to the robot's intended heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeSide {
    Front,
    Right,
    Back,
    Left,
}

impl RelativeSide {
    /// Clockwise quarter turns from the front.
    #[inline]
    pub fn quarter_turns(self) -> usize {
        match self {
            RelativeSide::Front => 0,
            RelativeSide::Right => 1,
            RelativeSide::Back => 2,
            RelativeSide::Left => 3,
        }
    }
}

/// Direction in which the robot laps the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// The opposite rotation.
    pub fn flipped(self) -> Self {
        match self {
            RotationDirection::Clockwise => RotationDirection::CounterClockwise,
            RotationDirection::CounterClockwise => RotationDirection::Clockwise,
        }
    }

    /// Heading sign of a turn: +1 clockwise, -1 counter-clockwise.
    pub fn turn_sign(self) -> f32 {
        match self {
            RotationDirection::Clockwise => 1.0,
            RotationDirection::CounterClockwise => -1.0,
        }
    }

    /// Side on which the outer arena wall lies.
    pub fn outer_side(self) -> RelativeSide {
        match self {
            RotationDirection::Clockwise => RelativeSide::Left,
            RotationDirection::CounterClockwise => RelativeSide::Right,
        }
    }

    /// Side on which the inner arena wall lies.
    pub fn inner_side(self) -> RelativeSide {
        match self {
            RotationDirection::Clockwise => RelativeSide::Right,
            RotationDirection::CounterClockwise => RelativeSide::Left,
        }
    }
}

impl fmt::Display for RotationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationDirection::Clockwise => f.write_str("CW"),
            RotationDirection::CounterClockwise => f.write_str("CCW"),
        }
    }
}

/// Quadrant of the lap. A is the start straight (NORTH).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    A,
    B,
    C,
    D,
}

impl Segment {
    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::North => Segment::A,
            Direction::East => Segment::B,
            Direction::South => Segment::C,
            Direction::West => Segment::D,
        }
    }

    pub fn to_direction(self) -> Direction {
        match self {
            Segment::A => Direction::North,
            Segment::B => Direction::East,
            Segment::C => Direction::South,
            Segment::D => Direction::West,
        }
    }

    pub fn from_heading(heading: f32) -> Self {
        Self::from_direction(Direction::from_heading(heading))
    }
}

/// Marker slot within a segment.
///
/// Clockwise: A is the front of the segment, C the back.
/// Counter-clockwise: A is the back, C the front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentLocation {
    A,
    B,
    C,
}

impl SegmentLocation {
    /// Slots in the order the robot passes them.
    pub fn in_travel_order(rotation: RotationDirection) -> [SegmentLocation; 3] {
        match rotation {
            RotationDirection::Clockwise => {
                [SegmentLocation::A, SegmentLocation::B, SegmentLocation::C]
            }
            RotationDirection::CounterClockwise => {
                [SegmentLocation::C, SegmentLocation::B, SegmentLocation::A]
            }
        }
    }

    /// First slot encountered after entering a segment.
    pub fn first(rotation: RotationDirection) -> Self {
        Self::in_travel_order(rotation)[0]
    }
}

/// Arena wall a marker stands next to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    Inner,
    Outer,
}

/// Marker color reported by the camera color filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Red,
    Green,
    Unknown,
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerColor::Red => f.write_str("RED"),
            MarkerColor::Green => f.write_str("GREEN"),
            MarkerColor::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// Identity of a physical marker slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerKey {
    pub segment: Segment,
    pub location: SegmentLocation,
}

impl MarkerKey {
    pub fn new(segment: Segment, location: SegmentLocation) -> Self {
        Self { segment, location }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.segment, self.location)
    }
}
