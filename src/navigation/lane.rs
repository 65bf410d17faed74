//! Lane choice around markers.
//!
//! A marker of the "outer" color is passed on the outer wall side, the other
//! color on the inner side. Which color is which flips with the lap
//! direction. A marker next to the inner wall leaves more room on the outer
//! side, hence two lanes per side.

use serde::{Deserialize, Serialize};

use crate::core::{MarkerColor, RotationDirection, WallSide};

/// Lateral lane, ordered from the outer wall inward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Tight to the outer wall
    Outer2,
    /// Outer side with room to spare
    Outer1,
    /// Inner side with room to spare
    Inner1,
    /// Far from the outer wall
    Inner2,
}

/// Marker color passed on the outer wall side. The parking lot sits on the
/// outer wall, so this is also the color that allows a direct final
/// approach.
pub fn outer_color(rotation: RotationDirection) -> MarkerColor {
    match rotation {
        RotationDirection::Clockwise => MarkerColor::Green,
        RotationDirection::CounterClockwise => MarkerColor::Red,
    }
}

/// Marker color passed on the inner side.
pub fn inner_color(rotation: RotationDirection) -> MarkerColor {
    match rotation {
        RotationDirection::Clockwise => MarkerColor::Red,
        RotationDirection::CounterClockwise => MarkerColor::Green,
    }
}

/// Lane for a marker, `None` for an unknown color.
pub fn lane_for(color: MarkerColor, side: WallSide, rotation: RotationDirection) -> Option<Lane> {
    if color == MarkerColor::Unknown {
        return None;
    }
    let keep_outer = color == outer_color(rotation);

    Some(match (keep_outer, side) {
        (true, WallSide::Inner) => Lane::Outer1,
        (true, WallSide::Outer) => Lane::Outer2,
        (false, WallSide::Inner) => Lane::Inner2,
        (false, WallSide::Outer) => Lane::Inner1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CW: RotationDirection = RotationDirection::Clockwise;
    const CCW: RotationDirection = RotationDirection::CounterClockwise;

    #[test]
    fn test_clockwise_lanes() {
        assert_eq!(lane_for(MarkerColor::Green, WallSide::Inner, CW), Some(Lane::Outer1));
        assert_eq!(lane_for(MarkerColor::Green, WallSide::Outer, CW), Some(Lane::Outer2));
        assert_eq!(lane_for(MarkerColor::Red, WallSide::Inner, CW), Some(Lane::Inner2));
        assert_eq!(lane_for(MarkerColor::Red, WallSide::Outer, CW), Some(Lane::Inner1));
    }

    #[test]
    fn test_counter_clockwise_swaps_colors() {
        assert_eq!(lane_for(MarkerColor::Red, WallSide::Inner, CCW), Some(Lane::Outer1));
        assert_eq!(lane_for(MarkerColor::Red, WallSide::Outer, CCW), Some(Lane::Outer2));
        assert_eq!(lane_for(MarkerColor::Green, WallSide::Inner, CCW), Some(Lane::Inner2));
        assert_eq!(lane_for(MarkerColor::Green, WallSide::Outer, CCW), Some(Lane::Inner1));
    }

    #[test]
    fn test_unknown_color() {
        assert_eq!(lane_for(MarkerColor::Unknown, WallSide::Inner, CW), None);
    }
}
