//! Marker slot classification against the resolved walls.
//!
//! A fused marker is placed in its segment by two perpendicular distances:
//! to the front wall (slot A/B/C) and to the outer wall (inner/outer side).
//! Either distance can be derived from the opposite wall with the known
//! arena dimensions. Values outside every band, including the exact band
//! edges, are classification failures for the tick.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::core::{
    MarkerColor, MarkerKey, Point2D, RotationDirection, Segment, SegmentLocation, WallSide,
};
use crate::geometry::ResolvedWalls;

use super::association::FusedMarker;

/// Open interval `(min, max)` in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Both bounds exclusive.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value > self.min && value < self.max
    }
}

/// Classification settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Front-to-back wall distance of a segment (meters)
    pub arena_length: f32,
    /// Inner-to-outer wall distance (meters)
    pub corridor_width: f32,
    /// Front-distance bands, nearest first
    pub location_bands: [Band; 3],
    /// Outer distance below this is the outer side (meters)
    pub outer_below: f32,
    /// Outer distance above this is the inner side (meters)
    pub inner_above: f32,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            arena_length: 3.0,
            corridor_width: 1.0,
            location_bands: [
                Band::new(0.80, 1.15),
                Band::new(1.35, 1.65),
                Band::new(1.85, 2.15),
            ],
            outer_below: 0.48,
            inner_above: 0.52,
        }
    }
}

/// A marker with its slot and side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifiedMarker {
    pub position: Point2D,
    pub color: MarkerColor,
    pub key: MarkerKey,
    pub side: WallSide,
}

impl ClassifiedMarker {
    /// Same side and color.
    pub fn agrees_with(&self, other: &ClassifiedMarker) -> bool {
        self.side == other.side && self.color == other.color
    }
}

/// Classifies fused markers in the current segment.
#[derive(Clone, Debug, Default)]
pub struct MarkerClassifier {
    config: ClassifyConfig,
}

impl MarkerClassifier {
    pub fn new(config: ClassifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifyConfig {
        &self.config
    }

    /// Distance from `p` to the front wall, derived from the back wall when
    /// the front is not visible.
    pub fn front_distance(&self, p: Point2D, walls: &ResolvedWalls) -> Option<f32> {
        walls
            .front
            .map(|w| w.perpendicular_distance(p))
            .or_else(|| {
                walls
                    .back
                    .map(|w| self.config.arena_length - w.perpendicular_distance(p))
            })
    }

    /// Distance from `p` to the outer wall, derived from the inner wall when
    /// the outer is not visible.
    pub fn outer_distance(
        &self,
        p: Point2D,
        walls: &ResolvedWalls,
        rotation: RotationDirection,
    ) -> Option<f32> {
        walls
            .outer(rotation)
            .map(|w| w.perpendicular_distance(p))
            .or_else(|| {
                walls
                    .inner(rotation)
                    .map(|w| self.config.corridor_width - w.perpendicular_distance(p))
            })
    }

    /// Slot for a front distance. Near band is the first slot in travel
    /// order.
    pub fn location(&self, front: f32, rotation: RotationDirection) -> Option<SegmentLocation> {
        let slots = SegmentLocation::in_travel_order(rotation);
        self.config
            .location_bands
            .iter()
            .position(|band| band.contains(front))
            .map(|i| slots[i])
    }

    /// Wall side for an outer distance.
    pub fn side(&self, outer: f32) -> Option<WallSide> {
        if outer < self.config.outer_below {
            Some(WallSide::Outer)
        } else if outer > self.config.inner_above {
            Some(WallSide::Inner)
        } else {
            None
        }
    }

    /// Classify one fused marker; `None` when any distance is missing or in
    /// a dead band.
    pub fn classify(
        &self,
        marker: &FusedMarker,
        walls: &ResolvedWalls,
        rotation: RotationDirection,
        segment: Segment,
    ) -> Option<ClassifiedMarker> {
        let front = self.front_distance(marker.position, walls)?;
        let outer = self.outer_distance(marker.position, walls, rotation)?;

        let (Some(location), Some(side)) = (self.location(front, rotation), self.side(outer))
        else {
            trace!(
                "[Fusion] {} marker unclassified (front {:.2}, outer {:.2})",
                marker.color, front, outer
            );
            return None;
        };

        Some(ClassifiedMarker {
            position: marker.position,
            color: marker.color,
            key: MarkerKey::new(segment, location),
            side,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LineSegment;

    fn seg(x1: f32, y1: f32, x2: f32, y2: f32) -> LineSegment {
        LineSegment::new(Point2D::new(x1, y1), Point2D::new(x2, y2))
    }

    /// Robot 0.4 m right of the outer (left) wall, front wall 2.0 m ahead.
    fn cw_walls() -> ResolvedWalls {
        ResolvedWalls {
            front: Some(seg(-1.0, 2.0, 1.0, 2.0)),
            left: Some(seg(-0.4, -1.0, -0.4, 2.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_band_edges_exclusive() {
        let band = Band::new(0.80, 1.15);
        assert!(!band.contains(0.80));
        assert!(band.contains(0.81));
        assert!(!band.contains(1.15));
    }

    #[test]
    fn test_outer_front_slot() {
        let classifier = MarkerClassifier::default();
        // 0.30 from the outer wall, 1.00 from the front wall
        let marker = FusedMarker {
            position: Point2D::new(-0.1, 1.0),
            color: MarkerColor::Red,
        };

        let c = classifier
            .classify(&marker, &cw_walls(), RotationDirection::Clockwise, Segment::A)
            .unwrap();
        assert_eq!(c.key, MarkerKey::new(Segment::A, SegmentLocation::A));
        assert_eq!(c.side, WallSide::Outer);
    }

    #[test]
    fn test_counter_clockwise_reverses_slots() {
        let classifier = MarkerClassifier::default();
        assert_eq!(
            classifier.location(1.0, RotationDirection::CounterClockwise),
            Some(SegmentLocation::C)
        );
        assert_eq!(
            classifier.location(2.0, RotationDirection::CounterClockwise),
            Some(SegmentLocation::A)
        );
        assert_eq!(
            classifier.location(1.5, RotationDirection::Clockwise),
            Some(SegmentLocation::B)
        );
    }

    #[test]
    fn test_dead_bands_skip() {
        let classifier = MarkerClassifier::default();
        assert_eq!(classifier.location(1.25, RotationDirection::Clockwise), None);
        assert_eq!(classifier.side(0.50), None);
        assert_eq!(classifier.side(0.48), None);
        assert_eq!(classifier.side(0.52), None);
        assert_eq!(classifier.side(0.47), Some(WallSide::Outer));
        assert_eq!(classifier.side(0.53), Some(WallSide::Inner));
    }

    #[test]
    fn test_derived_distances() {
        let classifier = MarkerClassifier::default();
        // Back wall 1.0 behind, inner (right) wall 0.6 to the right
        let walls = ResolvedWalls {
            back: Some(seg(-1.0, -1.0, 1.0, -1.0)),
            right: Some(seg(0.6, -1.0, 0.6, 2.0)),
            ..Default::default()
        };
        let marker = FusedMarker {
            position: Point2D::new(0.0, 1.0),
            color: MarkerColor::Green,
        };

        let c = classifier
            .classify(&marker, &walls, RotationDirection::Clockwise, Segment::B)
            .unwrap();
        // front = 3.0 - 2.0, outer = 1.0 - 0.6
        assert_eq!(c.key, MarkerKey::new(Segment::B, SegmentLocation::A));
        assert_eq!(c.side, WallSide::Outer);
    }

    #[test]
    fn test_missing_walls() {
        let classifier = MarkerClassifier::default();
        let marker = FusedMarker {
            position: Point2D::new(0.0, 1.0),
            color: MarkerColor::Green,
        };
        let walls = ResolvedWalls {
            front: Some(seg(-1.0, 2.0, 1.0, 2.0)),
            ..Default::default()
        };
        assert!(
            classifier
                .classify(&marker, &walls, RotationDirection::Clockwise, Segment::A)
                .is_none()
        );
    }
}
