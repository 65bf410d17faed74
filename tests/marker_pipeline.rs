//! Marker fusion: camera bearings from the simulated arena, classification
//! and the debounced marker map.

mod common;

use pathik::core::{
    DeltaPose, Direction, MarkerColor, MarkerKey, Point2D, RotationDirection, Segment,
    SegmentLocation, WallSide,
};
use pathik::fusion::{ClassifiedMarker, DebounceConfig, FusionConfig, MarkerFusion, MarkerMap};
use pathik::geometry::LidarGeometry;
use pathik::robot::perceive;
use pathik::sim::{Arena, SimPose, SimWorld};

fn observation(segment: Segment, side: WallSide, color: MarkerColor) -> ClassifiedMarker {
    ClassifiedMarker {
        position: Point2D::new(0.3, 1.0),
        color,
        key: MarkerKey::new(segment, SegmentLocation::B),
        side,
    }
}

#[test]
fn test_commit_needs_unanimous_window() {
    let mut map = MarkerMap::new(DebounceConfig::default());
    let key = MarkerKey::new(Segment::B, SegmentLocation::B);

    assert!(map.observe(observation(Segment::B, WallSide::Inner, MarkerColor::Red)).is_none());
    assert!(map.observe(observation(Segment::B, WallSide::Inner, MarkerColor::Red)).is_none());
    // A disagreeing color spoils the window
    assert!(map.observe(observation(Segment::B, WallSide::Inner, MarkerColor::Green)).is_none());
    assert!(map.observe(observation(Segment::B, WallSide::Inner, MarkerColor::Green)).is_none());
    assert!(map.get(key).is_none());

    let committed = map
        .observe(observation(Segment::B, WallSide::Inner, MarkerColor::Green))
        .copied()
        .unwrap();
    assert_eq!(committed.color, MarkerColor::Green);

    // Committed slots never change
    for _ in 0..3 {
        assert!(map.observe(observation(Segment::B, WallSide::Outer, MarkerColor::Red)).is_none());
    }
    assert_eq!(map.get(key).unwrap().color, MarkerColor::Green);
    assert_eq!(map.get(key).unwrap().side, WallSide::Inner);
    assert_eq!(map.len(), 1);
}

#[test]
fn test_parking_side_of_start_segment_ignored() {
    let mut map = MarkerMap::new(DebounceConfig::default());
    for _ in 0..5 {
        assert!(map.observe(observation(Segment::A, WallSide::Outer, MarkerColor::Red)).is_none());
    }
    assert!(map.is_empty());

    for _ in 0..3 {
        map.observe(observation(Segment::A, WallSide::Inner, MarkerColor::Red));
    }
    assert_eq!(map.len(), 1);
}

#[test]
fn test_simulated_marker_is_classified_and_committed() {
    let pose = SimPose::new(0.5, 1.0, 0.0);
    let marker_world = Point2D::new(0.8, 2.0);
    let arena = Arena::standard().with_marker(marker_world.x, marker_world.y, MarkerColor::Red);
    let mut world = SimWorld::new(arena, pose, common::quiet_sim());

    let geometry = LidarGeometry::default();
    let walls = perceive(&geometry, &world.scan(), &DeltaPose::ZERO, Direction::North, 0.0).walls;
    let bearings = world.blob_bearings();
    assert_eq!(bearings.len(), 1);

    // 0.8 m from the outer wall, 1.0 m from the front wall
    let candidate = pose.to_local(marker_world);
    let mut fusion = MarkerFusion::new(&FusionConfig::default());
    let mut committed = Vec::new();
    for _ in 0..3 {
        committed = fusion.process(
            &[candidate],
            &bearings,
            &walls,
            RotationDirection::Clockwise,
            Segment::A,
        );
    }

    let key = MarkerKey::new(Segment::A, SegmentLocation::first(RotationDirection::Clockwise));
    assert_eq!(committed, vec![key]);
    let entry = fusion.map().get(key).unwrap();
    assert_eq!(entry.color, MarkerColor::Red);
    assert_eq!(entry.side, WallSide::Inner);
}

#[test]
fn test_bearing_without_candidate_is_dropped() {
    let pose = SimPose::new(0.5, 1.0, 0.0);
    let arena = Arena::standard().with_marker(0.8, 2.0, MarkerColor::Green);
    let mut world = SimWorld::new(arena, pose, common::quiet_sim());
    let bearings = world.blob_bearings();

    let walls = common::corridor(2.0, -0.5);
    let mut fusion = MarkerFusion::new(&FusionConfig::default());
    // Candidate on the other side of the corridor
    let stray = Point2D::new(-0.3, 1.0);
    for _ in 0..3 {
        let committed = fusion.process(
            &[stray],
            &bearings,
            &walls,
            RotationDirection::Clockwise,
            Segment::A,
        );
        assert!(committed.is_empty());
    }
    assert!(fusion.map().is_empty());
}
