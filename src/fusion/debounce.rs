//! Temporal debounce of marker classifications.
//!
//! Each slot keeps a rolling window of its most recent classifications.
//! When the window is full and every entry agrees on side and color, the
//! slot is committed to the marker map. A committed slot is never changed
//! again during the run.

use std::collections::{BTreeMap, VecDeque};

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::{MarkerKey, Segment, SegmentLocation, WallSide};

use super::classify::ClassifiedMarker;

/// Segment side whose classifications are never recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub segment: Segment,
    pub side: WallSide,
}

/// Debounce settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Window length; a commit needs this many unanimous entries
    pub capacity: usize,
    /// Slots excluded from the map (the parking lot sits on the outer side
    /// of the start segment)
    pub ignore: Vec<IgnoreRule>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            ignore: vec![IgnoreRule {
                segment: Segment::A,
                side: WallSide::Outer,
            }],
        }
    }
}

/// Detection histories plus the committed marker map.
#[derive(Debug)]
pub struct MarkerMap {
    config: DebounceConfig,
    history: BTreeMap<MarkerKey, VecDeque<ClassifiedMarker>>,
    committed: BTreeMap<MarkerKey, ClassifiedMarker>,
}

impl MarkerMap {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config: DebounceConfig {
                capacity: config.capacity.max(1),
                ..config
            },
            history: BTreeMap::new(),
            committed: BTreeMap::new(),
        }
    }

    fn ignored(&self, marker: &ClassifiedMarker) -> bool {
        self.config
            .ignore
            .iter()
            .any(|rule| rule.segment == marker.key.segment && rule.side == marker.side)
    }

    /// Record a classification. Returns the committed entry when this
    /// observation completes a unanimous window.
    pub fn observe(&mut self, marker: ClassifiedMarker) -> Option<&ClassifiedMarker> {
        if self.ignored(&marker) {
            return None;
        }

        let capacity = self.config.capacity;
        let window = self.history.entry(marker.key).or_default();
        window.push_back(marker);
        while window.len() > capacity {
            window.pop_front();
        }

        let unanimous = window.len() == capacity
            && window.iter().all(|m| m.agrees_with(&marker));
        if !unanimous || self.committed.contains_key(&marker.key) {
            return None;
        }

        info!(
            "[Fusion] committed {} marker at {} ({:?})",
            marker.color, marker.key, marker.side
        );
        self.committed.insert(marker.key, marker);
        self.committed.get(&marker.key)
    }

    /// Committed marker for a slot.
    pub fn get(&self, key: MarkerKey) -> Option<&ClassifiedMarker> {
        self.committed.get(&key)
    }

    /// Committed marker at `location` of `segment`.
    pub fn at(&self, segment: Segment, location: SegmentLocation) -> Option<&ClassifiedMarker> {
        self.get(MarkerKey::new(segment, location))
    }

    /// Committed markers of one segment in the given slot order.
    pub fn in_segment(
        &self,
        segment: Segment,
        order: [SegmentLocation; 3],
    ) -> Vec<&ClassifiedMarker> {
        order
            .into_iter()
            .filter_map(|location| self.at(segment, location))
            .collect()
    }

    /// Current window for a slot, oldest first.
    pub fn history(&self, key: MarkerKey) -> impl Iterator<Item = &ClassifiedMarker> {
        self.history.get(&key).into_iter().flatten()
    }

    pub fn committed(&self) -> impl Iterator<Item = (&MarkerKey, &ClassifiedMarker)> {
        self.committed.iter()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

impl Default for MarkerMap {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}
