//! Camera bearing to LiDAR candidate association.
//!
//! The camera only knows the direction of a colored blob, the LiDAR only
//! knows where unlabeled objects are. Each bearing nominates the candidate
//! whose direction seen from the camera matches best:
//! - angular difference within a tolerance that tightens with range
//! - smallest angular difference wins, then shortest distance along the ray
//!
//! Bearings are matched in order and a claimed candidate leaves the pool, so
//! a later bearing falls through to the best unclaimed candidate. When a
//! later bearing of another color would have matched a claimed candidate
//! best, that candidate is ambiguous and dropped.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::math::{normalize_degrees, rad_to_deg};
use crate::core::{MarkerColor, Point2D};
use crate::sensors::BlobBearing;

/// Association settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationConfig {
    /// Camera position in the robot frame (meters)
    pub camera_offset: Point2D,
    /// Angular tolerance at zero range (degrees)
    pub max_angle_diff_deg: f32,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            camera_offset: Point2D::new(0.0, 0.15),
            max_angle_diff_deg: 5.0,
        }
    }
}

impl AssociationConfig {
    /// Tolerance for a candidate `range` meters from the robot.
    #[inline]
    pub fn tolerance_at(&self, range: f32) -> f32 {
        self.max_angle_diff_deg / (1.0 + 2.0 * range)
    }
}

/// A LiDAR candidate labeled with a camera color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FusedMarker {
    pub position: Point2D,
    pub color: MarkerColor,
}

/// How well a candidate matches one bearing.
#[derive(Clone, Copy, Debug)]
struct Nomination {
    candidate: usize,
    angle_diff: f32,
    ray_distance: f32,
}

/// Best candidate for one blob bearing among those `available`.
fn nominate(
    bearing: &BlobBearing,
    candidates: &[Point2D],
    available: impl Fn(usize) -> bool,
    config: &AssociationConfig,
) -> Option<Nomination> {
    // Blob bearing is clockwise from forward; candidates are math angles.
    let expected = 90.0 - bearing.bearing_deg;

    candidates
        .iter()
        .enumerate()
        .filter(|(candidate, _)| available(*candidate))
        .filter_map(|(candidate, p)| {
            let ray = *p - config.camera_offset;
            let angle = rad_to_deg(ray.y.atan2(ray.x));
            let angle_diff = normalize_degrees(expected - angle).abs();
            (angle_diff <= config.tolerance_at(p.length())).then_some(Nomination {
                candidate,
                angle_diff,
                ray_distance: ray.length(),
            })
        })
        .min_by(|a, b| {
            a.angle_diff
                .total_cmp(&b.angle_diff)
                .then(a.ray_distance.total_cmp(&b.ray_distance))
        })
}

/// Pair blob bearings with marker candidates.
///
/// Bearings of unknown color are ignored. Output follows candidate order.
pub fn associate(
    bearings: &[BlobBearing],
    candidates: &[Point2D],
    config: &AssociationConfig,
) -> Vec<FusedMarker> {
    if bearings.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    // candidate index -> color, None once two colors disagree
    let mut claims: BTreeMap<usize, Option<MarkerColor>> = BTreeMap::new();

    for bearing in bearings {
        if bearing.color == MarkerColor::Unknown {
            continue;
        }

        if let Some(best) = nominate(bearing, candidates, |_| true, config)
            && let Some(claim) = claims.get_mut(&best.candidate)
            && *claim != Some(bearing.color)
        {
            *claim = None;
            continue;
        }

        if let Some(nomination) =
            nominate(bearing, candidates, |i| !claims.contains_key(&i), config)
        {
            claims.insert(nomination.candidate, Some(bearing.color));
        }
    }

    claims
        .into_iter()
        .filter_map(|(candidate, claim)| match claim {
            Some(color) => Some(FusedMarker {
                position: candidates[candidate],
                color,
            }),
            None => {
                debug!(
                    "[Fusion] candidate at ({:.2}, {:.2}) claimed by conflicting colors, dropped",
                    candidates[candidate].x, candidates[candidate].y
                );
                None
            }
        })
        .collect()
}
