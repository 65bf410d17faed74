//! Split and merge phases and the extraction entry point.

use crate::core::Point2D;
use crate::geometry::line_fitting::LineFit;
use crate::geometry::segment::LineSegment;

use super::config::SplitMergeConfig;
use super::helpers::{Run, merge_pair, mergeable};

/// Extracted segment with the fit of its supporting points, kept so that
/// merges can refit over the union of both supports.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedSegment {
    pub segment: LineSegment,
    pub fit: LineFit,
}

/// Extract wall segments from points in scan order.
///
/// # Example
/// ```
/// use pathik::core::Point2D;
/// use pathik::geometry::{SplitMergeConfig, extract_lines};
///
/// // A wall one meter ahead, sampled every centimeter
/// let points: Vec<Point2D> = (0..60)
///     .map(|i| Point2D::new(-0.3 + i as f32 * 0.01, 1.0))
///     .collect();
///
/// let lines = extract_lines(&points, &SplitMergeConfig::default());
/// assert_eq!(lines.len(), 1);
/// ```
pub fn extract_lines(points: &[Point2D], config: &SplitMergeConfig) -> Vec<LineSegment> {
    merge_segments(split_points(points, config), config)
        .into_iter()
        .map(|f| f.segment)
        .collect()
}

/// Split phase: one pass over the points with a running fit.
pub fn split_points(points: &[Point2D], config: &SplitMergeConfig) -> Vec<FittedSegment> {
    let mut segments = Vec::new();
    let mut current: Option<Run> = None;

    for &p in points {
        match current.as_mut() {
            Some(run) if run.accepts(p, config) => run.push(p),
            _ => {
                if let Some(done) = current.replace(Run::start(p))
                    && let Some(segment) = done.close(config)
                {
                    segments.push(segment);
                }
            }
        }
    }

    if let Some(segment) = current.and_then(|run| run.close(config)) {
        segments.push(segment);
    }

    segments
}

/// Merge phase: replace mergeable pairs until a fixed point is reached.
pub fn merge_segments(
    mut segments: Vec<FittedSegment>,
    config: &SplitMergeConfig,
) -> Vec<FittedSegment> {
    let mut merged = true;
    while merged {
        merged = false;
        'search: for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if mergeable(&segments[i], &segments[j], config)
                    && let Some(joined) = merge_pair(&segments[i], &segments[j])
                {
                    segments[i] = joined;
                    segments.remove(j);
                    merged = true;
                    break 'search;
                }
            }
        }
    }

    segments
}
