//! Helpers for the Split-and-Merge phases: run bookkeeping and merge tests.

use crate::core::Point2D;
use crate::geometry::line_fitting::LineFit;
use crate::geometry::segment::LineSegment;

use super::algorithm::FittedSegment;
use super::config::SplitMergeConfig;

/// Points accepted into the current split run.
pub(crate) struct Run {
    first: Point2D,
    last: Point2D,
    fit: LineFit,
}

impl Run {
    pub(crate) fn start(p: Point2D) -> Self {
        let mut fit = LineFit::new();
        fit.push(p);
        Self {
            first: p,
            last: p,
            fit,
        }
    }

    /// Whether `p` continues this run: close to the previous point and on
    /// the running fit.
    pub(crate) fn accepts(&self, p: Point2D, config: &SplitMergeConfig) -> bool {
        if p.distance(&self.last) > config.max_point_gap {
            return false;
        }
        match self.fit.line() {
            Some(line) => line.distance(p) <= config.split_threshold,
            None => true,
        }
    }

    pub(crate) fn push(&mut self, p: Point2D) {
        self.fit.push(p);
        self.last = p;
    }

    /// Turn the run into a segment if it has enough support and length.
    pub(crate) fn close(self, config: &SplitMergeConfig) -> Option<FittedSegment> {
        if self.fit.count() < config.min_points {
            return None;
        }
        let segment = self.fit.line()?.segment_between(self.first, self.last)?;
        (segment.length() >= config.min_length).then_some(FittedSegment {
            segment,
            fit: self.fit,
        })
    }
}

/// Acute angle between two segment orientations, degrees in `[0, 90]`.
pub(crate) fn orientation_gap(a: &LineSegment, b: &LineSegment) -> f32 {
    let diff = (a.orientation_deg() - b.orientation_deg()).abs();
    diff.min(180.0 - diff)
}

/// Smallest distance between any endpoint of `a` and any endpoint of `b`.
pub(crate) fn endpoint_gap(a: &LineSegment, b: &LineSegment) -> f32 {
    [
        a.p1().distance(&b.p1()),
        a.p1().distance(&b.p2()),
        a.p2().distance(&b.p1()),
        a.p2().distance(&b.p2()),
    ]
    .into_iter()
    .fold(f32::MAX, f32::min)
}

/// Merge test: similar orientation, nearby endpoints and no lateral step
/// larger than the gap threshold.
pub(crate) fn mergeable(a: &FittedSegment, b: &FittedSegment, config: &SplitMergeConfig) -> bool {
    orientation_gap(&a.segment, &b.segment) < config.merge_angle_deg
        && endpoint_gap(&a.segment, &b.segment) < config.merge_gap
        && a.segment.perpendicular_distance(b.segment.midpoint()) < config.merge_gap
}

/// One fit over the union of both supports, spanning the extreme endpoint
/// projections and oriented like `a`.
pub(crate) fn merge_pair(a: &FittedSegment, b: &FittedSegment) -> Option<FittedSegment> {
    let fit = a.fit + b.fit;
    let line = fit.line()?;
    let direction = if line.direction.dot(&a.segment.direction()) < 0.0 {
        -line.direction
    } else {
        line.direction
    };

    let (t_min, t_max) = [a.segment.p1(), a.segment.p2(), b.segment.p1(), b.segment.p2()]
        .iter()
        .map(|p| (*p - line.centroid).dot(&direction))
        .fold((f32::MAX, f32::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));

    let segment = LineSegment::try_new(
        line.centroid + direction * t_min,
        line.centroid + direction * t_max,
    )?;
    Some(FittedSegment { segment, fit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fitted(points: &[Point2D]) -> FittedSegment {
        let fit = LineFit::from_points(points);
        let segment = fit
            .line()
            .unwrap()
            .segment_between(points[0], points[points.len() - 1])
            .unwrap();
        FittedSegment { segment, fit }
    }

    fn row(x0: f32, x1: f32, y: f32) -> Vec<Point2D> {
        let n = 20;
        (0..n)
            .map(|i| Point2D::new(x0 + (x1 - x0) * i as f32 / (n - 1) as f32, y))
            .collect()
    }

    #[test]
    fn test_orientation_gap_wraps() {
        let a = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.02));
        let b = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, -0.02));
        assert!(orientation_gap(&a, &b) < 3.0);
    }

    #[test]
    fn test_collinear_pieces_merge() {
        let config = SplitMergeConfig::default();
        let a = fitted(&row(-1.0, -0.1, 1.0));
        let b = fitted(&row(0.0, 1.0, 1.0));
        assert!(mergeable(&a, &b, &config));

        let m = merge_pair(&a, &b).unwrap();
        assert_relative_eq!(m.segment.length(), 2.0, epsilon = 1e-4);
        assert_eq!(m.fit.count(), 40);
        // Oriented like the first parent
        assert!(m.segment.p1().x < m.segment.p2().x);
    }

    #[test]
    fn test_parallel_offset_pieces_do_not_merge() {
        let config = SplitMergeConfig::default();
        let a = fitted(&row(-1.0, -0.1, 1.0));
        let b = fitted(&row(0.0, 1.0, 1.5));
        assert!(!mergeable(&a, &b, &config));
    }

    #[test]
    fn test_run_rejects_outlier() {
        let config = SplitMergeConfig::default();
        let mut run = Run::start(Point2D::new(0.0, 1.0));
        for p in row(0.01, 0.2, 1.0) {
            run.push(p);
        }
        assert!(run.accepts(Point2D::new(0.25, 1.01), &config));
        assert!(!run.accepts(Point2D::new(0.25, 1.2), &config));
        assert!(!run.accepts(Point2D::new(0.5, 1.0), &config));
    }
}
