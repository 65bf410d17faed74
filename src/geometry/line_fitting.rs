//! Incremental Total Least Squares line fitting.
//!
//! TLS minimizes perpendicular distances to the line, which suits LiDAR
//! returns whose error is roughly isotropic. The accumulator keeps running
//! sums so a fit can be queried after every pushed point in O(1), and two
//! accumulators can be combined when segments merge.

use std::ops::{Add, AddAssign};

use crate::core::Point2D;

use super::segment::LineSegment;

/// Running sums for a TLS fit. Stored in f64 to keep the covariance stable
/// over a few hundred points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineFit {
    n: usize,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

/// Infinite line through a centroid along a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittedLine {
    pub centroid: Point2D,
    pub direction: Point2D,
}

impl LineFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate every point of a slice.
    pub fn from_points(points: &[Point2D]) -> Self {
        let mut fit = Self::new();
        for p in points {
            fit.push(*p);
        }
        fit
    }

    #[inline]
    pub fn push(&mut self, p: Point2D) {
        let (x, y) = (p.x as f64, p.y as f64);
        self.n += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    /// Number of accumulated points.
    #[inline]
    pub fn count(&self) -> usize {
        self.n
    }

    /// Best-fit line, `None` with fewer than two points or when every point
    /// coincides.
    pub fn line(&self) -> Option<FittedLine> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let mx = self.sum_x / n;
        let my = self.sum_y / n;

        // Covariance = | cxx  cxy |
        //              | cxy  cyy |
        let cxx = self.sum_xx / n - mx * mx;
        let cyy = self.sum_yy / n - my * my;
        let cxy = self.sum_xy / n - mx * my;

        let half_trace = (cxx + cyy) / 2.0;
        let disc = (((cxx - cyy) / 2.0).powi(2) + cxy * cxy).sqrt();
        let lambda1 = half_trace + disc;
        if lambda1 <= f64::EPSILON {
            return None;
        }

        // Eigenvector of the larger eigenvalue is the line direction. Use the
        // row of (C - λI) that avoids cancellation.
        let (dx, dy) = if cxx >= cyy {
            (lambda1 - cyy, cxy)
        } else {
            (cxy, lambda1 - cxx)
        };
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f64::EPSILON {
            return None;
        }

        Some(FittedLine {
            centroid: Point2D::new(mx as f32, my as f32),
            direction: Point2D::new((dx / len) as f32, (dy / len) as f32),
        })
    }
}

impl AddAssign for LineFit {
    fn add_assign(&mut self, other: Self) {
        self.n += other.n;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
        self.sum_xx += other.sum_xx;
        self.sum_yy += other.sum_yy;
        self.sum_xy += other.sum_xy;
    }
}

impl Add for LineFit {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl FittedLine {
    /// Perpendicular distance from `p` to the line.
    #[inline]
    pub fn distance(&self, p: Point2D) -> f32 {
        self.direction.cross(&(p - self.centroid)).abs()
    }

    /// Foot of the perpendicular from `p`.
    #[inline]
    pub fn project(&self, p: Point2D) -> Point2D {
        let t = (p - self.centroid).dot(&self.direction);
        self.centroid + self.direction * t
    }

    /// Segment between the projections of two points.
    pub fn segment_between(&self, first: Point2D, last: Point2D) -> Option<LineSegment> {
        LineSegment::try_new(self.project(first), self.project(last))
    }
}

/// Fit a line through a point slice.
pub fn fit_line(points: &[Point2D]) -> Option<FittedLine> {
    LineFit::from_points(points).line()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_horizontal_line() {
        let points: Vec<Point2D> = (0..10)
            .map(|i| Point2D::new(i as f32 * 0.1, 1.0 + if i % 2 == 0 { 0.005 } else { -0.005 }))
            .collect();
        let line = fit_line(&points).unwrap();
        assert_relative_eq!(line.direction.y.abs(), 0.0, epsilon = 0.02);
        assert_relative_eq!(line.centroid.y, 1.0, epsilon = 0.01);
        assert!(line.distance(Point2D::new(5.0, 1.0)) < 0.01);
    }

    #[test]
    fn test_fit_vertical_line() {
        let points: Vec<Point2D> = (0..5).map(|i| Point2D::new(-0.3, i as f32 * 0.2)).collect();
        let line = fit_line(&points).unwrap();
        assert_relative_eq!(line.direction.x.abs(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(line.distance(Point2D::ZERO), 0.3, epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(fit_line(&[]).is_none());
        assert!(fit_line(&[Point2D::new(1.0, 1.0)]).is_none());
        assert!(fit_line(&[Point2D::new(1.0, 1.0), Point2D::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_accumulators_combine() {
        let a: Vec<Point2D> = (0..5).map(|i| Point2D::new(i as f32, 2.0)).collect();
        let b: Vec<Point2D> = (5..9).map(|i| Point2D::new(i as f32, 2.0)).collect();
        let combined = LineFit::from_points(&a) + LineFit::from_points(&b);
        assert_eq!(combined.count(), 9);

        let all: Vec<Point2D> = a.iter().chain(b.iter()).copied().collect();
        let direct = LineFit::from_points(&all).line().unwrap();
        let merged = combined.line().unwrap();
        assert_relative_eq!(direct.centroid.x, merged.centroid.x, epsilon = 1e-5);
        assert_relative_eq!(direct.direction.x.abs(), merged.direction.x.abs(), epsilon = 1e-5);
    }

    #[test]
    fn test_segment_between_projects_endpoints() {
        let line = FittedLine {
            centroid: Point2D::new(0.0, 1.0),
            direction: Point2D::new(1.0, 0.0),
        };
        let s = line
            .segment_between(Point2D::new(-1.0, 1.2), Point2D::new(1.0, 0.8))
            .unwrap();
        assert_relative_eq!(s.p1().y, 1.0);
        assert_relative_eq!(s.p2().y, 1.0);
        assert_relative_eq!(s.length(), 2.0);
    }
}
