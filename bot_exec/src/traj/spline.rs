//! Cubic Hermite spline fitting and evaluation.
//!
//! Paths are fitted as one Hermite segment per pair of consecutive path
//! points. End tangents are taken from the declared start/end headings,
//! interior tangents are Catmull-Rom (half the vector between the
//! neighbouring points), which keeps the curve C1 continuous through every
//! waypoint.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use crate::loc::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speeds (in path-parameter units) below which heading and curvature are
/// considered undefined.
const MIN_PARAM_SPEED: f64 = 1e-9;

/// Number of chords used for the coarse arc length estimate.
const ARC_LENGTH_CHORDS: usize = 16;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single cubic Hermite segment, parameterised by `t` in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct CubicHermite {
    p0: Vector2<f64>,
    m0: Vector2<f64>,
    p1: Vector2<f64>,
    m1: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CubicHermite {
    pub fn new(p0: Vector2<f64>, m0: Vector2<f64>, p1: Vector2<f64>, m1: Vector2<f64>) -> Self {
        Self { p0, m0, p1, m1 }
    }

    /// Position on the segment at parameter `t`.
    pub fn position(&self, t: f64) -> Vector2<f64> {
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        self.p0 * h00 + self.m0 * h10 + self.p1 * h01 + self.m1 * h11
    }

    /// First derivative (tangent) with respect to `t`.
    pub fn derivative(&self, t: f64) -> Vector2<f64> {
        let t2 = t * t;

        let h00 = 6.0 * t2 - 6.0 * t;
        let h10 = 3.0 * t2 - 4.0 * t + 1.0;
        let h01 = -6.0 * t2 + 6.0 * t;
        let h11 = 3.0 * t2 - 2.0 * t;

        self.p0 * h00 + self.m0 * h10 + self.p1 * h01 + self.m1 * h11
    }

    /// Second derivative with respect to `t`.
    pub fn second_derivative(&self, t: f64) -> Vector2<f64> {
        let h00 = 12.0 * t - 6.0;
        let h10 = 6.0 * t - 4.0;
        let h01 = -12.0 * t + 6.0;
        let h11 = 6.0 * t - 2.0;

        self.p0 * h00 + self.m0 * h10 + self.p1 * h01 + self.m1 * h11
    }

    /// Heading of the tangent at `t` in radians.
    pub fn heading_rad(&self, t: f64) -> f64 {
        let d = self.derivative(t);
        d.y.atan2(d.x)
    }

    /// Signed curvature at `t` in 1/m. Positive curves to the left.
    pub fn curvature_m(&self, t: f64) -> f64 {
        let d = self.derivative(t);
        let dd = self.second_derivative(t);

        let speed = d.norm();
        if speed < MIN_PARAM_SPEED {
            return 0.0;
        }

        (d.x * dd.y - d.y * dd.x) / speed.powi(3)
    }

    /// Coarse arc length estimate by chord summation, used to pick the
    /// sampling density.
    pub fn arc_length_estimate_m(&self) -> f64 {
        let mut length = 0.0;
        let mut prev = self.position(0.0);

        for i in 1..=ARC_LENGTH_CHORDS {
            let next = self.position(i as f64 / ARC_LENGTH_CHORDS as f64);
            length += (next - prev).norm();
            prev = next;
        }

        length
    }
}

/// Fit a chain of Hermite segments through the start pose, interior
/// waypoints and end pose.
///
/// The returned chain passes exactly through every point, and its tangents
/// at the two ends point along the declared start/end headings.
pub fn fit(start: &Pose, waypoints: &[Vector2<f64>], end: &Pose) -> Vec<CubicHermite> {
    let mut points = Vec::with_capacity(waypoints.len() + 2);
    points.push(start.position_m);
    points.extend_from_slice(waypoints);
    points.push(end.position_m);

    let n = points.len();

    // Tangent magnitude at the ends is scaled by the adjacent chord so that
    // short segments don't overshoot
    let mut tangents = Vec::with_capacity(n);
    tangents.push(start.forward() * (points[1] - points[0]).norm());
    for i in 1..n - 1 {
        tangents.push((points[i + 1] - points[i - 1]) * 0.5);
    }
    tangents.push(end.forward() * (points[n - 1] - points[n - 2]).norm());

    (0..n - 1)
        .map(|i| CubicHermite::new(points[i], tangents[i], points[i + 1], tangents[i + 1]))
        .collect()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_hits_endpoints() {
        let seg = CubicHermite::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(1.0, 0.0),
        );

        assert!((seg.position(0.0) - Vector2::new(0.0, 0.0)).norm() < 1e-12);
        assert!((seg.position(1.0) - Vector2::new(2.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn fit_respects_end_headings() {
        let start = Pose::new(0.0, 0.0, 0.0);
        let end = Pose::new(3.0, 1.0, std::f64::consts::FRAC_PI_2);
        let segs = fit(&start, &[Vector2::new(1.5, 0.0)], &end);

        assert_eq!(segs.len(), 2);
        assert!(segs[0].heading_rad(0.0).abs() < 1e-9);
        assert!((segs[1].heading_rad(1.0) - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn collinear_fit_is_straight() {
        let start = Pose::new(0.0, 0.0, 0.0);
        let end = Pose::new(3.0, 0.0, 0.0);
        let segs = fit(&start, &[Vector2::new(1.5, 0.0)], &end);

        for seg in &segs {
            for i in 0..=10 {
                let t = i as f64 / 10.0;
                assert!(seg.position(t).y.abs() < 1e-9);
                assert!(seg.curvature_m(t).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn circle_like_segment_has_left_curvature() {
        // Quarter-turn to the left, tangents of equal magnitude
        let seg = CubicHermite::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.5, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.5),
        );

        for i in 0..=10 {
            assert!(seg.curvature_m(i as f64 / 10.0) > 0.0);
        }
    }
}
