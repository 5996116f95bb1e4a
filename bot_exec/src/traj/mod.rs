//! # Trajectory generation module
//!
//! Turns a waypoint path specification into a time-parameterised
//! trajectory that respects the drivetrain's velocity, acceleration and
//! voltage limits.
//!
//! Generation runs in three stages:
//!
//! 1. Fit a chain of cubic Hermite splines through the start pose,
//!    interior waypoints and end pose (see [`spline`]).
//! 2. Sample the chain densely into path points with position, heading,
//!    curvature and accumulated distance.
//! 3. Assign a speed to every point with a forward pass (acceleration and
//!    voltage limited) and a backward pass (deceleration limited), then
//!    convert speeds into timestamps.
//!
//! The geometry of an inverted (reverse-driven) path is identical to the
//! forward one; inversion is carried as a flag on the [`Trajectory`] and
//! applied by trajectory control when commanding the drivetrain.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod path_file;
mod spline;
mod trajectory;

pub use trajectory::{Trajectory, TrajectorySample};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Deserialize;

// Internal
use crate::loc::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target spacing between sampled path points in meters.
const SAMPLE_STEP_M: f64 = 0.05;

/// Maximum number of samples taken on a single spline segment.
const MAX_SEGMENT_SAMPLES: usize = 1000;

/// Paths shorter than this with no waypoints are treated as stationary.
const MIN_PATH_LENGTH_M: f64 = 1e-6;

/// Floor applied to per-sample time steps to keep timestamps strictly
/// increasing.
const MIN_TIME_STEP_S: f64 = 1e-4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path specification: endpoint poses, optional interior waypoints and
/// the kinematic constraints to generate under.
#[derive(Debug, Clone, Deserialize)]
pub struct PathSpec {
    pub start_pose: Pose,

    /// Interior waypoints the path must pass through, in order.
    pub waypoints: Vec<Vector2<f64>>,

    pub end_pose: Pose,

    /// Maximum path speed in meters/second.
    pub max_vel_ms: f64,

    /// Maximum path acceleration (and deceleration) in meters/second^2.
    pub max_acc_mss: f64,

    /// Voltage budget for the feedforward model in volts. Kept below the
    /// battery voltage to leave headroom for the feedback loops.
    pub max_volts: f64,

    /// If true the path is driven in reverse.
    pub inverted: bool,
}

/// Voltage-domain model of one side of the drivetrain.
///
/// `volts = ks_v * sign(v) + kv_v_per_ms * v + ka_v_per_mss * a`
#[derive(Debug, Clone, Deserialize)]
pub struct DriveModel {
    /// Static gain in volts.
    pub ks_v: f64,

    /// Velocity gain in volts per m/s.
    pub kv_v_per_ms: f64,

    /// Acceleration gain in volts per m/s^2.
    pub ka_v_per_mss: f64,

    /// Distance between the left and right wheel contact patches in meters.
    pub track_width_m: f64,
}

/// A sampled path point before time parameterisation.
struct PathPoint {
    position_m: Vector2<f64>,
    heading_rad: f64,
    curv_m: f64,

    /// Distance along the path from the start in meters.
    dist_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur during trajectory generation.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("Path constraints must be positive, got max_vel {0} m/s, max_acc {1} m/s^2")]
    InvalidConstraints(f64, f64),

    #[error("Voltage budget of {0} V does not exceed the static gain of {1} V")]
    VoltageBudgetTooLow(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSpec {
    /// A path between two poses with no interior waypoints, driven
    /// forwards.
    pub fn new(
        start_pose: Pose,
        end_pose: Pose,
        max_vel_ms: f64,
        max_acc_mss: f64,
        max_volts: f64,
    ) -> Self {
        Self {
            start_pose,
            waypoints: vec![],
            end_pose,
            max_vel_ms,
            max_acc_mss,
            max_volts,
            inverted: false,
        }
    }

    /// Append an interior waypoint.
    pub fn with_waypoint(mut self, x_m: f64, y_m: f64) -> Self {
        self.waypoints.push(Vector2::new(x_m, y_m));
        self
    }

    /// Set the direction of travel.
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }
}

impl DriveModel {
    /// Feedforward voltage for one wheel at the given speed and
    /// acceleration.
    pub fn wheel_feedforward_v(&self, vel_ms: f64, acc_mss: f64) -> f64 {
        self.ks_v * zero_safe_signum(vel_ms)
            + self.kv_v_per_ms * vel_ms
            + self.ka_v_per_mss * acc_mss
    }
}

/// Generate a trajectory for the given path specification under the given
/// drivetrain model.
pub fn generate(spec: &PathSpec, model: &DriveModel) -> Result<Trajectory, TrajError> {
    if spec.max_vel_ms <= 0.0 || spec.max_acc_mss <= 0.0 {
        return Err(TrajError::InvalidConstraints(
            spec.max_vel_ms,
            spec.max_acc_mss,
        ));
    }
    if spec.max_volts <= model.ks_v {
        return Err(TrajError::VoltageBudgetTooLow(spec.max_volts, model.ks_v));
    }

    // Degenerate spec: nowhere to go, hold the start pose
    if spec.waypoints.is_empty()
        && (spec.end_pose.position_m - spec.start_pose.position_m).norm() < MIN_PATH_LENGTH_M
    {
        return Ok(Trajectory::stationary(spec.start_pose, spec.inverted));
    }

    let segments = spline::fit(&spec.start_pose, &spec.waypoints, &spec.end_pose);
    let points = sample_path(&segments);

    let vels = assign_velocities(&points, spec, model);
    let samples = parameterise(&points, &vels, spec.max_acc_mss);

    Ok(Trajectory::new(samples, spec.inverted))
}

/// Sample the spline chain into dense path points with accumulated
/// distances.
fn sample_path(segments: &[spline::CubicHermite]) -> Vec<PathPoint> {
    let mut points: Vec<PathPoint> = vec![];
    let mut dist_m = 0.0;

    for (seg_idx, seg) in segments.iter().enumerate() {
        let n = ((seg.arc_length_estimate_m() / SAMPLE_STEP_M).ceil() as usize)
            .max(2)
            .min(MAX_SEGMENT_SAMPLES);

        // The segment start coincides with the previous segment's end, so
        // only the first segment contributes its t = 0 point
        let first = if seg_idx == 0 { 0 } else { 1 };

        for i in first..=n {
            let t = i as f64 / n as f64;
            let position_m = seg.position(t);

            if let Some(prev) = points.last() {
                dist_m += (position_m - prev.position_m).norm();
            }

            points.push(PathPoint {
                position_m,
                heading_rad: seg.heading_rad(t),
                curv_m: seg.curvature_m(t),
                dist_m,
            });
        }
    }

    points
}

/// Assign a speed to every path point.
///
/// The forward pass accelerates from rest, limited by `max_acc` and by the
/// acceleration the voltage budget leaves once the outer wheel's static and
/// velocity terms are paid. The backward pass decelerates into rest at the
/// end of the path. Speeds are additionally capped so the outer wheel's
/// steady-state voltage stays inside the budget on curves.
fn assign_velocities(points: &[PathPoint], spec: &PathSpec, model: &DriveModel) -> Vec<f64> {
    let n = points.len();
    let mut vels = vec![0.0; n];

    // Per-point speed cap
    let caps: Vec<f64> = points
        .iter()
        .map(|p| {
            let wheel_factor = 1.0 + p.curv_m.abs() * model.track_width_m * 0.5;
            let volt_cap = (spec.max_volts - model.ks_v) / (model.kv_v_per_ms * wheel_factor);
            spec.max_vel_ms.min(volt_cap)
        })
        .collect();

    // Forward pass
    for i in 1..n {
        let ds_m = points[i].dist_m - points[i - 1].dist_m;
        let wheel_factor = 1.0 + points[i - 1].curv_m.abs() * model.track_width_m * 0.5;

        let headroom_v =
            spec.max_volts - model.ks_v - model.kv_v_per_ms * vels[i - 1] * wheel_factor;
        let volt_acc = if model.ka_v_per_mss > 0.0 {
            (headroom_v / (model.ka_v_per_mss * wheel_factor)).max(0.0)
        } else {
            spec.max_acc_mss
        };
        let acc = spec.max_acc_mss.min(volt_acc);

        vels[i] = caps[i].min((vels[i - 1].powi(2) + 2.0 * acc * ds_m).sqrt());
    }

    // Backward pass
    vels[n - 1] = 0.0;
    for i in (0..n - 1).rev() {
        let ds_m = points[i + 1].dist_m - points[i].dist_m;
        vels[i] = vels[i].min((vels[i + 1].powi(2) + 2.0 * spec.max_acc_mss * ds_m).sqrt());
    }

    vels
}

/// Convert path points and speeds into timed trajectory samples.
fn parameterise(points: &[PathPoint], vels: &[f64], max_acc_mss: f64) -> Vec<TrajectorySample> {
    let n = points.len();
    let mut samples = Vec::with_capacity(n);
    let mut time_s = 0.0;

    for i in 0..n {
        if i > 0 {
            let ds_m = points[i].dist_m - points[i - 1].dist_m;
            let v_sum = vels[i - 1] + vels[i];

            // Constant-acceleration step time, falling back to the pure
            // acceleration time when both endpoint speeds are zero
            let dt_s = if v_sum > 1e-6 {
                2.0 * ds_m / v_sum
            } else {
                (2.0 * ds_m / max_acc_mss).sqrt()
            };

            time_s += dt_s.max(MIN_TIME_STEP_S);
        }

        samples.push(TrajectorySample {
            time_s,
            pose: Pose {
                position_m: points[i].position_m,
                heading_rad: points[i].heading_rad,
            },
            vel_ms: vels[i],
            acc_mss: 0.0,
            curv_m: points[i].curv_m,
        });
    }

    // Accelerations from the finite difference of the assigned speeds. The
    // final sample is at rest
    for i in 0..n - 1 {
        let dt_s = samples[i + 1].time_s - samples[i].time_s;
        samples[i].acc_mss = (vels[i + 1] - vels[i]) / dt_s;
    }

    samples
}

/// Signum which maps exact zero to zero rather than one.
pub fn zero_safe_signum(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value.signum()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_model() -> DriveModel {
        DriveModel {
            ks_v: 0.22,
            kv_v_per_ms: 1.98,
            ka_v_per_mss: 0.2,
            track_width_m: 0.69,
        }
    }

    fn straight_spec() -> PathSpec {
        PathSpec::new(
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(3.0, 0.0, 0.0),
            2.0,
            1.5,
            10.0,
        )
        .with_waypoint(1.5, 0.0)
    }

    #[test]
    fn straight_path_endpoints_and_rest() {
        let traj = generate(&straight_spec(), &test_model()).unwrap();

        let first = traj.samples()[0];
        let last = traj.samples()[traj.samples().len() - 1];

        assert!((first.pose.position_m - Vector2::new(0.0, 0.0)).norm() < 1e-9);
        assert!(first.pose.heading_rad.abs() < 1e-9);
        assert!(first.vel_ms.abs() < 1e-9);

        assert!((last.pose.position_m - Vector2::new(3.0, 0.0)).norm() < 1e-9);
        assert!(last.pose.heading_rad.abs() < 1e-9);
        assert!(last.vel_ms.abs() < 1e-9);
    }

    #[test]
    fn times_strictly_increase() {
        let traj = generate(&straight_spec(), &test_model()).unwrap();

        for pair in traj.samples().windows(2) {
            assert!(pair[1].time_s > pair[0].time_s);
        }
        assert!((traj.samples()[0].time_s).abs() < 1e-12);
    }

    #[test]
    fn speed_cap_respected() {
        let traj = generate(&straight_spec(), &test_model()).unwrap();

        for s in traj.samples() {
            assert!(s.vel_ms <= 2.0 + 1e-9);
            assert!(s.vel_ms >= 0.0);
        }
    }

    #[test]
    fn steady_state_voltage_within_budget() {
        let model = test_model();
        let traj = generate(&straight_spec(), &model).unwrap();

        for s in traj.samples() {
            let outer_wheel_ms = s.vel_ms * (1.0 + s.curv_m.abs() * model.track_width_m * 0.5);
            let volts = model.ks_v + model.kv_v_per_ms * outer_wheel_ms;
            assert!(volts <= 10.0 + 1e-6);
        }
    }

    #[test]
    fn degenerate_spec_yields_stationary_trajectory() {
        let spec = PathSpec::new(
            Pose::new(1.0, 1.0, 0.3),
            Pose::new(1.0, 1.0, 0.3),
            2.0,
            1.5,
            10.0,
        );
        let traj = generate(&spec, &test_model()).unwrap();

        assert_eq!(traj.samples().len(), 2);
        assert!(traj.total_time_s() > 0.0);
        for s in traj.samples() {
            assert!(s.vel_ms.abs() < 1e-12);
        }
    }

    #[test]
    fn inverted_flag_carried_through() {
        let spec = straight_spec().with_inverted(true);
        let traj = generate(&spec, &test_model()).unwrap();
        assert!(traj.is_inverted());
    }

    #[test]
    fn invalid_constraints_rejected() {
        let mut spec = straight_spec();
        spec.max_acc_mss = 0.0;
        assert!(generate(&spec, &test_model()).is_err());

        let mut spec = straight_spec();
        spec.max_volts = 0.1;
        assert!(generate(&spec, &test_model()).is_err());
    }

    #[test]
    fn curved_path_passes_through_waypoint() {
        let spec = PathSpec::new(
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(2.0, 2.0, std::f64::consts::FRAC_PI_2),
            2.0,
            1.5,
            10.0,
        )
        .with_waypoint(1.5, 0.5);
        let traj = generate(&spec, &test_model()).unwrap();

        let min_dist = traj
            .samples()
            .iter()
            .map(|s| (s.pose.position_m - Vector2::new(1.5, 0.5)).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(min_dist < SAMPLE_STEP_M);
    }
}
