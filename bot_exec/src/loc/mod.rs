//! # Localisation module
//!
//! Dead-reckoned pose estimation for a differential drivetrain. The
//! estimator fuses the gyroscope heading with the left/right drive distance
//! sensors, integrating the exact pose exponential over each cycle rather
//! than a straight-line approximation, so curved motion does not bias the
//! estimate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use eqpt_if::eqpt::{drive::DriveSensData, nav::NavSensData};
use util::params::LoadError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Heading changes smaller than this are integrated as straight-line motion
/// to avoid dividing by a near-zero turn angle.
const MIN_ARC_DELTA_RAD: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (2D position and heading) of the robot in the field frame.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Pose {
    /// Position in the field frame in meters.
    pub position_m: Vector2<f64>,

    /// Heading in radians, counter-clockwise positive, zero along the field
    /// frame X+ axis. Continuous (not wrapped into any range).
    pub heading_rad: f64,
}

/// Left and right drivetrain linear speeds.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub left_ms: f64,
    pub right_ms: f64,
}

/// Differential-drive odometry.
pub struct Odometry {
    params: Params,

    pose: Pose,

    /// Offset added to the (sign-corrected) gyro heading so that the
    /// estimated heading matches the declared heading at the last reset.
    heading_offset_rad: f64,

    prev_heading_rad: f64,
    prev_left_m: f64,
    prev_right_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// Unit vector along the robot's forward (X+) axis in the field frame.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Odometry {
    /// Initialise the odometry from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, LoadError> {
        Ok(Self::new(util::params::load(params_path)?))
    }

    pub fn new(params: Params) -> Self {
        Self {
            params,
            pose: Pose::default(),
            heading_offset_rad: 0.0,
            prev_heading_rad: 0.0,
            prev_left_m: 0.0,
            prev_right_m: 0.0,
        }
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Reset the estimate to the given pose.
    ///
    /// The caller must zero the drive distance sensors in the same cycle
    /// (via `DriveDems::reset_encoders`), as the estimator restarts its
    /// distance deltas from zero. The gyro itself is not zeroed, instead an
    /// offset is captured so the estimated heading continues from
    /// `pose.heading_rad`.
    pub fn reset(&mut self, pose: Pose, nav: &NavSensData) {
        self.heading_offset_rad = pose.heading_rad - self.raw_heading_rad(nav);
        self.pose = pose;
        self.prev_heading_rad = pose.heading_rad;
        self.prev_left_m = 0.0;
        self.prev_right_m = 0.0;
    }

    /// Restart the distance deltas from zero without touching the pose.
    ///
    /// Must be called in any cycle that zeroes the drive distance sensors
    /// (via `DriveDems::reset_encoders`) without a full pose reset,
    /// otherwise the next update integrates the discarded distance as a
    /// spurious displacement.
    pub fn rebaseline(&mut self) {
        self.prev_left_m = 0.0;
        self.prev_right_m = 0.0;
    }

    /// Integrate one cycle of sensor data into the pose estimate.
    pub fn update(&mut self, nav: &NavSensData, drive: &DriveSensData) {
        let heading_rad = self.raw_heading_rad(nav) + self.heading_offset_rad;

        let ds_m = 0.5
            * ((drive.left_dist_m - self.prev_left_m) + (drive.right_dist_m - self.prev_right_m));
        let d_theta_rad = heading_rad - self.prev_heading_rad;

        let (dx_m, dy_m) = if d_theta_rad.abs() < MIN_ARC_DELTA_RAD {
            (
                ds_m * self.prev_heading_rad.cos(),
                ds_m * self.prev_heading_rad.sin(),
            )
        } else {
            // Exact integral of motion along a constant-curvature arc
            let radius_m = ds_m / d_theta_rad;
            (
                radius_m * (heading_rad.sin() - self.prev_heading_rad.sin()),
                radius_m * (self.prev_heading_rad.cos() - heading_rad.cos()),
            )
        };

        self.pose.position_m += Vector2::new(dx_m, dy_m);
        self.pose.heading_rad = heading_rad;

        self.prev_heading_rad = heading_rad;
        self.prev_left_m = drive.left_dist_m;
        self.prev_right_m = drive.right_dist_m;
    }

    /// Left/right wheel speeds from the current drive sensor data.
    pub fn wheel_speeds(drive: &DriveSensData) -> WheelSpeeds {
        WheelSpeeds {
            left_ms: drive.left_rate_ms,
            right_ms: drive.right_rate_ms,
        }
    }

    /// Gyro heading in radians with the `gyro_reversed` sign correction
    /// applied, before the reset offset.
    fn raw_heading_rad(&self, nav: &NavSensData) -> f64 {
        let sign = if self.params.gyro_reversed { -1.0 } else { 1.0 };
        sign * nav.heading_deg.to_radians()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn nav(heading_deg: f64) -> NavSensData {
        NavSensData {
            heading_deg,
            ok: true,
        }
    }

    fn drive(left_m: f64, right_m: f64) -> DriveSensData {
        DriveSensData {
            left_dist_m: left_m,
            right_dist_m: right_m,
            left_rate_ms: 0.0,
            right_rate_ms: 0.0,
        }
    }

    #[test]
    fn zero_delta_update_holds_reset_pose() {
        let mut odom = Odometry::new(Params::default());
        let pose = Pose::new(1.5, -2.0, 0.4);

        // Reset while the gyro reads an arbitrary non-zero heading
        odom.reset(pose, &nav(73.0));
        odom.update(&nav(73.0), &drive(0.0, 0.0));

        let est = odom.pose();
        assert!((est.position_m.x - 1.5).abs() < 1e-12);
        assert!((est.position_m.y + 2.0).abs() < 1e-12);
        assert!((est.heading_rad - 0.4).abs() < 1e-12);
    }

    #[test]
    fn straight_line_update() {
        let mut odom = Odometry::new(Params::default());
        odom.reset(Pose::default(), &nav(0.0));

        odom.update(&nav(0.0), &drive(1.0, 1.0));

        let est = odom.pose();
        assert!((est.position_m.x - 1.0).abs() < 1e-9);
        assert!(est.position_m.y.abs() < 1e-9);
        assert!(est.heading_rad.abs() < 1e-9);
    }

    #[test]
    fn quarter_arc_update() {
        let mut odom = Odometry::new(Params::default());
        odom.reset(Pose::default(), &nav(0.0));

        // Quarter of a circle of radius 1 m turning left, so the mean wheel
        // distance is pi/2 and the end position is (1, 1)
        let ds = FRAC_PI_2;
        odom.update(&nav(90.0), &drive(ds, ds));

        let est = odom.pose();
        assert!((est.position_m.x - 1.0).abs() < 1e-9);
        assert!((est.position_m.y - 1.0).abs() < 1e-9);
        assert!((est.heading_rad - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn reversed_gyro_negates_heading() {
        let mut odom = Odometry::new(Params {
            gyro_reversed: true,
        });
        odom.reset(Pose::default(), &nav(0.0));

        odom.update(&nav(-90.0), &drive(0.0, 0.0));
        assert!((odom.pose().heading_rad - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn rebaseline_absorbs_encoder_zeroing() {
        let mut odom = Odometry::new(Params::default());
        odom.reset(Pose::default(), &nav(0.0));

        // Back up 2.1 m, then the encoders are zeroed while stationary
        odom.update(&nav(0.0), &drive(-2.1, -2.1));
        odom.rebaseline();
        odom.update(&nav(0.0), &drive(0.0, 0.0));

        let est = odom.pose();
        assert!((est.position_m.x + 2.1).abs() < 1e-9);
        assert!(est.position_m.y.abs() < 1e-9);
    }

    #[test]
    fn heading_continues_from_reset_pose() {
        let mut odom = Odometry::new(Params::default());

        // Declared heading differs from the gyro reading at reset time
        odom.reset(Pose::new(0.0, 0.0, FRAC_PI_2), &nav(30.0));

        // Gyro advances by 10 degrees, estimate should advance by the same
        odom.update(&nav(40.0), &drive(0.0, 0.0));
        let expect = FRAC_PI_2 + 10f64.to_radians();
        assert!((odom.pose().heading_rad - expect).abs() < 1e-9);
    }
}
