//! Nonlinear unicycle tracking control law.
//!
//! Given the reference state on the trajectory and the current pose
//! estimate, computes the unicycle (linear + angular velocity) command that
//! converges the robot onto the reference. The gain `k` rises with the
//! reference speed so the controller stays well damped across the whole
//! speed range.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::loc::Pose;
use util::maths::wrap_signed_rad;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A unicycle-model velocity command.
#[derive(Debug, Copy, Clone, Default)]
pub struct UnicycleCmd {
    /// Linear velocity in m/s, negative when driving in reverse.
    pub vel_ms: f64,

    /// Angular velocity in rad/s, counter-clockwise positive.
    pub ang_rads: f64,
}

/// Reference-frame tracking errors, used for monitoring.
#[derive(Debug, Copy, Clone, Default)]
pub struct TrackingErrors {
    /// Error along the robot's forward axis in meters.
    pub along_m: f64,

    /// Error along the robot's left axis in meters.
    pub lateral_m: f64,

    /// Heading error in radians.
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the unicycle command tracking the given reference.
///
/// `v_ref_ms` and `ang_ref_rads` are the velocities of the reference point
/// as it moves along the trajectory.
pub fn ramsete(
    pose: &Pose,
    ref_pose: &Pose,
    v_ref_ms: f64,
    ang_ref_rads: f64,
    b: f64,
    zeta: f64,
) -> (UnicycleCmd, TrackingErrors) {
    // Pose error in the robot's body frame
    let dx = ref_pose.position_m.x - pose.position_m.x;
    let dy = ref_pose.position_m.y - pose.position_m.y;

    let (sin_h, cos_h) = pose.heading_rad.sin_cos();

    let errors = TrackingErrors {
        along_m: cos_h * dx + sin_h * dy,
        lateral_m: -sin_h * dx + cos_h * dy,
        heading_rad: wrap_signed_rad(ref_pose.heading_rad, pose.heading_rad),
    };

    let k = 2.0 * zeta * (ang_ref_rads.powi(2) + b * v_ref_ms.powi(2)).sqrt();

    let cmd = UnicycleCmd {
        vel_ms: v_ref_ms * errors.heading_rad.cos() + k * errors.along_m,
        ang_rads: ang_ref_rads
            + b * v_ref_ms * sinc(errors.heading_rad) * errors.lateral_m
            + k * errors.heading_rad,
    };

    (cmd, errors)
}

/// sin(x)/x, continuous through zero.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        1.0 - x * x / 6.0
    } else {
        x.sin() / x
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_error_passes_reference_through() {
        let pose = Pose::new(1.0, 2.0, 0.5);
        let (cmd, errors) = ramsete(&pose, &pose, 1.5, 0.3, 2.0, 0.7);

        assert!((cmd.vel_ms - 1.5).abs() < 1e-9);
        assert!((cmd.ang_rads - 0.3).abs() < 1e-9);
        assert!(errors.along_m.abs() < 1e-12);
        assert!(errors.lateral_m.abs() < 1e-12);
        assert!(errors.heading_rad.abs() < 1e-12);
    }

    #[test]
    fn along_error_speeds_up() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        let reference = Pose::new(0.5, 0.0, 0.0);

        let (cmd, errors) = ramsete(&pose, &reference, 1.0, 0.0, 2.0, 0.7);

        assert!((errors.along_m - 0.5).abs() < 1e-12);
        assert!(cmd.vel_ms > 1.0);
    }

    #[test]
    fn lateral_error_turns_towards_path() {
        // Robot to the left of the reference, so it must turn right
        let pose = Pose::new(0.0, 0.1, 0.0);
        let reference = Pose::new(0.0, 0.0, 0.0);

        let (cmd, errors) = ramsete(&pose, &reference, 1.0, 0.0, 2.0, 0.7);

        assert!((errors.lateral_m + 0.1).abs() < 1e-12);
        assert!(cmd.ang_rads < 0.0);
    }

    #[test]
    fn heading_error_wraps() {
        let pose = Pose::new(0.0, 0.0, 3.1);
        let reference = Pose::new(0.0, 0.0, -3.1);

        let (_, errors) = ramsete(&pose, &reference, 0.0, 0.0, 2.0, 0.7);
        assert!(errors.heading_rad.abs() < 0.1 + 1e-9);
    }
}
