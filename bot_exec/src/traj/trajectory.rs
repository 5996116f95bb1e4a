//! Time-parameterised trajectory type.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::loc::Pose;
use util::maths::wrap_signed_rad;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One timed state along a trajectory.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct TrajectorySample {
    /// Time since the start of the trajectory in seconds.
    pub time_s: f64,

    /// Pose of the path at this time.
    pub pose: Pose,

    /// Path speed in meters/second. Always non-negative, direction of
    /// travel is carried by the trajectory's inverted flag.
    pub vel_ms: f64,

    /// Path acceleration in meters/second^2.
    pub acc_mss: f64,

    /// Signed path curvature in 1/m, positive to the left.
    pub curv_m: f64,
}

/// A trajectory: a sequence of timed samples with strictly increasing times,
/// starting at time zero.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,

    /// If true the path is to be driven in reverse (robot backing along the
    /// path while facing the sample headings).
    inverted: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Build a trajectory from pre-validated samples.
    ///
    /// The generator guarantees at least two samples and strictly
    /// increasing times.
    pub(super) fn new(samples: Vec<TrajectorySample>, inverted: bool) -> Self {
        Self { samples, inverted }
    }

    /// A minimal trajectory which holds a single pose at zero speed, used
    /// for degenerate path specifications.
    pub(super) fn stationary(pose: Pose, inverted: bool) -> Self {
        let sample = TrajectorySample {
            time_s: 0.0,
            pose,
            vel_ms: 0.0,
            acc_mss: 0.0,
            curv_m: 0.0,
        };

        Self {
            samples: vec![
                sample,
                TrajectorySample {
                    time_s: crate::CYCLE_PERIOD_S,
                    ..sample
                },
            ],
            inverted,
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn start_pose(&self) -> Pose {
        self.samples[0].pose
    }

    /// Pose of the robot at the start of the trajectory.
    ///
    /// Sample poses always face along the path tangent. An inverted
    /// trajectory is driven backwards, so the robot faces opposite the
    /// tangent and this differs from [`Trajectory::start_pose`] by pi.
    pub fn start_robot_pose(&self) -> Pose {
        let pose = self.start_pose();
        if self.inverted {
            Pose {
                heading_rad: pose.heading_rad + std::f64::consts::PI,
                ..pose
            }
        } else {
            pose
        }
    }

    pub fn end_pose(&self) -> Pose {
        self.samples[self.samples.len() - 1].pose
    }

    /// Duration of the trajectory in seconds.
    pub fn total_time_s(&self) -> f64 {
        self.samples[self.samples.len() - 1].time_s
    }

    /// Sample the trajectory at the given time.
    ///
    /// Times before the start return the first sample, times past the end
    /// return the final sample (which is always at rest), so a tracker that
    /// overruns the trajectory is commanded to hold the endpoint.
    pub fn sample(&self, time_s: f64) -> TrajectorySample {
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];

        if time_s <= first.time_s {
            return first;
        }
        if time_s >= last.time_s {
            return last;
        }

        // Index of the first sample at or after the requested time, the
        // bounds checks above guarantee 1 <= idx < len
        let idx = self
            .samples
            .iter()
            .position(|s| s.time_s >= time_s)
            .unwrap_or(self.samples.len() - 1);

        let a = self.samples[idx - 1];
        let b = self.samples[idx];

        let frac = (time_s - a.time_s) / (b.time_s - a.time_s);

        let heading_rad =
            a.pose.heading_rad + frac * wrap_signed_rad(b.pose.heading_rad, a.pose.heading_rad);

        TrajectorySample {
            time_s,
            pose: Pose {
                position_m: a.pose.position_m + (b.pose.position_m - a.pose.position_m) * frac,
                heading_rad,
            },
            vel_ms: a.vel_ms + (b.vel_ms - a.vel_ms) * frac,
            acc_mss: a.acc_mss + (b.acc_mss - a.acc_mss) * frac,
            curv_m: a.curv_m + (b.curv_m - a.curv_m) * frac,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sample_traj() -> Trajectory {
        Trajectory::new(
            vec![
                TrajectorySample {
                    time_s: 0.0,
                    pose: Pose::new(0.0, 0.0, 0.0),
                    vel_ms: 0.0,
                    acc_mss: 1.0,
                    curv_m: 0.0,
                },
                TrajectorySample {
                    time_s: 2.0,
                    pose: Pose::new(2.0, 0.0, 0.0),
                    vel_ms: 2.0,
                    acc_mss: 0.0,
                    curv_m: 0.0,
                },
            ],
            false,
        )
    }

    #[test]
    fn sample_interpolates_between_samples() {
        let traj = two_sample_traj();
        let s = traj.sample(1.0);

        assert!((s.pose.position_m.x - 1.0).abs() < 1e-12);
        assert!((s.vel_ms - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sample_clamps_outside_time_range() {
        let traj = two_sample_traj();

        assert!((traj.sample(-1.0).pose.position_m.x - 0.0).abs() < 1e-12);
        assert!((traj.sample(10.0).pose.position_m.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn heading_interpolation_wraps() {
        let traj = Trajectory::new(
            vec![
                TrajectorySample {
                    time_s: 0.0,
                    pose: Pose::new(0.0, 0.0, 3.1),
                    vel_ms: 1.0,
                    acc_mss: 0.0,
                    curv_m: 0.0,
                },
                TrajectorySample {
                    time_s: 1.0,
                    pose: Pose::new(1.0, 0.0, -3.1),
                    vel_ms: 1.0,
                    acc_mss: 0.0,
                    curv_m: 0.0,
                },
            ],
            false,
        );

        // The shortest way from 3.1 to -3.1 rad is through pi, not zero
        let h = traj.sample(0.5).pose.heading_rad;
        assert!(h.abs() > 3.1);
    }

    #[test]
    fn stationary_trajectory_holds_pose() {
        let pose = Pose::new(1.0, 2.0, 0.5);
        let traj = Trajectory::stationary(pose, true);

        assert!(traj.is_inverted());
        assert!(traj.total_time_s() > 0.0);

        let s = traj.sample(traj.total_time_s() * 2.0);
        assert!((s.pose.position_m - pose.position_m).norm() < 1e-12);
        assert!(s.vel_ms.abs() < 1e-12);
    }
}
