//! Trajectory control module state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{ramsete, Params};
use crate::ctrl::Pid;
use crate::loc::{Pose, WheelSpeeds};
use crate::traj::Trajectory;
use eqpt_if::eqpt::drive::DriveCmd;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory tracking controller.
pub struct TrajCtrl {
    params: Params,

    /// Executing mode
    mode: TrajCtrlMode,

    /// The trajectory being tracked.
    trajectory: Option<Trajectory>,

    /// Value of the cycle clock at which tracking began.
    start_time_s: f64,

    /// Wheel velocity trim loops, outputs in volts.
    left_pid: Pid,
    right_pid: Pid,

    report: StatusReport,
}

/// Status report containing tracking errors and completion monitoring.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Tracking error along the robot's forward axis in meters.
    pub along_error_m: f64,

    /// Tracking error along the robot's left axis in meters.
    pub lateral_error_m: f64,

    /// Heading error to the reference in radians.
    pub heading_error_rad: f64,

    /// Time since tracking began in seconds.
    pub elapsed_s: f64,

    /// True once the trajectory has been fully tracked. Remains set while
    /// the module is in `Finished` mode.
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    /// A trajectory is already being tracked. This error occurs when
    /// attempting to begin a new trajectory before the current one has
    /// finished or been aborted.
    #[error("Attempted to begin a trajectory while one is already being tracked")]
    TrajectoryAlreadyTracking,

    /// The module is in tracking mode but has no trajectory loaded.
    #[error("No trajectory has been set")]
    NoTrajectory,
}

/// The possible modes of execution of TrajCtrl.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TrajCtrlMode {
    /// Not executing, awaiting a call to `begin`.
    Off,

    /// Tracking the loaded trajectory.
    Tracking,

    /// The trajectory has been completed (or aborted). A stop command is
    /// issued each cycle until a new trajectory is begun.
    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    /// Initialise the TrajCtrl module from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, TrajCtrlError> {
        let params: Params = match params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(TrajCtrlError::ParamLoadError(e)),
        };

        Ok(Self::new(params))
    }

    pub fn new(params: Params) -> Self {
        let left_pid = Pid::new(params.wheel_pid.clone());
        let right_pid = Pid::new(params.wheel_pid.clone());

        Self {
            params,
            mode: TrajCtrlMode::Off,
            trajectory: None,
            start_time_s: 0.0,
            left_pid,
            right_pid,
            report: StatusReport::default(),
        }
    }

    pub fn mode(&self) -> TrajCtrlMode {
        self.mode
    }

    /// The drive model the module was configured with, shared with
    /// trajectory generation so generated paths respect the same limits.
    pub fn drive_model(&self) -> &crate::traj::DriveModel {
        &self.params.drive_model
    }

    /// Begin tracking a trajectory.
    ///
    /// `time_s` is the current cycle clock value; the trajectory's own time
    /// base is mapped onto it. Beginning a new trajectory while one is
    /// being tracked is an error, use [`TrajCtrl::abort`] first.
    ///
    /// The caller is responsible for resetting localisation to the
    /// trajectory's start pose before the first call to `proc`.
    pub fn begin(&mut self, trajectory: Trajectory, time_s: f64) -> Result<(), TrajCtrlError> {
        if self.mode == TrajCtrlMode::Tracking {
            return Err(TrajCtrlError::TrajectoryAlreadyTracking);
        }

        self.trajectory = Some(trajectory);
        self.start_time_s = time_s;
        self.left_pid.reset();
        self.right_pid.reset();
        self.report = StatusReport::default();
        self.mode = TrajCtrlMode::Tracking;

        Ok(())
    }

    /// Abort the current trajectory.
    ///
    /// The module moves into `Finished` mode, so the next call to `proc`
    /// issues a stop command.
    pub fn abort(&mut self) {
        if self.trajectory.is_some() {
            self.mode = TrajCtrlMode::Finished;
        }
    }

    /// Process trajectory control for one cycle.
    pub fn proc(
        &mut self,
        pose: &Pose,
        wheel_speeds: &WheelSpeeds,
        time_s: f64,
    ) -> Result<(DriveCmd, StatusReport), TrajCtrlError> {
        let cmd = match self.mode {
            TrajCtrlMode::Off => {
                self.report = StatusReport::default();
                DriveCmd::Stop
            }
            TrajCtrlMode::Tracking => self.mode_tracking(pose, wheel_speeds, time_s)?,
            TrajCtrlMode::Finished => self.mode_finished(),
        };

        Ok((cmd, self.report))
    }

    fn mode_tracking(
        &mut self,
        pose: &Pose,
        wheel_speeds: &WheelSpeeds,
        time_s: f64,
    ) -> Result<DriveCmd, TrajCtrlError> {
        let trajectory = match self.trajectory {
            Some(ref t) => t,
            None => return Err(TrajCtrlError::NoTrajectory),
        };

        let elapsed_s = time_s - self.start_time_s;

        if elapsed_s >= trajectory.total_time_s() {
            self.mode = TrajCtrlMode::Finished;
            return Ok(self.mode_finished());
        }

        let sample = trajectory.sample(elapsed_s);

        // An inverted trajectory is driven backwards along the same
        // geometry: the robot faces opposite the path tangent and its body
        // velocity is negated. The heading reference still rotates at the
        // rate the tangent rotates
        let mut ref_pose = sample.pose;
        let (v_ref_ms, a_ref_mss) = if trajectory.is_inverted() {
            ref_pose.heading_rad += std::f64::consts::PI;
            (-sample.vel_ms, -sample.acc_mss)
        } else {
            (sample.vel_ms, sample.acc_mss)
        };
        let ang_ref_rads = sample.vel_ms * sample.curv_m;

        let (cmd, errors) = ramsete(
            pose,
            &ref_pose,
            v_ref_ms,
            ang_ref_rads,
            self.params.b,
            self.params.zeta,
        );

        self.report = StatusReport {
            along_error_m: errors.along_m,
            lateral_error_m: errors.lateral_m,
            heading_error_rad: errors.heading_rad,
            elapsed_s,
            finished: false,
        };

        // Split the unicycle command into wheel speed setpoints
        let half_track_m = 0.5 * self.params.drive_model.track_width_m;
        let left_sp_ms = cmd.vel_ms - cmd.ang_rads * half_track_m;
        let right_sp_ms = cmd.vel_ms + cmd.ang_rads * half_track_m;

        // Feedforward plus trim for each wheel
        self.left_pid.set_setpoint(left_sp_ms);
        self.right_pid.set_setpoint(right_sp_ms);

        let left_v = self.params.drive_model.wheel_feedforward_v(left_sp_ms, a_ref_mss)
            + self.left_pid.calc_output(wheel_speeds.left_ms);
        let right_v = self
            .params
            .drive_model
            .wheel_feedforward_v(right_sp_ms, a_ref_mss)
            + self.right_pid.calc_output(wheel_speeds.right_ms);

        Ok(DriveCmd::TankVolts { left_v, right_v })
    }

    fn mode_finished(&mut self) -> DriveCmd {
        self.trajectory = None;
        self.report.finished = true;
        DriveCmd::Stop
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
