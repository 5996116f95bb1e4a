//! # Autonomous routine manager
//!
//! The [`AutoMgr`] runs the match's autonomous routines. Each routine is a
//! small state machine stepped once per control cycle, driving the motion
//! primitives ([`PointMnvr`], [`VisAlign`], [`TrajCtrl`]) and producing
//! drivetrain and mechanism demands.
//!
//! Routines:
//!
//! - `BasicBack` - Back away from the initiation line, align to the target
//!   and shoot the pre-loaded balls.
//! - `RendezvousFive` - Collect balls from the rendezvous point, find the
//!   target and shoot.
//! - `EightBall` - Drive a generated trajectory away from the line, align
//!   and shoot.
//!
//! Every stage transition passes through a neutral (stopped) command, so a
//! stage never inherits the previous stage's demands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod basic_back;
mod eight_ball;
mod params;
mod rendezvous_five;
mod shoot;

pub use params::{
    AutoMgrParams, BasicBackParams, EightBallParams, PathSpecParams, RendezvousFiveParams,
};

use basic_back::BasicBack;
use eight_ball::EightBall;
use rendezvous_five::RendezvousFive;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};
use std::fmt::Display;
use std::str::FromStr;

// Internal
use crate::loc::{Pose, WheelSpeeds};
use crate::point_mnvr::PointMnvr;
use crate::traj;
use crate::traj_ctrl::TrajCtrl;
use crate::vis_align::VisAlign;
use eqpt_if::eqpt::{
    drive::{DriveDems, DriveSensData},
    mech::{MechDems, MechSensData},
    vision::VisionSensData,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Autonomous routine manager.
pub struct AutoMgr {
    params: AutoMgrParams,

    point_mnvr: PointMnvr,
    vis_align: VisAlign,
    traj_ctrl: TrajCtrl,

    /// The selected routine, `None` when no routine is running.
    routine: Option<Routine>,
}

/// Sensor and estimation inputs to one manager step.
pub struct StepInputs<'a> {
    /// The cycle clock in seconds.
    pub time_s: f64,

    /// Current pose estimate.
    pub pose: Pose,

    /// Current wheel speeds.
    pub wheel_speeds: WheelSpeeds,

    pub drive: &'a DriveSensData,
    pub vision: &'a VisionSensData,
    pub mech: &'a MechSensData,
}

/// Demands produced by one manager step.
#[derive(Debug, Clone, Default)]
pub struct AutoOutput {
    pub drive: DriveDems,
    pub mech: MechDems,

    /// If set, localisation shall be reset to this pose before the next
    /// cycle. Always paired with `drive.reset_encoders`.
    pub odom_reset: Option<Pose>,

    /// True once the routine has completed. The demands of a completed
    /// routine are neutral.
    pub done: bool,
}

/// Mutable context handed to a routine's step function.
pub(self) struct RoutineCtx<'a> {
    pub params: &'a AutoMgrParams,
    pub point_mnvr: &'a mut PointMnvr,
    pub vis_align: &'a mut VisAlign,
    pub traj_ctrl: &'a mut TrajCtrl,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the autonomous manager.
#[derive(Debug, thiserror::Error)]
pub enum AutoMgrError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not generate routine trajectory: {0}")]
    TrajError(#[from] traj::TrajError),
}

/// Selectable autonomous routines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoutineId {
    BasicBack,
    RendezvousFive,
    EightBall,
}

/// A running routine and its state.
enum Routine {
    BasicBack(BasicBack),
    RendezvousFive(RendezvousFive),
    EightBall(EightBall),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoMgr {
    /// Initialise the manager from the given parameter file, taking
    /// ownership of the motion primitives it will drive.
    pub fn init(
        params_path: &str,
        point_mnvr: PointMnvr,
        vis_align: VisAlign,
        traj_ctrl: TrajCtrl,
    ) -> Result<Self, AutoMgrError> {
        let params: AutoMgrParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(AutoMgrError::ParamLoadError(e)),
        };

        Ok(Self::new(params, point_mnvr, vis_align, traj_ctrl))
    }

    pub fn new(
        params: AutoMgrParams,
        point_mnvr: PointMnvr,
        vis_align: VisAlign,
        traj_ctrl: TrajCtrl,
    ) -> Self {
        Self {
            params,
            point_mnvr,
            vis_align,
            traj_ctrl,
            routine: None,
        }
    }

    /// Select and arm a routine.
    ///
    /// The motion primitives are reset so no state leaks from a previous
    /// routine. For trajectory routines the trajectory is generated here,
    /// before the match clock is running.
    pub fn select(&mut self, id: RoutineId) -> Result<(), AutoMgrError> {
        self.point_mnvr.reset();
        self.vis_align.reset();
        self.traj_ctrl.abort();

        self.routine = Some(match id {
            RoutineId::BasicBack => Routine::BasicBack(BasicBack::new()),
            RoutineId::RendezvousFive => Routine::RendezvousFive(RendezvousFive::new()),
            RoutineId::EightBall => {
                let trajectory = traj::generate(
                    &self.params.eight_ball.path.to_spec(),
                    self.traj_ctrl.drive_model(),
                )?;
                Routine::EightBall(EightBall::new(trajectory))
            }
        });

        info!("AutoMgr: selected routine {}", id);

        Ok(())
    }

    /// Trajectory constraints configured for the eight ball routine's path,
    /// as `(max_vel_ms, max_acc_mss, max_volts)`.
    pub fn eight_ball_constraints(&self) -> (f64, f64, f64) {
        let path = &self.params.eight_ball.path;
        (path.max_vel_ms, path.max_acc_mss, path.max_volts)
    }

    /// Replace the eight ball routine's path with one loaded externally
    /// (e.g. from a path file).
    pub fn set_eight_ball_path(&mut self, path: traj::PathSpec) {
        self.params.eight_ball.path = PathSpecParams {
            start_pose: [
                path.start_pose.position_m.x,
                path.start_pose.position_m.y,
                path.start_pose.heading_rad,
            ],
            waypoints: path.waypoints.iter().map(|w| [w.x, w.y]).collect(),
            end_pose: [
                path.end_pose.position_m.x,
                path.end_pose.position_m.y,
                path.end_pose.heading_rad,
            ],
            max_vel_ms: path.max_vel_ms,
            max_acc_mss: path.max_acc_mss,
            max_volts: path.max_volts,
            inverted: path.inverted,
        };
    }

    /// Step the selected routine for one cycle.
    ///
    /// With no routine selected this is a no-op producing neutral demands.
    pub fn step(&mut self, inputs: &StepInputs) -> AutoOutput {
        let Self {
            params,
            point_mnvr,
            vis_align,
            traj_ctrl,
            routine,
        } = self;

        let mut ctx = RoutineCtx {
            params,
            point_mnvr,
            vis_align,
            traj_ctrl,
        };

        match routine {
            Some(Routine::BasicBack(r)) => r.step(inputs, &mut ctx),
            Some(Routine::RendezvousFive(r)) => r.step(inputs, &mut ctx),
            Some(Routine::EightBall(r)) => r.step(inputs, &mut ctx),
            None => {
                warn!("AutoMgr: step with no routine selected");
                AutoOutput::default()
            }
        }
    }
}

impl AutoOutput {
    /// Neutral demands: drivetrain stopped, mechanisms off.
    pub fn neutral() -> Self {
        Self::default()
    }
}

impl FromStr for RoutineId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic_back" => Ok(RoutineId::BasicBack),
            "rendezvous_five" => Ok(RoutineId::RendezvousFive),
            "eight_ball" => Ok(RoutineId::EightBall),
            other => Err(format!(
                "unknown routine \"{}\", expected basic_back, rendezvous_five or eight_ball",
                other
            )),
        }
    }
}

impl Display for RoutineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutineId::BasicBack => write!(f, "basic_back"),
            RoutineId::RendezvousFive => write!(f, "rendezvous_five"),
            RoutineId::EightBall => write!(f, "eight_ball"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctrl::PidConfig;
    use crate::traj::DriveModel;
    use eqpt_if::eqpt::drive::DriveCmd;

    pub(super) fn test_params() -> AutoMgrParams {
        AutoMgrParams {
            shoot_timeout_s: 5.0,
            basic_back: BasicBackParams {
                back_up_dist_m: -2.1,
                back_up_max_power: 1.0,
            },
            rendezvous_five: RendezvousFiveParams {
                collect_dist_m: 1.6,
                collect_max_power: 0.35,
                search_drive_power: -0.45,
            },
            eight_ball: EightBallParams {
                path: PathSpecParams {
                    start_pose: [0.0, 0.0, 0.0],
                    waypoints: vec![[0.75, 0.0]],
                    end_pose: [1.0, 0.0, 0.0],
                    max_vel_ms: 2.0,
                    max_acc_mss: 1.5,
                    max_volts: 10.0,
                    inverted: true,
                },
            },
        }
    }

    pub(super) fn test_mgr() -> AutoMgr {
        let point_mnvr = PointMnvr::new(crate::point_mnvr::Params {
            drive_pid: PidConfig {
                k_p: 0.5,
                acceptable_range: 0.05,
                ..PidConfig::default()
            },
            turn_pid: PidConfig {
                k_p: 0.02,
                angle_wrap: true,
                acceptable_range: 2.0,
                required_in_range: 3,
                max_output: 0.5,
                ..PidConfig::default()
            },
        });

        let vis_align = VisAlign::new(crate::vis_align::Params {
            align_pid: PidConfig {
                k_p: 0.027,
                acceptable_range: 1.9,
                ..PidConfig::default()
            },
            debounce_threshold: 7,
        });

        let traj_ctrl = TrajCtrl::new(crate::traj_ctrl::Params {
            b: 2.0,
            zeta: 0.7,
            drive_model: DriveModel {
                ks_v: 0.22,
                kv_v_per_ms: 1.98,
                ka_v_per_mss: 0.2,
                track_width_m: 0.69,
            },
            wheel_pid: PidConfig {
                k_p: 1.0,
                max_output: 12.0,
                ..PidConfig::default()
            },
        });

        AutoMgr::new(test_params(), point_mnvr, vis_align, traj_ctrl)
    }

    pub(super) fn inputs<'a>(
        time_s: f64,
        drive: &'a DriveSensData,
        vision: &'a VisionSensData,
        mech: &'a MechSensData,
    ) -> StepInputs<'a> {
        StepInputs {
            time_s,
            pose: Pose::default(),
            wheel_speeds: WheelSpeeds::default(),
            drive,
            vision,
            mech,
        }
    }

    #[test]
    fn no_routine_is_a_neutral_no_op() {
        let mut mgr = test_mgr();

        let drive = DriveSensData::default();
        let vision = VisionSensData::default();
        let mech = MechSensData::default();

        let out = mgr.step(&inputs(0.0, &drive, &vision, &mech));
        assert_eq!(out.drive.cmd, DriveCmd::Stop);
        assert!(!out.mech.shooter_run);
        assert!(!out.done);
    }

    #[test]
    fn routine_id_parses() {
        assert_eq!(
            "basic_back".parse::<RoutineId>().unwrap(),
            RoutineId::BasicBack
        );
        assert_eq!(
            "EIGHT_BALL".parse::<RoutineId>().unwrap(),
            RoutineId::EightBall
        );
        assert!("flying_lap".parse::<RoutineId>().is_err());
    }
}
