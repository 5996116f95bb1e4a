//! Eight ball trajectory routine.
//!
//! Backs the robot away from the initiation line along a generated
//! trajectory, aligns on the target and shoots. The trajectory is
//! generated when the routine is selected, before the match clock starts.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info};

// Internal
use super::shoot::ShootSeq;
use super::{AutoOutput, RoutineCtx, StepInputs};
use crate::traj::Trajectory;
use eqpt_if::eqpt::drive::{DriveCmd, DriveDems};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub(super) struct EightBall {
    stage: Stage,

    /// The trajectory to track, consumed when tracking starts.
    trajectory: Option<Trajectory>,

    shoot: ShootSeq,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Stage {
    /// Reset localisation to the trajectory start and begin tracking.
    Start,

    /// Tracking the trajectory.
    Track,

    /// Aligning on the target. A single in-band sample is accepted here,
    /// the trajectory has already left the robot pointing at the target.
    Align,

    /// Running the shoot sequence.
    Shoot,

    /// Routine complete.
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EightBall {
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            stage: Stage::Start,
            trajectory: Some(trajectory),
            shoot: ShootSeq::new(),
        }
    }

    pub fn step(&mut self, inputs: &StepInputs, ctx: &mut RoutineCtx) -> AutoOutput {
        match self.stage {
            Stage::Start => {
                let trajectory = match self.trajectory.take() {
                    Some(t) => t,
                    None => {
                        error!("EightBall: no trajectory to track, aborting routine");
                        self.stage = Stage::Done;
                        return AutoOutput::neutral();
                    }
                };

                let start_pose = trajectory.start_robot_pose();

                if let Err(e) = ctx.traj_ctrl.begin(trajectory, inputs.time_s) {
                    error!("EightBall: could not begin trajectory: {}", e);
                    self.stage = Stage::Done;
                    return AutoOutput::neutral();
                }

                info!("EightBall: tracking trajectory");
                self.stage = Stage::Track;

                AutoOutput {
                    drive: DriveDems {
                        cmd: DriveCmd::Stop,
                        reset_encoders: true,
                    },
                    odom_reset: Some(start_pose),
                    ..AutoOutput::neutral()
                }
            }

            Stage::Track => {
                let (cmd, report) =
                    match ctx
                        .traj_ctrl
                        .proc(&inputs.pose, &inputs.wheel_speeds, inputs.time_s)
                    {
                        Ok(out) => out,
                        Err(e) => {
                            error!("EightBall: trajectory control failed: {}", e);
                            ctx.traj_ctrl.abort();
                            self.stage = Stage::Done;
                            return AutoOutput::neutral();
                        }
                    };

                if report.finished {
                    info!("EightBall: trajectory complete, aligning");
                    ctx.vis_align.reset();
                    self.stage = Stage::Align;
                    return AutoOutput::neutral();
                }

                AutoOutput {
                    drive: DriveDems {
                        cmd,
                        reset_encoders: false,
                    },
                    ..AutoOutput::neutral()
                }
            }

            Stage::Align => {
                let (cmd, aligned) = ctx.vis_align.proc(inputs.vision);

                if aligned {
                    info!("EightBall: aligned, shooting");
                    self.stage = Stage::Shoot;
                    return AutoOutput::neutral();
                }

                AutoOutput {
                    drive: DriveDems {
                        cmd,
                        reset_encoders: false,
                    },
                    ..AutoOutput::neutral()
                }
            }

            Stage::Shoot => {
                let (mech, complete) = self.shoot.step(
                    inputs.time_s,
                    inputs.mech.shooter_at_speed,
                    ctx.params.shoot_timeout_s,
                );

                if complete {
                    info!("EightBall: shoot complete, routine done");
                    self.stage = Stage::Done;
                }

                AutoOutput {
                    mech,
                    ..AutoOutput::neutral()
                }
            }

            Stage::Done => AutoOutput {
                done: true,
                ..AutoOutput::neutral()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
