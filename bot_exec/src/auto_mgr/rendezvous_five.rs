//! Rendezvous point collection routine.
//!
//! Drops the intake and drives through the balls staged at the rendezvous
//! point at reduced power, then backs up blind until the shooting target
//! comes into the camera's view, aligns and shoots.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use super::shoot::ShootSeq;
use super::{AutoOutput, RoutineCtx, StepInputs};
use eqpt_if::eqpt::drive::{DriveCmd, DriveDems};
use eqpt_if::eqpt::mech::MechDems;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub(super) struct RendezvousFive {
    stage: Stage,
    shoot: ShootSeq,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Stage {
    /// Deploy and start the intake.
    DropIntake,

    /// Drive through the staged balls with the intake running.
    Collect,

    /// Retract and stop the intake.
    RaiseIntake,

    /// Drive blind until the vision target becomes visible.
    FindTarget,

    /// Align on the target, with debounce.
    Align,

    /// Run the shoot sequence.
    Shoot,

    /// Routine complete.
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RendezvousFive {
    pub fn new() -> Self {
        Self {
            stage: Stage::DropIntake,
            shoot: ShootSeq::new(),
        }
    }

    pub fn step(&mut self, inputs: &StepInputs, ctx: &mut RoutineCtx) -> AutoOutput {
        let params = &ctx.params.rendezvous_five;

        match self.stage {
            Stage::DropIntake => {
                info!("RendezvousFive: intake deployed, collecting");
                self.stage = Stage::Collect;

                AutoOutput {
                    mech: intake_running(),
                    ..AutoOutput::neutral()
                }
            }

            Stage::Collect => {
                let (dems, complete) = ctx.point_mnvr.drive_distance(
                    params.collect_dist_m,
                    params.collect_max_power,
                    inputs.drive,
                );

                if complete {
                    info!("RendezvousFive: collection drive complete");
                    self.stage = Stage::RaiseIntake;
                }

                AutoOutput {
                    drive: dems,
                    mech: intake_running(),
                    ..AutoOutput::neutral()
                }
            }

            Stage::RaiseIntake => {
                info!("RendezvousFive: intake raised, searching for target");
                self.stage = Stage::FindTarget;

                AutoOutput::neutral()
            }

            Stage::FindTarget => {
                if inputs.vision.has_target {
                    info!("RendezvousFive: target acquired, aligning");
                    ctx.vis_align.reset();
                    self.stage = Stage::Align;
                    return AutoOutput::neutral();
                }

                AutoOutput {
                    drive: DriveDems {
                        cmd: DriveCmd::Arcade {
                            forward: params.search_drive_power,
                            turn: 0.0,
                        },
                        reset_encoders: false,
                    },
                    ..AutoOutput::neutral()
                }
            }

            Stage::Align => {
                let (cmd, aligned) = ctx.vis_align.proc(inputs.vision);

                if ctx.vis_align.debounce_step(aligned) {
                    info!("RendezvousFive: aligned, shooting");
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
                    info!("RendezvousFive: shoot complete, routine done");
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

/// Intake deployed and rolling, everything else off.
fn intake_running() -> MechDems {
    MechDems {
        intake_deployed: true,
        intake_run: true,
        ..MechDems::default()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::tests::{inputs, test_mgr};
    use super::super::RoutineId;
    use eqpt_if::eqpt::drive::{DriveCmd, DriveSensData};
    use eqpt_if::eqpt::mech::MechSensData;
    use eqpt_if::eqpt::vision::VisionSensData;

    #[test]
    fn collects_then_finds_target() {
        let mut mgr = test_mgr();
        mgr.select(RoutineId::RendezvousFive).unwrap();

        let mech = MechSensData::default();
        let no_target = VisionSensData::default();
        let at_start = DriveSensData::default();

        // Intake drops first, drive still neutral
        let out = mgr.step(&inputs(0.0, &at_start, &no_target, &mech));
        assert!(out.mech.intake_deployed);
        assert!(out.mech.intake_run);
        assert!(out.drive.cmd.is_neutral());

        // Collection drive runs at the reduced power clamp
        let out = mgr.step(&inputs(0.02, &at_start, &no_target, &mech));
        match out.drive.cmd {
            DriveCmd::Arcade { forward, .. } => assert!((forward - 0.35).abs() < 1e-12),
            other => panic!("expected Arcade, got {:?}", other),
        }
        assert!(out.mech.intake_deployed);

        // Reaching the collection distance stops and raises the intake
        let at_dist = DriveSensData {
            left_dist_m: 1.6,
            right_dist_m: 1.6,
            ..DriveSensData::default()
        };
        let out = mgr.step(&inputs(0.04, &at_dist, &no_target, &mech));
        assert_eq!(out.drive.cmd, DriveCmd::Stop);

        let out = mgr.step(&inputs(0.06, &at_dist, &no_target, &mech));
        assert!(!out.mech.intake_deployed);
        assert!(!out.mech.intake_run);

        // No target visible: blind search drive backwards
        let out = mgr.step(&inputs(0.08, &at_dist, &no_target, &mech));
        match out.drive.cmd {
            DriveCmd::Arcade { forward, .. } => assert!((forward + 0.45).abs() < 1e-12),
            other => panic!("expected Arcade, got {:?}", other),
        }

        // Target appears: search stops through a neutral command
        let on_target = VisionSensData {
            target_offset_deg: 0.5,
            has_target: true,
        };
        let out = mgr.step(&inputs(0.10, &at_dist, &on_target, &mech));
        assert!(out.drive.cmd.is_neutral());
    }
}
