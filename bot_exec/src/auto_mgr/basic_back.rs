//! Basic back-away-and-shoot routine.
//!
//! The simplest scoring routine: back off the initiation line so the
//! target is in view, align on it, and shoot the three pre-loaded balls.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use super::shoot::ShootSeq;
use super::{AutoOutput, RoutineCtx, StepInputs};
use eqpt_if::eqpt::drive::DriveDems;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub(super) struct BasicBack {
    stage: Stage,
    shoot: ShootSeq,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Stage {
    /// Backing away from the initiation line.
    BackUp,

    /// Aligning on the vision target, with debounce.
    Align,

    /// Running the shoot sequence.
    Shoot,

    /// Routine complete, all demands neutral.
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BasicBack {
    pub fn new() -> Self {
        Self {
            stage: Stage::BackUp,
            shoot: ShootSeq::new(),
        }
    }

    pub fn step(&mut self, inputs: &StepInputs, ctx: &mut RoutineCtx) -> AutoOutput {
        match self.stage {
            Stage::BackUp => {
                let params = &ctx.params.basic_back;
                let (dems, complete) = ctx.point_mnvr.drive_distance(
                    params.back_up_dist_m,
                    params.back_up_max_power,
                    inputs.drive,
                );

                if complete {
                    info!("BasicBack: back up complete, aligning");
                    ctx.vis_align.reset();
                    self.stage = Stage::Align;
                }

                AutoOutput {
                    drive: dems,
                    ..AutoOutput::neutral()
                }
            }

            Stage::Align => {
                let (cmd, aligned) = ctx.vis_align.proc(inputs.vision);

                if ctx.vis_align.debounce_step(aligned) {
                    info!("BasicBack: aligned, shooting");
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
                let (mech, complete) =
                    self.shoot
                        .step(inputs.time_s, inputs.mech.shooter_at_speed, ctx.params.shoot_timeout_s);

                if complete {
                    info!("BasicBack: shoot complete, routine done");
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

#[cfg(test)]
mod tests {
    use super::super::tests::{inputs, test_mgr};
    use super::super::RoutineId;
    use eqpt_if::eqpt::drive::{DriveCmd, DriveSensData};
    use eqpt_if::eqpt::mech::MechSensData;
    use eqpt_if::eqpt::vision::VisionSensData;

    #[test]
    fn runs_stages_in_order() {
        let mut mgr = test_mgr();
        mgr.select(RoutineId::BasicBack).unwrap();

        let mech = MechSensData::default();
        let no_target = VisionSensData::default();

        // Backing up: negative forward power, no mechanisms
        let at_start = DriveSensData::default();
        let out = mgr.step(&inputs(0.0, &at_start, &no_target, &mech));
        match out.drive.cmd {
            DriveCmd::Arcade { forward, .. } => assert!(forward < 0.0),
            other => panic!("expected Arcade, got {:?}", other),
        }
        assert!(!out.mech.shooter_run);

        // Reaching the target distance stops the drive, resets encoders
        // and moves to alignment
        let at_target = DriveSensData {
            left_dist_m: -2.1,
            right_dist_m: -2.1,
            ..DriveSensData::default()
        };
        let out = mgr.step(&inputs(0.02, &at_target, &no_target, &mech));
        assert_eq!(out.drive.cmd, DriveCmd::Stop);
        assert!(out.drive.reset_encoders);

        // Alignment with the target in band: seven debounced samples to
        // pass, no shooting yet
        let on_target = VisionSensData {
            target_offset_deg: 0.2,
            has_target: true,
        };
        let mut time_s = 0.04;
        for _ in 0..6 {
            let out = mgr.step(&inputs(time_s, &at_target, &on_target, &mech));
            assert!(!out.mech.shooter_run);
            time_s += 0.02;
        }

        // Seventh aligned sample transitions to shooting through a
        // neutral command
        let out = mgr.step(&inputs(time_s, &at_target, &on_target, &mech));
        assert!(out.drive.cmd.is_neutral());

        // Shooting: shooter runs, indexer waits for full speed
        time_s += 0.02;
        let out = mgr.step(&inputs(time_s, &at_target, &on_target, &mech));
        assert!(out.mech.shooter_run);
        assert!(!out.mech.indexer_run);

        let at_speed = MechSensData {
            shooter_at_speed: true,
        };
        time_s += 0.02;
        let out = mgr.step(&inputs(time_s, &at_target, &on_target, &at_speed));
        assert!(out.mech.shooter_run);
        assert!(out.mech.indexer_run);

        // Past the stage budget everything stops and the routine reports
        // done on the next step
        let out = mgr.step(&inputs(time_s + 5.1, &at_target, &on_target, &at_speed));
        assert!(!out.mech.shooter_run);
        assert!(!out.mech.indexer_run);

        let out = mgr.step(&inputs(time_s + 5.12, &at_target, &on_target, &at_speed));
        assert!(out.done);
        assert!(out.drive.cmd.is_neutral());
    }

    #[test]
    fn shoot_times_out_without_shooter_speed() {
        let mut mgr = test_mgr();
        mgr.select(RoutineId::BasicBack).unwrap();

        let mech = MechSensData::default();
        let on_target = VisionSensData {
            target_offset_deg: 0.0,
            has_target: true,
        };
        let at_target = DriveSensData {
            left_dist_m: -2.1,
            right_dist_m: -2.1,
            ..DriveSensData::default()
        };

        // Complete back up and alignment
        let mut time_s = 0.0;
        mgr.step(&inputs(time_s, &at_target, &on_target, &mech));
        for _ in 0..7 {
            time_s += 0.02;
            mgr.step(&inputs(time_s, &at_target, &on_target, &mech));
        }

        // Shooter never reaches speed, the stage must still end
        time_s += 0.02;
        mgr.step(&inputs(time_s, &at_target, &on_target, &mech));
        let out = mgr.step(&inputs(time_s + 5.1, &at_target, &on_target, &mech));
        assert!(!out.mech.shooter_run);

        let out = mgr.step(&inputs(time_s + 5.12, &at_target, &on_target, &mech));
        assert!(out.done);
    }
}
