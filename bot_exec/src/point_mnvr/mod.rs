//! # Point manouvre module
//!
//! Closed-loop point-to-point motion primitives: drive a straight relative
//! distance and turn to an absolute heading. Both are non-blocking, the
//! caller invokes the primitive once per cycle and acts on the completion
//! flag.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::ctrl::{apply_friction_kick, Pid};
use eqpt_if::eqpt::drive::{DriveCmd, DriveDems, DriveSensData};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Point manouvre primitives.
pub struct PointMnvr {
    drive_pid: Pid,
    turn_pid: Pid,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PointMnvrError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PointMnvr {
    /// Initialise the point manouvre module from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, PointMnvrError> {
        let params: Params = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(PointMnvrError::ParamLoadError(e)),
        };

        Ok(Self::new(params))
    }

    pub fn new(params: Params) -> Self {
        Self {
            drive_pid: Pid::new(params.drive_pid),
            turn_pid: Pid::new(params.turn_pid),
        }
    }

    /// Drive to a distance relative to the last encoder reset.
    ///
    /// `target_m` is the target mean drive distance, `max_power` clamps the
    /// commanded forward power. On the cycle the loop settles inside the
    /// acceptance band the demands stop the drivetrain and zero the
    /// encoders, so a subsequent drive_distance is relative to the new
    /// position, and the completion flag is returned true.
    pub fn drive_distance(
        &mut self,
        target_m: f64,
        max_power: f64,
        drive: &DriveSensData,
    ) -> (DriveDems, bool) {
        self.drive_pid.set_setpoint(target_m);

        let mut power = self.drive_pid.calc_output(drive.avg_dist_m());
        if power.abs() > max_power {
            power = max_power.copysign(power);
        }

        if self.drive_pid.is_in_range() {
            self.drive_pid.reset();
            return (
                DriveDems {
                    cmd: DriveCmd::Stop,
                    reset_encoders: true,
                },
                true,
            );
        }

        (
            DriveDems {
                cmd: DriveCmd::Arcade {
                    forward: power,
                    turn: 0.0,
                },
                reset_encoders: false,
            },
            false,
        )
    }

    /// Turn in place to an absolute heading in degrees.
    ///
    /// The loop error wraps through the +/-180 degree boundary, so the
    /// robot always takes the short way round. Small outputs are kicked
    /// over static friction, the acceptance band keeps the loop from
    /// hunting around the target.
    pub fn turn_to_angle(&mut self, target_deg: f64, heading_deg: f64) -> (DriveDems, bool) {
        self.turn_pid.set_setpoint(target_deg);

        let power = apply_friction_kick(self.turn_pid.calc_output(heading_deg));

        if self.turn_pid.is_in_range() {
            self.turn_pid.reset();
            return (
                DriveDems {
                    cmd: DriveCmd::Stop,
                    reset_encoders: false,
                },
                true,
            );
        }

        (
            DriveDems {
                cmd: DriveCmd::Arcade {
                    forward: 0.0,
                    turn: power,
                },
                reset_encoders: false,
            },
            false,
        )
    }

    /// Clear the accumulated state of both loops.
    pub fn reset(&mut self) {
        self.drive_pid.reset();
        self.turn_pid.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
