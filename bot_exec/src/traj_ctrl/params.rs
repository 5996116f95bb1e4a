//! Parameters for the trajectory control module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::ctrl::PidConfig;
use crate::traj::DriveModel;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Convergence aggressiveness of the unicycle controller in 1/m^2.
    /// Larger values converge onto the path faster.
    pub b: f64,

    /// Damping ratio of the unicycle controller, in (0, 1).
    pub zeta: f64,

    /// Voltage model of the drivetrain used for wheel feedforward and by
    /// trajectory generation.
    pub drive_model: DriveModel,

    /// Gains for the left and right wheel velocity trim loops. Outputs are
    /// in volts, errors in m/s.
    pub wheel_pid: PidConfig,
}
