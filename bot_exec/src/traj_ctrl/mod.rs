//! # Trajectory control module
//!
//! Tracks a time-parameterised [`crate::traj::Trajectory`], converting the
//! pose estimate and the current wheel speeds into left/right drivetrain
//! voltage demands each cycle.
//!
//! The tracker is a nonlinear unicycle controller (see [`ramsete`]) whose
//! output is split into wheel speed setpoints, each driven by a
//! feedforward model plus a PID trim loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod ramsete;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use ramsete::{ramsete, UnicycleCmd};
pub use state::{StatusReport, TrajCtrl, TrajCtrlError, TrajCtrlMode};
