//! # Arcbot Executable Library
//!
//! Motion-control core for the arcbot. The library is split into:
//!
//! - `ctrl` - Generic feedback controllers (PID).
//! - `loc` - Localisation (differential-drive odometry).
//! - `traj` - Trajectory generation from waypoint path specifications.
//! - `traj_ctrl` - Trajectory tracking (unicycle controller + wheel loops).
//! - `point_mnvr` - Point-to-point manouvre primitives (drive distance,
//!   turn to angle).
//! - `vis_align` - Vision-target alignment.
//! - `auto_mgr` - Autonomous routine manager (the mode machine that runs
//!   the match routines).
//! - `sim` - A simple drivetrain simulation used to exercise the core
//!   without hardware.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod auto_mgr;
pub mod ctrl;
pub mod data_store;
pub mod loc;
pub mod point_mnvr;
pub mod sim;
pub mod traj;
pub mod traj_ctrl;
pub mod vis_align;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of the main control cycle in seconds.
pub const CYCLE_PERIOD_S: f64 = 0.02;

/// Frequency of the main control cycle in Hertz.
pub const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;
