//! # Feedback controllers
//!
//! Generic controllers shared by the motion modules. Currently only the
//! [`Pid`] controller lives here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod pid;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use pid::{apply_friction_kick, Pid, PidConfig};
