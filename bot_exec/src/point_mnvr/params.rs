//! Parameters for the point manouvre module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::ctrl::PidConfig;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Gains for the drive-distance loop. Measurement is the mean drive
    /// distance in meters, output is a normalised forward power.
    pub drive_pid: PidConfig,

    /// Gains for the turn-to-angle loop. Measurement is the heading in
    /// degrees with angle wrapping, output is a normalised turn power.
    pub turn_pid: PidConfig,
}
