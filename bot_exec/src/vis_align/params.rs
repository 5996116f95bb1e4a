//! Parameters for the vision alignment module.

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
    /// Gains for the alignment loop. Measurement is the target's angular
    /// offset in degrees, output is a normalised turn power.
    pub align_pid: PidConfig,

    /// Number of consecutive aligned samples (net of the up/down counting,
    /// see `VisAlign::debounce_step`) required to call the robot aligned.
    pub debounce_threshold: u32,
}
