//! Parameters for the localisation module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// If true the gyroscope reads clockwise-positive and its heading must
    /// be negated to match the counter-clockwise-positive world frame.
    pub gyro_reversed: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            gyro_reversed: false,
        }
    }
}
