//! # Navigation (gyroscope) Sensor Data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the gyroscope, valid for one control cycle.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct NavSensData {
    /// Continuous (unbounded) heading in degrees. Counter-clockwise positive
    /// once the `gyro_reversed` correction has been applied by localisation.
    pub heading_deg: f64,

    /// False if the gyroscope failed to initialise or has dropped out. The
    /// heading must not be trusted when this is false; the core surfaces the
    /// fault rather than substituting a default reading.
    pub ok: bool,
}

impl Default for NavSensData {
    fn default() -> Self {
        Self {
            heading_deg: 0.0,
            ok: false,
        }
    }
}
