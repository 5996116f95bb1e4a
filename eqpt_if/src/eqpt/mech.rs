//! # Mechanism Equipment Commands
//!
//! Demands for the non-drivetrain mechanisms used by the autonomous
//! routines: the shooter flywheel, the ball indexer belts and the intake.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent from the motion-control core to the mechanism drivers.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct MechDems {
    /// Run the shooter flywheel.
    pub shooter_run: bool,

    /// Run the indexer belts, feeding balls into the shooter.
    pub indexer_run: bool,

    /// Deploy (extend) the intake. False retracts it.
    pub intake_deployed: bool,

    /// Run the intake rollers.
    pub intake_run: bool,
}

/// Sensor data returned by the mechanism drivers.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct MechSensData {
    /// True once the shooter flywheel has reached its full-speed threshold.
    pub shooter_at_speed: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MechDems {
    /// Demands with every mechanism stopped and the intake retracted.
    pub fn all_stop() -> Self {
        Self::default()
    }
}
