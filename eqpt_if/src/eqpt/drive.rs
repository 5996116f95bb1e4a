//! # Drivetrain Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be executed by the drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveCmd {
    /// An arcade-style command in normalised powers.
    Arcade {
        /// Forward power in [-1, +1]. Positive drives the robot forwards.
        forward: f64,

        /// Turn power in [-1, +1]. Positive turns the robot to the left
        /// (counter-clockwise about the robot's Z+ axis).
        turn: f64,
    },

    /// A tank-style command in which each side of the drivetrain is given an
    /// explicit voltage.
    TankVolts {
        /// Voltage demand for the left side motors.
        left_v: f64,

        /// Voltage demand for the right side motors.
        right_v: f64,
    },

    /// Stop the drivetrain, setting both sides to zero output.
    Stop,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent from the motion-control core to the drivetrain driver.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct DriveDems {
    /// The drive command to execute this cycle.
    pub cmd: DriveCmd,

    /// If true the driver shall zero both distance sensors before the next
    /// sensor snapshot is taken.
    pub reset_encoders: bool,
}

/// Snapshot of the drivetrain distance sensors, valid for one control cycle.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct DriveSensData {
    /// Accumulated distance of the left side in meters.
    pub left_dist_m: f64,

    /// Accumulated distance of the right side in meters.
    pub right_dist_m: f64,

    /// Linear rate of the left side in meters/second.
    pub left_rate_ms: f64,

    /// Linear rate of the right side in meters/second.
    pub right_rate_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DriveCmd {
    fn default() -> Self {
        DriveCmd::Stop
    }
}

impl Default for DriveDems {
    fn default() -> Self {
        Self {
            cmd: DriveCmd::Stop,
            reset_encoders: false,
        }
    }
}

impl DriveCmd {
    /// True if this command produces no motion.
    pub fn is_neutral(&self) -> bool {
        match self {
            DriveCmd::Stop => true,
            DriveCmd::Arcade { forward, turn } => *forward == 0.0 && *turn == 0.0,
            DriveCmd::TankVolts { left_v, right_v } => *left_v == 0.0 && *right_v == 0.0,
        }
    }
}

impl DriveSensData {
    /// The mean of the left and right accumulated distances.
    pub fn avg_dist_m(&self) -> f64 {
        0.5 * (self.left_dist_m + self.right_dist_m)
    }
}
