//! Parameters for the autonomous routine manager.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::loc::Pose;
use crate::traj::PathSpec;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AutoMgrParams {
    /// Time budget of a shoot stage in seconds. Shooting stops once this
    /// much time has passed since the stage was entered, whether or not
    /// the shooter ever reached speed.
    pub shoot_timeout_s: f64,

    pub basic_back: BasicBackParams,
    pub rendezvous_five: RendezvousFiveParams,
    pub eight_ball: EightBallParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicBackParams {
    /// Distance to back away from the initiation line in meters
    /// (negative drives backwards).
    pub back_up_dist_m: f64,

    /// Forward power clamp for the back up.
    pub back_up_max_power: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RendezvousFiveParams {
    /// Distance to drive through the rendezvous point balls in meters.
    pub collect_dist_m: f64,

    /// Forward power clamp while collecting, reduced so balls are not
    /// pushed away by the bumpers.
    pub collect_max_power: f64,

    /// Blind drive power used to bring the shooting target into the
    /// camera's view after collecting.
    pub search_drive_power: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EightBallParams {
    /// The path driven away from the initiation line.
    pub path: PathSpecParams,
}

/// A [`PathSpec`] in parameter file form: poses as `[x_m, y_m,
/// heading_rad]` triples and waypoints as `[x_m, y_m]` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct PathSpecParams {
    pub start_pose: [f64; 3],
    pub waypoints: Vec<[f64; 2]>,
    pub end_pose: [f64; 3],
    pub max_vel_ms: f64,
    pub max_acc_mss: f64,
    pub max_volts: f64,
    pub inverted: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSpecParams {
    pub fn to_spec(&self) -> PathSpec {
        let mut spec = PathSpec::new(
            Pose::new(self.start_pose[0], self.start_pose[1], self.start_pose[2]),
            Pose::new(self.end_pose[0], self.end_pose[1], self.end_pose[2]),
            self.max_vel_ms,
            self.max_acc_mss,
            self.max_volts,
        )
        .with_inverted(self.inverted);

        for wp in &self.waypoints {
            spec = spec.with_waypoint(wp[0], wp[1]);
        }

        spec
    }
}
