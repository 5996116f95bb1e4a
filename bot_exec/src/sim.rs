//! # Drivetrain simulation
//!
//! A simple kinematic simulation of the drivetrain, gyroscope, vision
//! pipeline and shooter, used to exercise the motion-control core without
//! hardware. Each wheel is modelled with the same `ks`/`kv`/`ka` voltage
//! model the controllers use, so closed-loop behaviour in the sim is
//! representative of the real drivetrain's steady state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::traj::{zero_safe_signum, DriveModel};
use eqpt_if::eqpt::{
    drive::{DriveCmd, DriveDems, DriveSensData},
    mech::{MechDems, MechSensData},
    nav::NavSensData,
    vision::VisionSensData,
};
use util::maths::wrap_signed_deg;
use util::params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum range at which the simulated camera can resolve the target.
const MIN_TARGET_RANGE_M: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Voltage model of each drivetrain side.
    pub drive_model: DriveModel,

    /// Supply voltage limit applied to all commands.
    pub max_volts: f64,

    /// Position of the vision target in the field frame.
    pub target_position_m: [f64; 2],

    /// Full horizontal field of view of the simulated camera in degrees.
    pub vision_fov_deg: f64,

    /// Time for the shooter to reach full speed in seconds.
    pub shooter_spin_up_s: f64,

    /// If true the simulated gyroscope reports itself invalid, used to
    /// exercise the safe mode path.
    #[serde(default)]
    pub fail_gyro: bool,
}

/// Simulated robot state.
pub struct Sim {
    params: SimParams,

    x_m: f64,
    y_m: f64,
    heading_rad: f64,

    left_vel_ms: f64,
    right_vel_ms: f64,
    left_dist_m: f64,
    right_dist_m: f64,

    /// How long the shooter has been running continuously.
    shooter_run_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sim {
    /// Initialise the simulation from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, params::LoadError> {
        Ok(Self::new(params::load(params_path)?))
    }

    pub fn new(params: SimParams) -> Self {
        Self {
            params,
            x_m: 0.0,
            y_m: 0.0,
            heading_rad: 0.0,
            left_vel_ms: 0.0,
            right_vel_ms: 0.0,
            left_dist_m: 0.0,
            right_dist_m: 0.0,
            shooter_run_time_s: 0.0,
        }
    }

    /// Advance the simulation by `dt_s` under the given demands.
    pub fn step(&mut self, drive: &DriveDems, mech: &MechDems, dt_s: f64) {
        if drive.reset_encoders {
            self.left_dist_m = 0.0;
            self.right_dist_m = 0.0;
        }

        let (left_v, right_v) = self.cmd_to_volts(&drive.cmd);

        self.left_vel_ms = self.step_wheel(self.left_vel_ms, left_v, dt_s);
        self.right_vel_ms = self.step_wheel(self.right_vel_ms, right_v, dt_s);

        self.left_dist_m += self.left_vel_ms * dt_s;
        self.right_dist_m += self.right_vel_ms * dt_s;

        // Differential-drive kinematics
        let vel_ms = 0.5 * (self.left_vel_ms + self.right_vel_ms);
        let ang_rads =
            (self.right_vel_ms - self.left_vel_ms) / self.params.drive_model.track_width_m;

        self.x_m += vel_ms * self.heading_rad.cos() * dt_s;
        self.y_m += vel_ms * self.heading_rad.sin() * dt_s;
        self.heading_rad += ang_rads * dt_s;

        if mech.shooter_run {
            self.shooter_run_time_s += dt_s;
        } else {
            self.shooter_run_time_s = 0.0;
        }
    }

    pub fn drive_sens(&self) -> DriveSensData {
        DriveSensData {
            left_dist_m: self.left_dist_m,
            right_dist_m: self.right_dist_m,
            left_rate_ms: self.left_vel_ms,
            right_rate_ms: self.right_vel_ms,
        }
    }

    pub fn nav_sens(&self) -> NavSensData {
        NavSensData {
            heading_deg: self.heading_rad.to_degrees(),
            ok: !self.params.fail_gyro,
        }
    }

    pub fn vision_sens(&self) -> VisionSensData {
        let dx = self.params.target_position_m[0] - self.x_m;
        let dy = self.params.target_position_m[1] - self.y_m;
        let range_m = (dx * dx + dy * dy).sqrt();

        let bearing_deg = dy.atan2(dx).to_degrees();

        // Positive offset when the target is to the right of the heading
        let offset_deg = wrap_signed_deg(self.heading_rad.to_degrees(), bearing_deg);

        let has_target =
            offset_deg.abs() < 0.5 * self.params.vision_fov_deg && range_m > MIN_TARGET_RANGE_M;

        VisionSensData {
            target_offset_deg: if has_target { offset_deg } else { 0.0 },
            has_target,
        }
    }

    pub fn mech_sens(&self) -> MechSensData {
        MechSensData {
            shooter_at_speed: self.shooter_run_time_s >= self.params.shooter_spin_up_s,
        }
    }

    /// Convert a drive command into per-side voltages, clamped to the
    /// supply limit.
    fn cmd_to_volts(&self, cmd: &DriveCmd) -> (f64, f64) {
        let clamp = |v: f64| v.max(-self.params.max_volts).min(self.params.max_volts);

        match *cmd {
            DriveCmd::Stop => (0.0, 0.0),
            DriveCmd::Arcade { forward, turn } => {
                // Positive turn is counter-clockwise, slowing the left side
                let left = (forward - turn).max(-1.0).min(1.0);
                let right = (forward + turn).max(-1.0).min(1.0);
                (left * self.params.max_volts, right * self.params.max_volts)
            }
            DriveCmd::TankVolts { left_v, right_v } => (clamp(left_v), clamp(right_v)),
        }
    }

    /// Integrate one wheel's velocity under the applied voltage.
    fn step_wheel(&self, vel_ms: f64, volts: f64, dt_s: f64) -> f64 {
        let model = &self.params.drive_model;

        // Static friction holds a stationary wheel below the breakaway
        // voltage
        if vel_ms == 0.0 && volts.abs() <= model.ks_v {
            return 0.0;
        }

        let friction_sign = if vel_ms != 0.0 {
            zero_safe_signum(vel_ms)
        } else {
            zero_safe_signum(volts)
        };

        let net_v = volts - model.ks_v * friction_sign - model.kv_v_per_ms * vel_ms;

        if model.ka_v_per_mss > 0.0 {
            vel_ms + net_v / model.ka_v_per_mss * dt_s
        } else {
            // No inertia in the model, jump straight to steady state
            (volts - model.ks_v * friction_sign) / model.kv_v_per_ms
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
