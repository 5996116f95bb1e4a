//! PID controller implementation.
//!
//! A single controller type covers all of the loops in the core: plain
//! position/velocity loops, loops with a velocity feedforward term, and
//! angular loops which must wrap their error through the +/-180 degree
//! boundary.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use util::maths::wrap_signed_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Magnitude below which an output power is considered too small to overcome
/// drivetrain static friction.
pub const FRICTION_KICK_THRESHOLD: f64 = 0.26;

/// Power added (in the direction of the output) to kick the drivetrain over
/// static friction.
pub const FRICTION_KICK_POWER: f64 = 0.3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and behaviour switches for a [`Pid`] controller, loaded from the
/// module parameter files.
#[derive(Debug, Clone, Deserialize)]
pub struct PidConfig {
    /// Proportional gain.
    pub k_p: f64,

    /// Integral gain.
    pub k_i: f64,

    /// Derivative gain.
    pub k_d: f64,

    /// Setpoint feedforward gain. Output gains a `k_ff * setpoint` term,
    /// used by the velocity loops. Zero disables the term.
    #[serde(default)]
    pub k_ff: f64,

    /// If true the error is computed as the shortest signed angular
    /// difference in degrees, wrapping through the +/-180 boundary.
    #[serde(default)]
    pub angle_wrap: bool,

    /// Half-width of the acceptance band about the setpoint, in the same
    /// units as the measurement.
    #[serde(default)]
    pub acceptable_range: f64,

    /// Number of consecutive in-band samples required before the controller
    /// reports in-range. Zero means a single in-band sample is enough.
    #[serde(default)]
    pub required_in_range: u32,

    /// Symmetric clamp applied to the output magnitude.
    #[serde(default = "default_max_output")]
    pub max_output: f64,

    /// If set, outputs are shifted away from zero by this amount to
    /// overcome static friction in the plant.
    #[serde(default)]
    pub static_friction_offset: Option<f64>,
}

/// A PID feedback controller.
///
/// The integral accumulates the raw error once per call to
/// [`Pid::calc_output`], and the derivative is the difference between
/// successive errors. Both therefore assume a fixed call rate, which the
/// main cyclic executive provides.
pub struct Pid {
    config: PidConfig,

    setpoint: f64,
    integral: f64,
    last_error: f64,

    /// Length of the current streak of consecutive in-band samples, clamped
    /// at `required_in_range`.
    in_range_count: u32,
    in_range: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pid {
    /// Create a new controller from the given configuration, with a zero
    /// setpoint and no accumulated state.
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            setpoint: 0.0,
            integral: 0.0,
            last_error: 0.0,
            in_range_count: 0,
            in_range: false,
        }
    }

    /// Set the setpoint the controller shall drive the measurement towards.
    ///
    /// Changing the setpoint does not clear the accumulated state, call
    /// [`Pid::reset`] when retargeting an already-used controller.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Get the current setpoint.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Override the acceptance band half-width from the parameter file value.
    pub fn set_acceptable_range(&mut self, range: f64) {
        self.config.acceptable_range = range;
    }

    /// Override the output clamp from the parameter file value.
    pub fn set_max_output(&mut self, max_output: f64) {
        self.config.max_output = max_output;
    }

    /// Calculate the controller output for the given measurement.
    ///
    /// This must be called exactly once per control cycle while the loop is
    /// active, as the integral and derivative terms are per-call.
    pub fn calc_output(&mut self, measured: f64) -> f64 {
        let error = if self.config.angle_wrap {
            wrap_signed_deg(self.setpoint, measured)
        } else {
            self.setpoint - measured
        };

        self.integral += error;

        let derivative = error - self.last_error;
        self.last_error = error;

        self.update_in_range(error, measured);

        let mut output = self.config.k_p * error
            + self.config.k_i * self.integral
            + self.config.k_d * derivative
            + self.config.k_ff * self.setpoint;

        if let Some(offset) = self.config.static_friction_offset {
            if output != 0.0 {
                output += offset.copysign(output);
            }
        }

        if output.abs() > self.config.max_output {
            output = self.config.max_output.copysign(output);
        }

        output
    }

    /// True if the measurement has been inside the acceptance band for the
    /// required number of consecutive samples.
    ///
    /// The flag is recomputed by each call to [`Pid::calc_output`], a single
    /// sample outside the band restarts the streak.
    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    /// Clear the accumulated integral, derivative and in-range state.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.in_range_count = 0;
        self.in_range = false;
    }

    fn update_in_range(&mut self, error: f64, measured: f64) {
        let in_band = if self.config.angle_wrap {
            error.abs() < self.config.acceptable_range
        } else {
            measured > self.setpoint - self.config.acceptable_range
                && measured < self.setpoint + self.config.acceptable_range
        };

        if in_band {
            if self.in_range_count < u32::MAX {
                self.in_range_count += 1;
            }
        } else {
            self.in_range_count = 0;
        }

        self.in_range = self.in_range_count > self.config.required_in_range.max(1) - 1;
    }
}

/// Shift a normalised power away from zero if it is too small to overcome
/// the drivetrain's static friction.
pub fn apply_friction_kick(power: f64) -> f64 {
    if power.abs() < FRICTION_KICK_THRESHOLD {
        power + FRICTION_KICK_POWER.copysign(power)
    } else {
        power
    }
}

fn default_max_output() -> f64 {
    1.0
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            k_p: 0.0,
            k_i: 0.0,
            k_d: 0.0,
            k_ff: 0.0,
            angle_wrap: false,
            acceptable_range: 0.0,
            required_in_range: 0,
            max_output: 1.0,
            static_friction_offset: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn p_only(k_p: f64) -> Pid {
        Pid::new(PidConfig {
            k_p,
            ..PidConfig::default()
        })
    }

    #[test]
    fn proportional_output() {
        let mut pid = p_only(0.5);
        pid.set_setpoint(2.0);

        assert!((pid.calc_output(0.0) - 1.0).abs() < 1e-12);
        assert!((pid.calc_output(1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn output_clamped_with_sign() {
        let mut pid = Pid::new(PidConfig {
            k_p: 1.0,
            max_output: 0.5,
            ..PidConfig::default()
        });

        pid.set_setpoint(10.0);
        assert!((pid.calc_output(0.0) - 0.5).abs() < 1e-12);

        pid.reset();
        pid.set_setpoint(-10.0);
        assert!((pid.calc_output(0.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn integral_accumulates_each_call() {
        let mut pid = Pid::new(PidConfig {
            k_i: 0.1,
            ..PidConfig::default()
        });
        pid.set_setpoint(1.0);

        // Constant error of 1.0 per call, so the integral term grows linearly
        assert!((pid.calc_output(0.0) - 0.1).abs() < 1e-12);
        assert!((pid.calc_output(0.0) - 0.2).abs() < 1e-12);
        assert!((pid.calc_output(0.0) - 0.3).abs() < 1e-12);

        pid.reset();
        assert!((pid.calc_output(0.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn derivative_is_error_difference() {
        let mut pid = Pid::new(PidConfig {
            k_d: 1.0,
            max_output: 10.0,
            ..PidConfig::default()
        });
        pid.set_setpoint(5.0);

        // First call: error 5, last error 0 -> derivative 5
        assert!((pid.calc_output(0.0) - 5.0).abs() < 1e-12);
        // Second call: error 3, last error 5 -> derivative -2
        assert!((pid.calc_output(2.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn feedforward_term_scales_setpoint() {
        let mut pid = Pid::new(PidConfig {
            k_ff: 0.25,
            max_output: 10.0,
            ..PidConfig::default()
        });
        pid.set_setpoint(4.0);

        assert!((pid.calc_output(4.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn angle_wrap_takes_short_way_round() {
        let mut pid = Pid::new(PidConfig {
            k_p: 1.0,
            angle_wrap: true,
            max_output: 360.0,
            ..PidConfig::default()
        });

        // 359 degrees is 1 degree short of the setpoint, not 359 past it
        pid.set_setpoint(0.0);
        assert!((pid.calc_output(359.0) - 1.0).abs() < 1e-9);

        pid.reset();
        pid.set_setpoint(179.0);
        assert!((pid.calc_output(-179.0) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn in_range_requires_consecutive_samples() {
        let mut pid = Pid::new(PidConfig {
            k_p: 1.0,
            acceptable_range: 0.5,
            required_in_range: 3,
            ..PidConfig::default()
        });
        pid.set_setpoint(1.0);

        pid.calc_output(1.1);
        assert!(!pid.is_in_range());
        pid.calc_output(0.9);
        assert!(!pid.is_in_range());
        pid.calc_output(1.0);
        assert!(pid.is_in_range());

        // A single excursion restarts the streak
        pid.calc_output(5.0);
        assert!(!pid.is_in_range());
        pid.calc_output(1.0);
        assert!(!pid.is_in_range());
    }

    #[test]
    fn in_range_single_sample_by_default() {
        let mut pid = Pid::new(PidConfig {
            k_p: 1.0,
            acceptable_range: 1.0,
            ..PidConfig::default()
        });
        pid.set_setpoint(0.0);

        pid.calc_output(0.5);
        assert!(pid.is_in_range());
        pid.calc_output(2.0);
        assert!(!pid.is_in_range());
    }

    #[test]
    fn friction_kick_below_threshold_only() {
        assert!((apply_friction_kick(0.1) - 0.4).abs() < 1e-12);
        assert!((apply_friction_kick(-0.1) + 0.4).abs() < 1e-12);
        assert!((apply_friction_kick(0.26) - 0.26).abs() < 1e-12);
        assert!((apply_friction_kick(-0.8) + 0.8).abs() < 1e-12);
    }

    #[test]
    fn static_friction_offset_shifts_output() {
        let mut pid = Pid::new(PidConfig {
            k_p: 0.1,
            static_friction_offset: Some(0.2),
            ..PidConfig::default()
        });

        pid.set_setpoint(1.0);
        assert!((pid.calc_output(0.0) - 0.3).abs() < 1e-12);

        pid.reset();
        pid.set_setpoint(-1.0);
        assert!((pid.calc_output(0.0) + 0.3).abs() < 1e-12);
    }
}
