//! # Vision alignment module
//!
//! Turns the robot to zero the angular offset of the vision target. The
//! loop output is a turn-only drive command; a debounce counter is
//! provided for routines that must be confident the alignment has settled
//! rather than momentarily crossed the target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::ctrl::{apply_friction_kick, Pid};
use eqpt_if::eqpt::drive::DriveCmd;
use eqpt_if::eqpt::vision::VisionSensData;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vision alignment controller.
pub struct VisAlign {
    debounce_threshold: u32,

    pid: Pid,

    /// Debounce counter, counts up on aligned samples and down otherwise,
    /// clamped to [0, debounce_threshold].
    debounce_count: u32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum VisAlignError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VisAlign {
    /// Initialise the vision alignment module from the given parameter
    /// file.
    pub fn init(params_path: &str) -> Result<Self, VisAlignError> {
        let params: Params = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(VisAlignError::ParamLoadError(e)),
        };

        Ok(Self::new(params))
    }

    pub fn new(params: Params) -> Self {
        Self {
            debounce_threshold: params.debounce_threshold,
            pid: Pid::new(params.align_pid),
            debounce_count: 0,
        }
    }

    /// Process one alignment cycle.
    ///
    /// Returns the drive command and a single-sample aligned flag: the
    /// loop is inside its acceptance band *and* a target is visible. The
    /// flag is raw, pass it through [`VisAlign::debounce_step`] when a
    /// settled alignment is needed.
    pub fn proc(&mut self, vision: &VisionSensData) -> (DriveCmd, bool) {
        // Positive offset means the target is to the right, which needs a
        // negative (clockwise) turn, the loop's sign convention handles
        // this as the setpoint is zero
        let power = apply_friction_kick(self.pid.calc_output(vision.target_offset_deg));

        let aligned = self.pid.is_in_range() && vision.has_target;

        if aligned {
            (DriveCmd::Stop, true)
        } else {
            (
                DriveCmd::Arcade {
                    forward: 0.0,
                    turn: power,
                },
                false,
            )
        }
    }

    /// Update the debounce counter with this cycle's aligned flag.
    ///
    /// Returns true once the counter has reached the threshold, i.e. the
    /// alignment has been held for long enough net of any dropouts.
    pub fn debounce_step(&mut self, aligned: bool) -> bool {
        if aligned {
            if self.debounce_count < self.debounce_threshold {
                self.debounce_count += 1;
            }
        } else {
            self.debounce_count = self.debounce_count.saturating_sub(1);
        }

        self.debounce_count >= self.debounce_threshold
    }

    /// Clear the loop state and the debounce counter.
    pub fn reset(&mut self) {
        self.pid.reset();
        self.debounce_count = 0;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctrl::PidConfig;

    fn test_align() -> VisAlign {
        VisAlign::new(Params {
            align_pid: PidConfig {
                k_p: 0.027,
                acceptable_range: 1.9,
                ..PidConfig::default()
            },
            debounce_threshold: 7,
        })
    }

    fn vision(offset_deg: f64, has_target: bool) -> VisionSensData {
        VisionSensData {
            target_offset_deg: offset_deg,
            has_target,
        }
    }

    #[test]
    fn turns_clockwise_for_target_on_right() {
        let mut va = test_align();

        let (cmd, aligned) = va.proc(&vision(15.0, true));
        assert!(!aligned);
        match cmd {
            DriveCmd::Arcade { forward, turn } => {
                assert!(forward == 0.0);
                assert!(turn < 0.0);
            }
            other => panic!("expected Arcade, got {:?}", other),
        }
    }

    #[test]
    fn aligned_needs_target_visible() {
        let mut va = test_align();

        let (cmd, aligned) = va.proc(&vision(0.5, true));
        assert!(aligned);
        assert_eq!(cmd, DriveCmd::Stop);

        // Same offset without a target is not aligned
        va.reset();
        let (_, aligned) = va.proc(&vision(0.5, false));
        assert!(!aligned);
    }

    #[test]
    fn debounce_counts_up_and_down() {
        let mut va = test_align();

        // Six aligned samples are not enough
        for _ in 0..6 {
            assert!(!va.debounce_step(true));
        }

        // A dropout costs one sample, so two more are needed
        assert!(!va.debounce_step(false));
        assert!(!va.debounce_step(true));
        assert!(va.debounce_step(true));
    }

    #[test]
    fn alternating_alignment_never_settles() {
        let mut va = test_align();

        // Every dropout cancels an aligned sample, so a strictly
        // alternating stream never accumulates the seven needed
        for _ in 0..50 {
            assert!(!va.debounce_step(true));
            assert!(!va.debounce_step(false));
        }
    }

    #[test]
    fn debounce_counter_clamps_at_zero() {
        let mut va = test_align();

        for _ in 0..5 {
            assert!(!va.debounce_step(false));
        }
        // Still exactly seven samples from the threshold
        for _ in 0..6 {
            assert!(!va.debounce_step(true));
        }
        assert!(va.debounce_step(true));
    }

    #[test]
    fn reset_clears_debounce() {
        let mut va = test_align();

        for _ in 0..7 {
            va.debounce_step(true);
        }
        assert!(va.debounce_step(true));

        va.reset();
        assert!(!va.debounce_step(true));
    }
}
