//! Shared shoot stage used by all routines.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::mech::MechDems;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The shoot sequence: spin the shooter up, feed balls once it is at
/// speed, and stop everything after the time budget expires.
///
/// The budget runs from the first cycle the shooter reports at speed, so
/// the spin-up time does not eat into the indexing window. A shooter that
/// never reaches speed still ends the stage one budget after entry.
#[derive(Debug, Default)]
pub(super) struct ShootSeq {
    entry_time_s: Option<f64>,
    at_speed_time_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ShootSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one cycle, returning the mechanism demands and a completion
    /// flag.
    pub fn step(&mut self, time_s: f64, shooter_at_speed: bool, timeout_s: f64) -> (MechDems, bool) {
        let entry_time_s = *self.entry_time_s.get_or_insert(time_s);

        if shooter_at_speed && self.at_speed_time_s.is_none() {
            self.at_speed_time_s = Some(time_s);
        }

        let budget_start_s = self.at_speed_time_s.unwrap_or(entry_time_s);

        if time_s - budget_start_s > timeout_s {
            return (MechDems::all_stop(), true);
        }

        let mech = MechDems {
            shooter_run: true,
            indexer_run: shooter_at_speed,
            ..MechDems::default()
        };

        (mech, false)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
