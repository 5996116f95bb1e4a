//! # Equipment Interface Crate
//!
//! This crate defines the data types passed between the motion-control core
//! (`bot_exec`) and the external equipment layer (motor/solenoid drivers,
//! vision pipeline, or the built-in simulation). The core never talks to
//! hardware directly, it only produces demand structures and consumes sensor
//! snapshots defined here.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod eqpt;
