//! # Equipment module
//!
//! Splits the equipment interface into the different systems on the robot.

pub mod drive;
pub mod mech;
pub mod nav;
pub mod vision;
