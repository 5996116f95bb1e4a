//! # Vision Sensor Data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the vision target pipeline, valid for one control cycle.
///
/// Only the scalar horizontal offset of the detected target is consumed by
/// the core; frame processing happens upstream.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct VisionSensData {
    /// Horizontal angular offset of the target from the camera's crosshair in
    /// degrees. Positive when the target is to the right of the crosshair.
    pub target_offset_deg: f64,

    /// True if a valid target is currently detected. The offset is
    /// meaningless when this is false.
    pub has_target: bool,
}
