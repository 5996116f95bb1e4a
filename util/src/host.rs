//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the arcbot software tree.
///
/// The root is given by the `ARCBOT_SW_ROOT` environment variable, which must
/// point at the directory containing the `params` directory.
pub fn get_arcbot_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("ARCBOT_SW_ROOT")?))
}

/// Retrieve a short description of the host platform.
pub fn get_host_desc() -> String {
    format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH)
}
