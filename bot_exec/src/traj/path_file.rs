//! Path file loading.
//!
//! Paths may be planned offline and stored as plain CSV, one point per
//! line with three fields: `x_m, y_m, heading_rad`. The first line is the
//! start pose, the last line is the end pose, and any lines between are
//! interior waypoints (their heading field is read but unused, as interior
//! headings are chosen by the spline fit).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use csv::ReaderBuilder;
use std::path::Path;

// Internal
use super::PathSpec;
use crate::loc::Pose;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a path file.
#[derive(Debug, thiserror::Error)]
pub enum PathFileError {
    #[error("Failed to read path file: {0}")]
    ReadError(#[from] csv::Error),

    #[error("Line {0}: expected 3 fields (x, y, heading), got {1}")]
    WrongFieldCount(usize, usize),

    #[error("Line {0}: invalid number: {1}")]
    InvalidNumber(usize, std::num::ParseFloatError),

    #[error("Path file must contain at least 2 points, got {0}")]
    TooFewPoints(usize),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a [`PathSpec`] from a CSV path file, attaching the given kinematic
/// constraints.
pub fn load(
    file_path: &Path,
    max_vel_ms: f64,
    max_acc_mss: f64,
    max_volts: f64,
) -> Result<PathSpec, PathFileError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file_path)?;

    let mut points: Vec<[f64; 3]> = vec![];

    for (line, record) in reader.records().enumerate() {
        let record = record?;

        if record.len() != 3 {
            return Err(PathFileError::WrongFieldCount(line + 1, record.len()));
        }

        let mut fields = [0.0; 3];
        for (i, field) in record.iter().enumerate() {
            fields[i] = field
                .parse::<f64>()
                .map_err(|e| PathFileError::InvalidNumber(line + 1, e))?;
        }

        points.push(fields);
    }

    if points.len() < 2 {
        return Err(PathFileError::TooFewPoints(points.len()));
    }

    let start = points[0];
    let end = points[points.len() - 1];

    let mut spec = PathSpec::new(
        Pose::new(start[0], start[1], start[2]),
        Pose::new(end[0], end[1], end[2]),
        max_vel_ms,
        max_acc_mss,
        max_volts,
    );

    for point in &points[1..points.len() - 1] {
        spec = spec.with_waypoint(point[0], point[1]);
    }

    Ok(spec)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_start_waypoints_and_end() {
        let path = write_temp(
            "bot_exec_path_file_ok.csv",
            "0.0, 0.0, 0.0\n1.5, 0.5, 0.0\n3.0, 1.0, 1.5708\n",
        );

        let spec = load(&path, 2.0, 1.5, 10.0).unwrap();

        assert!((spec.start_pose.position_m.x).abs() < 1e-12);
        assert_eq!(spec.waypoints.len(), 1);
        assert!((spec.waypoints[0].x - 1.5).abs() < 1e-12);
        assert!((spec.end_pose.position_m.x - 3.0).abs() < 1e-12);
        assert!((spec.end_pose.heading_rad - 1.5708).abs() < 1e-12);
        assert!((spec.max_vel_ms - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_short_files() {
        let path = write_temp("bot_exec_path_file_short.csv", "0.0, 0.0, 0.0\n");
        assert!(matches!(
            load(&path, 2.0, 1.5, 10.0),
            Err(PathFileError::TooFewPoints(1))
        ));
    }

    #[test]
    fn rejects_malformed_fields() {
        let path = write_temp("bot_exec_path_file_bad.csv", "0.0, 0.0, 0.0\n1.0, abc, 0.0\n");
        assert!(matches!(
            load(&path, 2.0, 1.5, 10.0),
            Err(PathFileError::InvalidNumber(2, _))
        ));

        let path = write_temp("bot_exec_path_file_fields.csv", "0.0, 0.0\n1.0, 1.0, 0.0\n");
        assert!(matches!(
            load(&path, 2.0, 1.5, 10.0),
            Err(PathFileError::WrongFieldCount(1, 2))
        ));
    }
}
