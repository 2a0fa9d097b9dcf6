use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// An error type for rig calibration handling.
#[derive(thiserror::Error, Debug)]
pub enum RigGeometryError {
    /// Error when reading the calibration file fails.
    #[error("Failed to read the rig calibration file. {0}")]
    Io(#[from] std::io::Error),

    /// Error when the calibration file cannot be parsed.
    #[error("Failed to parse the rig calibration file. {0}")]
    Parse(#[from] serde_json::Error),

    /// Error when the subpose count does not match the camera count.
    #[error("A rig of {cameras} cameras requires {expected} subposes, the calibration has {actual}")]
    SubposeCountMismatch {
        /// Number of cameras in the rig.
        cameras: usize,
        /// Expected number of subposes (cameras - 1).
        expected: usize,
        /// Number of subposes found in the calibration.
        actual: usize,
    },
}

/// On-disk shape of a rig calibration file.
#[derive(Serialize, Deserialize)]
struct RigCalibration {
    subposes: Vec<Pose>,
}

/// The fixed geometry of a camera rig.
///
/// Holds the relative transform of every non-reference camera with respect
/// to camera 0 (the rig reference frame). For a single-camera rig the
/// subpose list is empty. Loaded once at pipeline start, immutable after.
#[derive(Clone, Debug, Default)]
pub struct RigGeometry {
    subposes: Vec<Pose>,
}

impl RigGeometry {
    /// Geometry of a single-camera rig (no subposes).
    pub fn single_camera() -> Self {
        Self::default()
    }

    /// Build rig geometry for `num_cameras` cameras, enforcing the
    /// subpose-count invariant: exactly `num_cameras - 1` subposes, none
    /// for a single camera.
    pub fn new(subposes: Vec<Pose>, num_cameras: usize) -> Result<Self, RigGeometryError> {
        let expected = num_cameras.saturating_sub(1);
        if subposes.len() != expected {
            return Err(RigGeometryError::SubposeCountMismatch {
                cameras: num_cameras,
                expected,
                actual: subposes.len(),
            });
        }
        Ok(Self { subposes })
    }

    /// Load rig geometry for `num_cameras` cameras from a calibration file.
    pub fn load(path: impl AsRef<Path>, num_cameras: usize) -> Result<Self, RigGeometryError> {
        let content = std::fs::read_to_string(path)?;
        let calibration: RigCalibration = serde_json::from_str(&content)?;
        Self::new(calibration.subposes, num_cameras)
    }

    /// Write the geometry to a calibration file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RigGeometryError> {
        let calibration = RigCalibration {
            subposes: self.subposes.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&calibration)?)?;
        Ok(())
    }

    /// The subposes, in camera order 1..N-1.
    pub fn subposes(&self) -> &[Pose] {
        &self.subposes
    }

    /// Number of subposes held by the rig.
    pub fn num_subposes(&self) -> usize {
        self.subposes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn single_camera_has_no_subposes() {
        let rig = RigGeometry::new(vec![], 1).unwrap();
        assert_eq!(rig.num_subposes(), 0);
    }

    #[test]
    fn subpose_for_single_camera_is_rejected() {
        let err = RigGeometry::new(vec![Pose::IDENTITY], 1).unwrap_err();
        assert!(matches!(
            err,
            RigGeometryError::SubposeCountMismatch {
                cameras: 1,
                expected: 0,
                actual: 1,
            }
        ));
    }

    #[test]
    fn count_must_match_cameras() {
        assert!(RigGeometry::new(vec![Pose::IDENTITY], 2).is_ok());
        assert!(RigGeometry::new(vec![], 2).is_err());
        assert!(RigGeometry::new(vec![Pose::IDENTITY; 3], 3).is_err());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig_calibration.json");
        let rig = RigGeometry::new(
            vec![Pose::from_axis_angle(
                DVec3::Y,
                0.02,
                DVec3::new(0.12, 0.0, 0.0),
            )],
            2,
        )
        .unwrap();
        rig.save(&path).unwrap();

        let loaded = RigGeometry::load(&path, 2).unwrap();
        assert_eq!(loaded.num_subposes(), 1);
        assert!(loaded.subposes()[0].angular_distance(&rig.subposes()[0]) < 1e-12);

        // same file is a configuration error for a different camera count
        assert!(RigGeometry::load(&path, 3).is_err());
    }
}
