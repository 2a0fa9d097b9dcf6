use std::path::Path;

use rigloc_core::CameraIntrinsics;

use crate::error::FeedError;

/// Load a per-camera intrinsics calibration file.
pub fn load_intrinsics(path: impl AsRef<Path>) -> Result<CameraIntrinsics, FeedError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| FeedError::InvalidCalibration {
        path: path.to_path_buf(),
        source,
    })
}
