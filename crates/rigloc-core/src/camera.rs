use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Invalid camera intrinsics matrix
    #[error("Invalid camera intrinsics matrix: {0}")]
    InvalidIntrinsics(String),
}

/// Radial distortion coefficients (k1, k2, k3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RadialDistortion {
    /// First radial coefficient.
    pub k1: f64,
    /// Second radial coefficient.
    pub k2: f64,
    /// Third radial coefficient.
    pub k3: f64,
}

impl RadialDistortion {
    /// Distortion with all coefficients set to zero.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if there is any distortion.
    pub fn has_distortion(&self) -> bool {
        self.k1 != 0.0 || self.k2 != 0.0 || self.k3 != 0.0
    }
}

/// Intrinsic parameters of a pinhole camera with radial distortion.
///
/// Every rig camera is internally pre-calibrated; feeds attach one of these
/// to each frame they produce.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Sensor width in pixels.
    pub width: usize,
    /// Sensor height in pixels.
    pub height: usize,
    /// Focal length in x direction
    pub fx: f64,
    /// Focal length in y direction
    pub fy: f64,
    /// Principal point x coordinate
    pub cx: f64,
    /// Principal point y coordinate
    pub cy: f64,
    /// Radial distortion coefficients.
    #[serde(default)]
    pub distortion: RadialDistortion,
}

impl CameraIntrinsics {
    /// Create camera intrinsics from sensor size, focal lengths and principal point.
    pub fn new(width: usize, height: usize, fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
            distortion: RadialDistortion::none(),
        }
    }

    /// Create camera intrinsics from a 3x3 intrinsics matrix.
    pub fn from_matrix(
        width: usize,
        height: usize,
        k: &[[f64; 3]; 3],
    ) -> Result<Self, CameraError> {
        if k[0][1] != 0.0 || k[1][0] != 0.0 || k[2][0] != 0.0 || k[2][1] != 0.0 || k[2][2] != 1.0 {
            return Err(CameraError::InvalidIntrinsics(
                "Intrinsics matrix must have form [[fx, 0, cx], [0, fy, cy], [0, 0, 1]]".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
            distortion: RadialDistortion::none(),
        })
    }

    /// Convert to a 3x3 intrinsics matrix.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_roundtrip() {
        let k = [[800.0, 0.0, 320.0], [0.0, 810.0, 240.0], [0.0, 0.0, 1.0]];
        let intrinsics = CameraIntrinsics::from_matrix(640, 480, &k).unwrap();
        assert_eq!(intrinsics.fx, 800.0);
        assert_eq!(intrinsics.cy, 240.0);
        assert_eq!(intrinsics.to_matrix(), k);
    }

    #[test]
    fn rejects_non_pinhole_matrix() {
        let k = [[800.0, 0.1, 320.0], [0.0, 810.0, 240.0], [0.0, 0.0, 1.0]];
        assert!(CameraIntrinsics::from_matrix(640, 480, &k).is_err());
    }

    #[test]
    fn distortion_flag() {
        let mut intrinsics = CameraIntrinsics::new(640, 480, 800.0, 800.0, 320.0, 240.0);
        assert!(!intrinsics.distortion.has_distortion());
        intrinsics.distortion.k1 = -0.1;
        assert!(intrinsics.distortion.has_distortion());
    }
}
