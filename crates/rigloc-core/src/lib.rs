#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics with radial distortion.
pub mod camera;

/// Single-channel image buffer shared across the pipeline.
pub mod image;

/// Rigid-body pose type and composition helpers.
pub mod pose;

/// Rig geometry: the relative subposes between the rig cameras.
pub mod rig;

pub use camera::{CameraError, CameraIntrinsics, RadialDistortion};
pub use image::{GrayImage, ImageError, ImageSize};
pub use pose::Pose;
pub use rig::{RigGeometry, RigGeometryError};
