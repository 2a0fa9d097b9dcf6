use glam::{DMat4, DQuat, DVec3, DVec4};
use serde::{Deserialize, Serialize};

/// A rigid-body transform: rotation followed by translation.
///
/// A pose maps points from its local frame into the parent frame. Camera
/// poses throughout the pipeline are camera-to-world; subposes map a
/// camera frame into the rig reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Rotation part as a unit quaternion.
    pub rotation: DQuat,
    /// Translation part.
    pub translation: DVec3,
}

impl Pose {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a pose from a rotation and a translation.
    pub fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create a pose from an axis-angle rotation and a translation.
    pub fn from_axis_angle(axis: DVec3, angle: f64, translation: DVec3) -> Self {
        Self {
            rotation: DQuat::from_axis_angle(axis.normalize(), angle),
            translation,
        }
    }

    /// The inverse transform.
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.inverse();
        Self {
            rotation: inv_rot,
            translation: -(inv_rot * self.translation),
        }
    }

    /// Compose with another pose: `self * other` applies `other` first.
    pub fn compose(&self, other: &Pose) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.translation + self.rotation * other.translation,
        }
    }

    /// Transform a point from the local frame into the parent frame.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Angle in radians between the rotation parts of two poses.
    pub fn angular_distance(&self, other: &Pose) -> f64 {
        self.rotation.angle_between(other.rotation)
    }

    /// The pose as a 4x4 homogeneous matrix.
    pub fn as_matrix(&self) -> DMat4 {
        let mut matrix = DMat4::from_quat(self.rotation);
        matrix.w_axis = DVec4::new(
            self.translation.x,
            self.translation.y,
            self.translation.z,
            1.0,
        );
        matrix
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
