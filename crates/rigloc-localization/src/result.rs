use rigloc_core::Pose;

/// Localization outcome for a single camera of the rig.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraLocalization {
    /// Estimated camera-to-world pose, absent when this camera failed.
    pub pose: Option<Pose>,
    /// Confidence of the match in `[0, 1]`.
    pub score: f64,
    /// Identifier of the matched map keyframe, when any.
    pub matched_keyframe: Option<String>,
}

impl CameraLocalization {
    /// An outcome for a camera that could not be localized.
    pub fn failed() -> Self {
        Self {
            pose: None,
            score: 0.0,
            matched_keyframe: None,
        }
    }

    /// Whether this camera produced a pose.
    pub fn is_valid(&self) -> bool {
        self.pose.is_some()
    }
}

/// Localization outcome for one synchronized frame set of the whole rig.
#[derive(Clone, Debug, PartialEq)]
pub struct RigLocalization {
    /// Whether the rig as a whole was localized.
    pub localized: bool,
    /// Estimated rig pose (reference-camera frame to world), absent on
    /// failure.
    pub rig_pose: Option<Pose>,
    /// Per-camera outcomes, in camera order.
    pub cameras: Vec<CameraLocalization>,
}

impl RigLocalization {
    /// A failed outcome carrying one failed entry per camera.
    pub fn not_localized(num_cameras: usize) -> Self {
        Self {
            localized: false,
            rig_pose: None,
            cameras: vec![CameraLocalization::failed(); num_cameras],
        }
    }
}
