use rigloc_core::{CameraIntrinsics, GrayImage, Pose};

use crate::engine::RigLocalizer;
use crate::map::MapData;
use crate::params::LocalizerParameters;
use crate::result::RigLocalization;

/// Tag-based rig localization backend.
///
/// Implements the engine contract for fiducial-tag describer
/// configurations. This build bundles no tag detector, so every frame is
/// reported as not localized; a detector-equipped engine replaces this
/// type behind the same trait instead of a compile-time switch.
pub struct TagRigLocalizer {
    map: MapData,
}

impl TagRigLocalizer {
    /// Build the backend over a loaded map.
    pub fn new(map: MapData) -> Self {
        Self { map }
    }
}

impl RigLocalizer for TagRigLocalizer {
    fn is_initialized(&self) -> bool {
        !self.map.is_empty()
    }

    fn localize_rig(
        &mut self,
        images: &[GrayImage],
        _params: &LocalizerParameters,
        _intrinsics: &[CameraIntrinsics],
        _subposes: &[Pose],
    ) -> RigLocalization {
        log::debug!("no tag detector bundled, reporting the frame as not localized");
        RigLocalization::not_localized(images.len())
    }
}
