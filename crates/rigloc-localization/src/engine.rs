use rigloc_core::{CameraIntrinsics, GrayImage, Pose};

use crate::map::MapData;
use crate::params::{DescriberType, LocalizerParameters};
use crate::result::RigLocalization;
use crate::tag::TagRigLocalizer;
use crate::voctree::{RetrievalConfig, VoctreeRigLocalizer};

/// A pose-localization engine for the whole rig.
///
/// The call is blocking and may take seconds per frame. Per-frame failure
/// is reported through the returned [`RigLocalization`], never as an
/// error; fatal conditions belong to engine construction.
pub trait RigLocalizer {
    /// Whether construction produced a usable engine.
    fn is_initialized(&self) -> bool;

    /// Localize one synchronized frame set against the map.
    ///
    /// `images`, `intrinsics` are in camera order; `subposes` holds the
    /// transforms of cameras 1..N-1 relative to camera 0.
    fn localize_rig(
        &mut self,
        images: &[GrayImage],
        params: &LocalizerParameters,
        intrinsics: &[CameraIntrinsics],
        subposes: &[Pose],
    ) -> RigLocalization;
}

/// Build the engine matching the configured describer types.
///
/// The tag-based backend is chosen when exactly one describer type is
/// configured and it is a fiducial tag family; every other configuration
/// localizes through the retrieval-based backend. The choice is made once
/// at startup and never revisited mid-stream.
pub fn build_localizer(
    map: MapData,
    describers: &[DescriberType],
    retrieval: RetrievalConfig,
) -> Box<dyn RigLocalizer> {
    let use_tags = describers.len() == 1 && describers[0].is_tag();
    if use_tags {
        log::info!("Localizing sequence using the tag-based localizer");
        Box::new(TagRigLocalizer::new(map))
    } else {
        log::info!("Localizing sequence using the retrieval-based localizer");
        Box::new(VoctreeRigLocalizer::new(map, retrieval))
    }
}
