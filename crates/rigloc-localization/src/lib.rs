#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// The rig localization engine contract and backend selection.
pub mod engine;

/// Robust-estimator kinds and threshold validation.
pub mod estimator;

/// Map loading: the pre-built 3D map the rig is localized against.
pub mod map;

/// Immutable localization parameters and describer configuration.
pub mod params;

/// Per-camera and rig localization outcomes.
pub mod result;

/// Global appearance descriptors and similarity scoring.
pub mod retrieval;

/// The tag-based localization backend.
pub mod tag;

/// The retrieval-based localization backend.
pub mod voctree;

pub use engine::{build_localizer, RigLocalizer};
pub use estimator::{validate_threshold, EstimatorError, RobustEstimatorKind};
pub use map::{MapData, MapError, MapKeyframe};
pub use params::{DescriberType, FeaturePreset, LocalizerParameters, ParamsError};
pub use result::{CameraLocalization, RigLocalization};
pub use tag::TagRigLocalizer;
pub use voctree::{RetrievalAlgorithm, RetrievalConfig, VoctreeRigLocalizer};
