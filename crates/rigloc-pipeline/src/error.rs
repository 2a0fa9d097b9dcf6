use rigloc_dataio::FeedError;

use crate::export::ExportError;

/// An error type for pipeline construction and the frame loop.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The rig has no camera feeds at all.
    #[error("The rig needs at least one camera feed")]
    NoCameras,

    /// The rig geometry does not match the number of feeds.
    #[error("{cameras} camera feeds but {subposes} rig subposes")]
    SubposeCountMismatch {
        /// Number of camera feeds.
        cameras: usize,
        /// Number of subposes in the rig geometry.
        subposes: usize,
    },

    /// The trajectory tracks do not match the number of feeds.
    #[error("{cameras} camera feeds but {tracks} camera trajectory tracks")]
    TrackCountMismatch {
        /// Number of camera feeds.
        cameras: usize,
        /// Number of per-camera trajectory tracks.
        tracks: usize,
    },

    /// The media source paths do not match the number of feeds.
    #[error("{cameras} camera feeds but {roots} media source paths")]
    MediaRootCountMismatch {
        /// Number of camera feeds.
        cameras: usize,
        /// Number of media source paths.
        roots: usize,
    },

    /// The localization engine reported itself unusable.
    #[error("The localization engine failed to initialize")]
    EngineNotInitialized,

    /// A fatal frame acquisition error.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A fatal trajectory export error.
    #[error(transparent)]
    Export(#[from] ExportError),
}
