#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for pipeline construction and the frame loop.
pub mod error;

/// Trajectory export: keyframes, gap markers and the bundled exporters.
pub mod export;

/// The orchestrator driving the synchronized frame loop.
pub mod pipeline;

/// The append-only per-frame result log.
pub mod result_log;

/// Running duration statistics.
pub mod stats;

pub use error::PipelineError;
pub use export::{
    ExportError, JsonTrajectoryExporter, Keyframe, NoopExporter, TrajectoryExporter,
    TrajectoryTracks,
};
pub use pipeline::{RigPipeline, RunOutcome, RunReport};
pub use result_log::{FrameResult, ResultLog};
pub use stats::DurationStats;
