use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use rigloc_core::{CameraIntrinsics, Pose};

/// An error type for trajectory export.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Error to write the trajectory file.
    #[error("Failed to write the trajectory file. {0}")]
    Io(#[from] std::io::Error),

    /// Error to encode a keyframe.
    #[error("Failed to encode a keyframe. {0}")]
    Encode(#[from] serde_json::Error),
}

/// One exported trajectory sample.
#[derive(Clone, Debug, Serialize)]
pub struct Keyframe {
    /// Frame index the sample belongs to.
    pub frame_index: usize,
    /// The estimated pose.
    pub pose: Pose,
    /// Intrinsics of the producing camera.
    pub intrinsics: CameraIntrinsics,
    /// Root path of the media the frame came from.
    pub source: String,
}

/// Order-preserving sink for one trajectory track.
///
/// Implementations must keep a one-to-one correspondence between frame
/// index and emitted keyframe or gap, so downstream consumers can
/// reconstruct exactly which frames failed.
pub trait TrajectoryExporter {
    /// Append one keyframe to the track.
    fn add_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), ExportError>;

    /// Append an explicit gap marker for a frame without a pose.
    fn jump_keyframe(&mut self, frame_index: usize) -> Result<(), ExportError>;

    /// Flush any buffered output.
    fn finish(&mut self) -> Result<(), ExportError>;
}

/// Exporter that discards everything, used when no output is configured.
#[derive(Debug, Default)]
pub struct NoopExporter;

impl TrajectoryExporter for NoopExporter {
    fn add_keyframe(&mut self, _keyframe: &Keyframe) -> Result<(), ExportError> {
        Ok(())
    }

    fn jump_keyframe(&mut self, _frame_index: usize) -> Result<(), ExportError> {
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct GapRecord {
    frame_index: usize,
    gap: bool,
}

/// JSON-lines trajectory exporter: one object per frame index, either a
/// keyframe or a gap marker.
pub struct JsonTrajectoryExporter {
    writer: BufWriter<File>,
}

impl JsonTrajectoryExporter {
    /// Create the output file, truncating an existing one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl TrajectoryExporter for JsonTrajectoryExporter {
    fn add_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), ExportError> {
        let line = serde_json::to_string(keyframe)?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn jump_keyframe(&mut self, frame_index: usize) -> Result<(), ExportError> {
        let line = serde_json::to_string(&GapRecord {
            frame_index,
            gap: true,
        })?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// The rig track plus one track per camera, kept frame-aligned.
pub struct TrajectoryTracks {
    /// Track of the rig reference frame.
    pub rig: Box<dyn TrajectoryExporter>,
    /// Per-camera tracks, in camera order.
    pub cameras: Vec<Box<dyn TrajectoryExporter>>,
}

impl TrajectoryTracks {
    /// Tracks that discard everything.
    pub fn noop(num_cameras: usize) -> Self {
        Self {
            rig: Box::new(NoopExporter),
            cameras: (0..num_cameras)
                .map(|_| Box::new(NoopExporter) as Box<dyn TrajectoryExporter>)
                .collect(),
        }
    }

    /// Flush every track.
    pub fn finish(&mut self) -> Result<(), ExportError> {
        self.rig.finish()?;
        for track in &mut self.cameras {
            track.finish()?;
        }
        Ok(())
    }
}
