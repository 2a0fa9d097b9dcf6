use std::time::Duration;

use rigloc_core::Pose;
use rigloc_localization::CameraLocalization;

use crate::stats::DurationStats;

/// Localization outcome of one synchronized frame set.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    /// Zero-based frame index, monotonic over the stream.
    pub frame_index: usize,
    /// Whether the rig as a whole was localized.
    pub localized: bool,
    /// Estimated rig pose, absent on failure.
    pub rig_pose: Option<Pose>,
    /// Per-camera outcomes, in camera order.
    pub cameras: Vec<CameraLocalization>,
    /// Wall-clock duration of the localization call.
    pub elapsed: Duration,
}

/// Append-only, ordered-by-frame-index record of every attempted frame.
///
/// Failed frames are recorded too (with an absent pose), and their
/// durations feed the statistics accumulator just like successful ones.
#[derive(Clone, Debug, Default)]
pub struct ResultLog {
    entries: Vec<FrameResult>,
    stats: DurationStats,
}

impl ResultLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame result and record its duration.
    pub fn record(&mut self, result: FrameResult) {
        self.stats.record(result.elapsed);
        self.entries.push(result);
    }

    /// The recorded entries, in frame order.
    pub fn entries(&self) -> &[FrameResult] {
        &self.entries
    }

    /// Number of attempted frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no frame was attempted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of frames the rig was localized in.
    pub fn frames_localized(&self) -> usize {
        self.entries.iter().filter(|entry| entry.localized).count()
    }

    /// The duration statistics over all attempted frames.
    pub fn stats(&self) -> &DurationStats {
        &self.stats
    }
}
