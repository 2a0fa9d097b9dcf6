use std::time::Instant;

use rigloc_core::RigGeometry;
use rigloc_dataio::{FeedSet, FrameSet};
use rigloc_localization::{LocalizerParameters, RigLocalization, RigLocalizer};

use crate::error::PipelineError;
use crate::export::{ExportError, Keyframe, TrajectoryTracks};
use crate::result_log::{FrameResult, ResultLog};

/// Terminal state of a pipeline run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The primary feed ran out of frames.
    Completed,
    /// A fatal mid-stream error stopped the loop.
    Aborted(PipelineError),
}

/// The result of a pipeline run: the per-frame log plus how the run
/// ended. An aborted run still carries everything accumulated before the
/// abort.
#[derive(Debug)]
pub struct RunReport {
    /// The per-frame log with its duration statistics.
    pub log: ResultLog,
    /// How the run ended.
    pub outcome: RunOutcome,
}

impl RunReport {
    /// Whether the stream ended normally.
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    /// Log the end-of-run summary block.
    pub fn log_summary(&self) {
        let stats = self.log.stats();
        log::info!(
            "Localized {} / {} frames",
            self.log.frames_localized(),
            self.log.len()
        );
        log::info!("Processing took {:.3} s overall", stats.sum().as_secs_f64());
        if let (Some(mean), Some(max), Some(min)) = (stats.mean(), stats.max(), stats.min()) {
            log::info!("Mean time for localization: {} ms", mean.as_millis());
            log::info!("Max time for localization: {} ms", max.as_millis());
            log::info!("Min time for localization: {} ms", min.as_millis());
        }
    }
}

/// The rig localization orchestrator.
///
/// Owns the synchronized feeds, the rig geometry, the engine and the
/// trajectory tracks; construction validates the whole configuration so
/// the frame loop can only fail on mid-stream faults. The loop itself is
/// strictly sequential: acquisition, the blocking engine call, result
/// recording and export never overlap across frames.
pub struct RigPipeline {
    feeds: FeedSet,
    rig: RigGeometry,
    localizer: Box<dyn RigLocalizer>,
    params: LocalizerParameters,
    media_roots: Vec<String>,
    tracks: TrajectoryTracks,
}

impl RigPipeline {
    /// Validate the configuration and assemble the pipeline.
    pub fn new(
        feeds: FeedSet,
        rig: RigGeometry,
        localizer: Box<dyn RigLocalizer>,
        params: LocalizerParameters,
        media_roots: Vec<String>,
        tracks: TrajectoryTracks,
    ) -> Result<Self, PipelineError> {
        let cameras = feeds.num_cameras();
        if cameras == 0 {
            return Err(PipelineError::NoCameras);
        }
        if rig.num_subposes() != cameras - 1 {
            return Err(PipelineError::SubposeCountMismatch {
                cameras,
                subposes: rig.num_subposes(),
            });
        }
        if tracks.cameras.len() != cameras {
            return Err(PipelineError::TrackCountMismatch {
                cameras,
                tracks: tracks.cameras.len(),
            });
        }
        if media_roots.len() != cameras {
            return Err(PipelineError::MediaRootCountMismatch {
                cameras,
                roots: media_roots.len(),
            });
        }
        if !localizer.is_initialized() {
            return Err(PipelineError::EngineNotInitialized);
        }
        Ok(Self {
            feeds,
            rig,
            localizer,
            params,
            media_roots,
            tracks,
        })
    }

    /// Drive the frame loop until the stream ends or a fatal error stops
    /// it. Per-frame localization failure is recorded and the loop goes
    /// on; only acquisition and export faults abort.
    pub fn run(mut self) -> RunReport {
        let mut log = ResultLog::new();

        let outcome = loop {
            let frame_index = log.len();
            let frame_set = match self.feeds.read_synchronized() {
                Ok(Some(frame_set)) => frame_set,
                Ok(None) => break RunOutcome::Completed,
                Err(err) => break RunOutcome::Aborted(err.into()),
            };

            log::info!("frame {frame_index:04}");
            let started = Instant::now();
            let localization = self.localizer.localize_rig(
                &frame_set.images,
                &self.params,
                &frame_set.intrinsics,
                self.rig.subposes(),
            );
            let elapsed = started.elapsed();
            log::info!("localization took {} ms", elapsed.as_millis());
            if !localization.localized {
                log::warn!("unable to localize frame {frame_index}");
            }

            log.record(FrameResult {
                frame_index,
                localized: localization.localized,
                rig_pose: localization.rig_pose,
                cameras: localization.cameras.clone(),
                elapsed,
            });

            if let Err(err) = forward_to_tracks(
                &mut self.tracks,
                frame_index,
                &localization,
                &frame_set,
                &self.media_roots,
            ) {
                break RunOutcome::Aborted(err.into());
            }
        };

        let outcome = match (outcome, self.tracks.finish()) {
            (RunOutcome::Completed, Err(err)) => RunOutcome::Aborted(err.into()),
            (outcome, Err(err)) => {
                log::warn!("failed to flush the trajectory tracks: {err}");
                outcome
            }
            (outcome, Ok(())) => outcome,
        };

        RunReport { log, outcome }
    }
}

/// Forward one frame outcome to every track: a keyframe per track on
/// success, a gap marker per track otherwise, so all tracks stay aligned
/// with the frame index.
fn forward_to_tracks(
    tracks: &mut TrajectoryTracks,
    frame_index: usize,
    localization: &RigLocalization,
    frame_set: &FrameSet,
    media_roots: &[String],
) -> Result<(), ExportError> {
    match localization.rig_pose {
        Some(rig_pose) if localization.localized => {
            tracks.rig.add_keyframe(&Keyframe {
                frame_index,
                pose: rig_pose,
                intrinsics: frame_set.intrinsics[0],
                source: media_roots[0].clone(),
            })?;
        }
        _ => tracks.rig.jump_keyframe(frame_index)?,
    }

    for (camera, track) in tracks.cameras.iter_mut().enumerate() {
        let camera_pose = localization
            .cameras
            .get(camera)
            .and_then(|localization| localization.pose);
        match camera_pose {
            Some(pose) if localization.localized => track.add_keyframe(&Keyframe {
                frame_index,
                pose,
                intrinsics: frame_set.intrinsics[camera],
                source: media_roots[camera].clone(),
            })?,
            _ => track.jump_keyframe(frame_index)?,
        }
    }
    Ok(())
}
