use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rigloc_core::{CameraIntrinsics, GrayImage, ImageSize, Pose, RigGeometry};
use rigloc_dataio::{CameraFeed, FeedError, FeedFrame, FeedSet, MemoryFeed};
use rigloc_localization::{
    CameraLocalization, LocalizerParameters, RigLocalization, RigLocalizer,
};
use rigloc_pipeline::{
    ExportError, Keyframe, PipelineError, RigPipeline, RunOutcome, TrajectoryExporter,
    TrajectoryTracks,
};

/// Engine double that replays a fixed sequence of outcomes.
struct ScriptedLocalizer {
    initialized: bool,
    outcomes: VecDeque<RigLocalization>,
}

impl ScriptedLocalizer {
    fn new(outcomes: Vec<RigLocalization>) -> Self {
        Self {
            initialized: true,
            outcomes: outcomes.into(),
        }
    }

    fn uninitialized() -> Self {
        Self {
            initialized: false,
            outcomes: VecDeque::new(),
        }
    }
}

impl RigLocalizer for ScriptedLocalizer {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn localize_rig(
        &mut self,
        images: &[GrayImage],
        _params: &LocalizerParameters,
        _intrinsics: &[CameraIntrinsics],
        _subposes: &[Pose],
    ) -> RigLocalization {
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| RigLocalization::not_localized(images.len()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum TrackEvent {
    Keyframe(usize),
    Gap(usize),
}

/// Exporter double that records every event it receives.
#[derive(Clone, Default)]
struct RecordingExporter {
    events: Arc<Mutex<Vec<TrackEvent>>>,
}

impl TrajectoryExporter for RecordingExporter {
    fn add_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), ExportError> {
        self.events
            .lock()
            .unwrap()
            .push(TrackEvent::Keyframe(keyframe.frame_index));
        Ok(())
    }

    fn jump_keyframe(&mut self, frame_index: usize) -> Result<(), ExportError> {
        self.events
            .lock()
            .unwrap()
            .push(TrackEvent::Gap(frame_index));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}

fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::new(8, 8, 8.0, 8.0, 4.0, 4.0)
}

fn frame(camera: usize, index: usize) -> FeedFrame {
    FeedFrame {
        image: GrayImage::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            index as u8,
        ),
        intrinsics: Some(intrinsics()),
        id: format!("cam{camera}/frame{index}"),
    }
}

fn feed_set(frames_per_camera: &[usize]) -> FeedSet {
    FeedSet::new(
        frames_per_camera
            .iter()
            .enumerate()
            .map(|(camera, &frames)| {
                Box::new(MemoryFeed::new(
                    (0..frames).map(|index| frame(camera, index)).collect(),
                )) as Box<dyn CameraFeed>
            })
            .collect(),
    )
}

fn rig_geometry(num_cameras: usize) -> RigGeometry {
    RigGeometry::new(vec![Pose::IDENTITY; num_cameras - 1], num_cameras).unwrap()
}

fn localized(num_cameras: usize) -> RigLocalization {
    RigLocalization {
        localized: true,
        rig_pose: Some(Pose::IDENTITY),
        cameras: vec![
            CameraLocalization {
                pose: Some(Pose::IDENTITY),
                score: 1.0,
                matched_keyframe: Some("kf0".to_string()),
            };
            num_cameras
        ],
    }
}

fn media_roots(num_cameras: usize) -> Vec<String> {
    (0..num_cameras).map(|c| format!("/data/cam{c}")).collect()
}

fn params() -> LocalizerParameters {
    LocalizerParameters::default().validated().unwrap()
}

#[test]
fn attempts_every_synchronized_frame() {
    let pipeline = RigPipeline::new(
        feed_set(&[3, 3]),
        rig_geometry(2),
        Box::new(ScriptedLocalizer::new(vec![localized(2); 3])),
        params(),
        media_roots(2),
        TrajectoryTracks::noop(2),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(report.is_completed());
    assert_eq!(report.log.len(), 3);
    assert_eq!(report.log.frames_localized(), 3);
    assert_eq!(report.log.stats().count(), 3);
    let indices: Vec<usize> = report
        .log
        .entries()
        .iter()
        .map(|entry| entry.frame_index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn empty_primary_feed_completes_with_no_frames() {
    let pipeline = RigPipeline::new(
        feed_set(&[0]),
        RigGeometry::single_camera(),
        Box::new(ScriptedLocalizer::new(vec![])),
        params(),
        media_roots(1),
        TrajectoryTracks::noop(1),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(report.is_completed());
    assert!(report.log.is_empty());
    assert!(report.log.stats().mean().is_none());
}

#[test]
fn per_frame_failure_is_recorded_not_fatal() {
    let outcomes = vec![
        localized(1),
        RigLocalization::not_localized(1),
        localized(1),
    ];
    let pipeline = RigPipeline::new(
        feed_set(&[3]),
        RigGeometry::single_camera(),
        Box::new(ScriptedLocalizer::new(outcomes)),
        params(),
        media_roots(1),
        TrajectoryTracks::noop(1),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(report.is_completed());
    assert_eq!(report.log.len(), 3);
    assert_eq!(report.log.frames_localized(), 2);
    assert!(report.log.entries()[1].rig_pose.is_none());
    assert!(!report.log.entries()[1].localized);
    // a failed frame still consumes engine time and is counted
    assert_eq!(report.log.stats().count(), 3);
}

#[test]
fn desync_aborts_and_keeps_partial_statistics() {
    let pipeline = RigPipeline::new(
        feed_set(&[3, 2]),
        rig_geometry(2),
        Box::new(ScriptedLocalizer::new(vec![localized(2); 3])),
        params(),
        media_roots(2),
        TrajectoryTracks::noop(2),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(matches!(
        report.outcome,
        RunOutcome::Aborted(PipelineError::Feed(FeedError::Desync {
            camera: 1,
            frame: 2
        }))
    ));
    // frames 0 and 1 were attempted before the desync
    assert_eq!(report.log.len(), 2);
    assert_eq!(report.log.stats().count(), 2);
}

#[test]
fn missing_intrinsics_aborts_immediately() {
    let uncalibrated = FeedFrame {
        intrinsics: None,
        ..frame(0, 0)
    };
    let feeds = FeedSet::new(vec![
        Box::new(MemoryFeed::new(vec![uncalibrated])) as Box<dyn CameraFeed>
    ]);
    let pipeline = RigPipeline::new(
        feeds,
        RigGeometry::single_camera(),
        Box::new(ScriptedLocalizer::new(vec![localized(1)])),
        params(),
        media_roots(1),
        TrajectoryTracks::noop(1),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(matches!(
        report.outcome,
        RunOutcome::Aborted(PipelineError::Feed(FeedError::MissingIntrinsics {
            camera: 0,
            ..
        }))
    ));
    assert!(report.log.is_empty());
}

#[test]
fn gap_markers_stay_frame_aligned() {
    let failed_frames = [1usize, 3];
    let outcomes: Vec<RigLocalization> = (0..5)
        .map(|index| {
            if failed_frames.contains(&index) {
                RigLocalization::not_localized(2)
            } else {
                localized(2)
            }
        })
        .collect();

    let rig_track = RecordingExporter::default();
    let camera_tracks = [RecordingExporter::default(), RecordingExporter::default()];
    let tracks = TrajectoryTracks {
        rig: Box::new(rig_track.clone()),
        cameras: camera_tracks
            .iter()
            .map(|track| Box::new(track.clone()) as Box<dyn TrajectoryExporter>)
            .collect(),
    };

    let pipeline = RigPipeline::new(
        feed_set(&[5, 5]),
        rig_geometry(2),
        Box::new(ScriptedLocalizer::new(outcomes)),
        params(),
        media_roots(2),
        tracks,
    )
    .unwrap();

    let report = pipeline.run();
    assert!(report.is_completed());

    let expected: Vec<TrackEvent> = (0..5)
        .map(|index| {
            if failed_frames.contains(&index) {
                TrackEvent::Gap(index)
            } else {
                TrackEvent::Keyframe(index)
            }
        })
        .collect();
    assert_eq!(*rig_track.events.lock().unwrap(), expected);
    for track in &camera_tracks {
        assert_eq!(*track.events.lock().unwrap(), expected);
    }
}

#[test]
fn replaying_identical_outcomes_is_deterministic() {
    let outcomes = vec![
        localized(2),
        RigLocalization::not_localized(2),
        localized(2),
    ];

    let run = |outcomes: Vec<RigLocalization>| {
        RigPipeline::new(
            feed_set(&[3, 3]),
            rig_geometry(2),
            Box::new(ScriptedLocalizer::new(outcomes)),
            params(),
            media_roots(2),
            TrajectoryTracks::noop(2),
        )
        .unwrap()
        .run()
    };

    let first = run(outcomes.clone());
    let second = run(outcomes);
    assert_eq!(first.log.len(), second.log.len());
    for (a, b) in first.log.entries().iter().zip(second.log.entries()) {
        // identical up to wall-clock timing
        assert_eq!(a.frame_index, b.frame_index);
        assert_eq!(a.localized, b.localized);
        assert_eq!(a.rig_pose, b.rig_pose);
        assert_eq!(a.cameras, b.cameras);
    }
}

#[test]
fn construction_rejects_bad_configurations() {
    // no cameras at all
    assert!(matches!(
        RigPipeline::new(
            feed_set(&[]),
            RigGeometry::single_camera(),
            Box::new(ScriptedLocalizer::new(vec![])),
            params(),
            vec![],
            TrajectoryTracks::noop(0),
        ),
        Err(PipelineError::NoCameras)
    ));

    // two cameras but a single-camera rig geometry
    assert!(matches!(
        RigPipeline::new(
            feed_set(&[1, 1]),
            RigGeometry::single_camera(),
            Box::new(ScriptedLocalizer::new(vec![])),
            params(),
            media_roots(2),
            TrajectoryTracks::noop(2),
        ),
        Err(PipelineError::SubposeCountMismatch {
            cameras: 2,
            subposes: 0
        })
    ));

    // track count disagrees with the feed count
    assert!(matches!(
        RigPipeline::new(
            feed_set(&[1]),
            RigGeometry::single_camera(),
            Box::new(ScriptedLocalizer::new(vec![])),
            params(),
            media_roots(1),
            TrajectoryTracks::noop(2),
        ),
        Err(PipelineError::TrackCountMismatch { .. })
    ));

    // uninitialized engine
    assert!(matches!(
        RigPipeline::new(
            feed_set(&[1]),
            RigGeometry::single_camera(),
            Box::new(ScriptedLocalizer::uninitialized()),
            params(),
            media_roots(1),
            TrajectoryTracks::noop(1),
        ),
        Err(PipelineError::EngineNotInitialized)
    ));
}

#[test]
fn longer_secondary_feed_ends_with_the_primary() {
    // camera 0 is authoritative for end-of-stream
    let pipeline = RigPipeline::new(
        feed_set(&[2, 4]),
        rig_geometry(2),
        Box::new(ScriptedLocalizer::new(vec![localized(2); 2])),
        params(),
        media_roots(2),
        TrajectoryTracks::noop(2),
    )
    .unwrap();

    let report = pipeline.run();
    assert!(report.is_completed());
    assert_eq!(report.log.len(), 2);
}

#[test]
fn durations_are_recorded_for_every_attempt() {
    let pipeline = RigPipeline::new(
        feed_set(&[2]),
        RigGeometry::single_camera(),
        Box::new(ScriptedLocalizer::new(vec![
            localized(1),
            RigLocalization::not_localized(1),
        ])),
        params(),
        media_roots(1),
        TrajectoryTracks::noop(1),
    )
    .unwrap();

    let report = pipeline.run();
    let stats = report.log.stats();
    assert_eq!(stats.count(), 2);
    assert!(stats.sum() >= Duration::ZERO);
    assert!(stats.min().is_some() && stats.max().is_some());
}
