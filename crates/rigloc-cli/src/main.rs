use std::path::{Path, PathBuf};

use argh::FromArgs;

use rigloc_core::RigGeometry;
use rigloc_dataio::{open_feed, FeedSet};
use rigloc_localization::{
    build_localizer, DescriberType, FeaturePreset, LocalizerParameters, MapData,
    RetrievalAlgorithm, RetrievalConfig, RobustEstimatorKind,
};
use rigloc_pipeline::{
    JsonTrajectoryExporter, RigPipeline, RunOutcome, TrajectoryExporter, TrajectoryTracks,
};

#[derive(FromArgs, Debug)]
/// Localize a camera rig composed of internally calibrated cameras against
/// a pre-built map.
struct Args {
    /// the map file the rig is localized against
    #[argh(option)]
    map: PathBuf,

    /// media source for each camera of the rig: an image-sequence
    /// directory, a text file with one image path per line, or a single
    /// image (repeat per camera)
    #[argh(option)]
    mediapath: Vec<PathBuf>,

    /// intrinsics calibration file for each camera of the rig (repeat per
    /// camera)
    #[argh(option)]
    camera_intrinsics: Vec<PathBuf>,

    /// the rig calibration file containing the subposes
    #[argh(option)]
    calibration: PathBuf,

    /// folder containing per-keyframe descriptor overrides
    #[argh(option)]
    descriptor_folder: Option<PathBuf>,

    /// describer types to use for matching, comma separated
    #[argh(option, default = "String::from(\"sift\")")]
    match_describer_types: String,

    /// preset for the feature extractor {low,medium,normal,high,ultra}
    #[argh(option, default = "FeaturePreset::Normal")]
    preset: FeaturePreset,

    /// robust estimation framework to use for resection
    /// {acransac,loransac}
    #[argh(option, default = "RobustEstimatorKind::ACRansac")]
    resection_estimator: RobustEstimatorKind,

    /// robust estimation framework to use for matching
    /// {acransac,loransac}
    #[argh(option, default = "RobustEstimatorKind::ACRansac")]
    matching_estimator: RobustEstimatorKind,

    /// maximum reprojection error (in pixels) allowed for resectioning; 0
    /// lets the a-contrario estimator select a value
    #[argh(option, default = "4.0")]
    reprojection_error: f64,

    /// maximum matching error (in pixels) allowed for geometric
    /// validation; 0 lets the a-contrario estimator select a value
    #[argh(option, default = "4.0")]
    matching_error: f64,

    /// enable camera intrinsics refinement for each localized image
    #[argh(switch)]
    refine_intrinsics: bool,

    /// localize each camera of the rig separately instead of jointly
    #[argh(switch)]
    use_rig_naive: bool,

    /// maximum angular threshold in degrees between per-camera pose
    /// candidates when fusing the rig pose
    #[argh(option, default = "0.1")]
    angular_threshold: f64,

    /// candidate ranking algorithm {FirstBest,AllResults}
    #[argh(option, default = "RetrievalAlgorithm::AllResults")]
    algorithm: RetrievalAlgorithm,

    /// number of map keyframes to rank per query image
    #[argh(option, default = "4")]
    nb_image_match: usize,

    /// stop walking ranked candidates past this count (0 = ignore)
    #[argh(option, default = "10")]
    max_results: usize,

    /// minimum similarity for a retrieval candidate to be accepted
    #[argh(option, default = "0.25")]
    min_score: f64,

    /// output trajectory file for the rig track; per-camera tracks are
    /// written next to it as <stem>.camNN.<ext>
    #[argh(option)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // fail fast on a malformed estimator/threshold combination, before
    // any feed or map is touched
    let params = LocalizerParameters {
        feature_preset: args.preset,
        resection_estimator: args.resection_estimator,
        matching_estimator: args.matching_estimator,
        resection_error_max: args.reprojection_error,
        matching_error_max: args.matching_error,
        refine_intrinsics: args.refine_intrinsics,
        use_rig_naive: args.use_rig_naive,
        angular_threshold: args.angular_threshold.to_radians(),
    }
    .validated()?;

    if args.mediapath.is_empty() {
        return Err("at least one --mediapath is required".into());
    }
    if args.mediapath.len() != args.camera_intrinsics.len() {
        return Err(
            "the number of intrinsics and the number of cameras are not the same".into(),
        );
    }
    let num_cameras = args.mediapath.len();

    let describers = DescriberType::parse_list(&args.match_describer_types)?;
    if describers.is_empty() {
        return Err("at least one describer type is required".into());
    }

    log::info!("running with the following parameters:");
    log::info!("\tmap: {}", args.map.display());
    log::info!("\tmediapath: {:?}", args.mediapath);
    log::info!("\tcamera intrinsics: {:?}", args.camera_intrinsics);
    log::info!("\tcalibration: {}", args.calibration.display());
    log::info!("\tcameras: {num_cameras}");
    log::info!("\tdescribers: {}", args.match_describer_types);
    log::info!("\tpreset: {}", args.preset);
    log::info!("\tresection estimator: {}", args.resection_estimator);
    log::info!("\tmatching estimator: {}", args.matching_estimator);
    log::info!("\treprojection error: {}", params.resection_error_max);
    log::info!("\tmatching error: {}", params.matching_error_max);
    log::info!("\trefine intrinsics: {}", params.refine_intrinsics);
    log::info!("\tuse rig naive: {}", params.use_rig_naive);
    log::info!("\tangular threshold: {} deg", args.angular_threshold);
    log::info!("\talgorithm: {}", args.algorithm);
    log::info!("\tnb image match: {}", args.nb_image_match);
    log::info!("\tmax results: {}", args.max_results);

    let mut feeds = Vec::with_capacity(num_cameras);
    let mut media_roots = Vec::with_capacity(num_cameras);
    for (camera, (media, calibration)) in args
        .mediapath
        .iter()
        .zip(&args.camera_intrinsics)
        .enumerate()
    {
        let feed = open_feed(media, Some(calibration)).map_err(|err| {
            format!(
                "failed to initialize the feed for camera {camera} ({}): {err}",
                media.display()
            )
        })?;
        feeds.push(feed);
        media_roots.push(media_root(media));
    }
    let feeds = FeedSet::new(feeds);

    let rig = RigGeometry::load(&args.calibration, num_cameras)?;

    let mut map = MapData::from_file(&args.map)?;
    if let Some(folder) = &args.descriptor_folder {
        map.apply_descriptor_folder(folder)?;
    }
    log::info!("map loaded with {} keyframes", map.len());

    let retrieval = RetrievalConfig {
        algorithm: args.algorithm,
        num_results: args.nb_image_match,
        max_results: args.max_results,
        min_score: args.min_score,
    };
    let localizer = build_localizer(map, &describers, retrieval);

    let tracks = match &args.output {
        Some(path) => build_tracks(path, num_cameras)?,
        None => TrajectoryTracks::noop(num_cameras),
    };

    let pipeline = RigPipeline::new(feeds, rig, localizer, params, media_roots, tracks)?;
    let report = pipeline.run();
    report.log_summary();

    match report.outcome {
        RunOutcome::Completed => Ok(()),
        RunOutcome::Aborted(err) => Err(err.into()),
    }
}

/// The directory a camera's media comes from, recorded in exported
/// keyframes.
fn media_root(media: &Path) -> String {
    let root = if media.is_dir() {
        media
    } else {
        media.parent().unwrap_or(media)
    };
    root.display().to_string()
}

fn build_tracks(
    path: &Path,
    num_cameras: usize,
) -> Result<TrajectoryTracks, Box<dyn std::error::Error>> {
    let rig = Box::new(JsonTrajectoryExporter::create(path)?);
    let mut cameras: Vec<Box<dyn TrajectoryExporter>> = Vec::with_capacity(num_cameras);
    for camera in 0..num_cameras {
        cameras.push(Box::new(JsonTrajectoryExporter::create(camera_track_path(
            path, camera,
        ))?));
    }
    Ok(TrajectoryTracks { rig, cameras })
}

/// Per-camera track path derived from the rig track path:
/// `trajectory.jsonl` becomes `trajectory.cam00.jsonl` and so on.
fn camera_track_path(path: &Path, camera: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("trajectory");
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("jsonl");
    path.with_file_name(format!("{stem}.cam{camera:02}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_track_paths_are_zero_padded() {
        let path = Path::new("/out/trajectory.jsonl");
        assert_eq!(
            camera_track_path(path, 0),
            PathBuf::from("/out/trajectory.cam00.jsonl")
        );
        assert_eq!(
            camera_track_path(path, 11),
            PathBuf::from("/out/trajectory.cam11.jsonl")
        );
    }

    #[test]
    fn media_root_of_a_file_is_its_directory() {
        assert_eq!(media_root(Path::new("/data/cam0/list.txt")), "/data/cam0");
    }
}
