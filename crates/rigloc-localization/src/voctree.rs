use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rigloc_core::{CameraIntrinsics, GrayImage, Pose};

use crate::engine::RigLocalizer;
use crate::map::MapData;
use crate::params::{LocalizerParameters, ParamsError};
use crate::result::{CameraLocalization, RigLocalization};
use crate::retrieval::{global_descriptor, similarity};

/// Candidate ranking strategy of the retrieval backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetrievalAlgorithm {
    /// Keep only the single best-ranked keyframe.
    FirstBest,
    /// Walk the ranked candidates until one is acceptable.
    #[default]
    AllResults,
}

impl fmt::Display for RetrievalAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstBest => "FirstBest",
            Self::AllResults => "AllResults",
        };
        write!(f, "{name}")
    }
}

impl FromStr for RetrievalAlgorithm {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firstbest" => Ok(Self::FirstBest),
            "allresults" => Ok(Self::AllResults),
            other => Err(ParamsError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Configuration of the retrieval-based backend.
#[derive(Clone, Debug)]
pub struct RetrievalConfig {
    /// Candidate ranking strategy.
    pub algorithm: RetrievalAlgorithm,
    /// Number of map keyframes to rank per query.
    pub num_results: usize,
    /// Stop walking ranked candidates past this count (0 = ignore).
    pub max_results: usize,
    /// Minimum similarity for a candidate to be accepted.
    pub min_score: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            algorithm: RetrievalAlgorithm::AllResults,
            num_results: 4,
            max_results: 10,
            min_score: 0.25,
        }
    }
}

/// Retrieval-based rig localization engine.
///
/// Ranks map keyframes by global appearance similarity per camera, adopts
/// the best acceptable keyframe pose as the camera candidate and fuses the
/// candidates into a rig pose through the subposes. The reference engine
/// behind the [`RigLocalizer`] contract; keypoint matching and robust
/// resection belong to external engines implementing the same trait.
pub struct VoctreeRigLocalizer {
    map: MapData,
    config: RetrievalConfig,
}

impl VoctreeRigLocalizer {
    /// Build the engine over a loaded map.
    pub fn new(map: MapData, config: RetrievalConfig) -> Self {
        Self { map, config }
    }

    fn localize_camera(&self, image: &GrayImage) -> CameraLocalization {
        let query = global_descriptor(image);
        let mut scored: Vec<(usize, f64)> = self
            .map
            .keyframes
            .iter()
            .enumerate()
            .map(|(idx, keyframe)| (idx, similarity(&query, &keyframe.descriptor)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let limit = match self.config.algorithm {
            RetrievalAlgorithm::FirstBest => 1,
            RetrievalAlgorithm::AllResults => {
                let limit = self.config.num_results.max(1);
                if self.config.max_results > 0 {
                    limit.min(self.config.max_results)
                } else {
                    limit
                }
            }
        };

        for (idx, score) in scored.into_iter().take(limit) {
            if score >= self.config.min_score {
                let keyframe = &self.map.keyframes[idx];
                return CameraLocalization {
                    pose: Some(keyframe.pose),
                    score,
                    matched_keyframe: Some(keyframe.id.clone()),
                };
            }
        }
        CameraLocalization::failed()
    }

    fn fuse_naive(&self, cameras: Vec<CameraLocalization>) -> RigLocalization {
        // the rig is anchored on the reference camera, the others keep
        // their independent candidates
        let rig_pose = cameras.first().and_then(|camera| camera.pose);
        RigLocalization {
            localized: rig_pose.is_some(),
            rig_pose,
            cameras,
        }
    }

    fn fuse_consensus(
        &self,
        mut cameras: Vec<CameraLocalization>,
        subposes: &[Pose],
        angular_threshold: f64,
    ) -> RigLocalization {
        let candidates: Vec<Option<Pose>> = cameras
            .iter()
            .enumerate()
            .map(|(camera, localization)| {
                localization
                    .pose
                    .as_ref()
                    .and_then(|pose| rig_candidate(pose, camera, subposes))
            })
            .collect();

        let Some(reference) = candidates.iter().flatten().next().copied() else {
            return RigLocalization {
                localized: false,
                rig_pose: None,
                cameras,
            };
        };

        let consistent = candidates
            .iter()
            .flatten()
            .all(|candidate| reference.angular_distance(candidate) <= angular_threshold);
        if !consistent {
            log::debug!("rig candidates disagree beyond the angular threshold");
            return RigLocalization {
                localized: false,
                rig_pose: None,
                cameras,
            };
        }

        // a consistent rig implies a pose for every camera
        for (camera, localization) in cameras.iter_mut().enumerate() {
            localization.pose = if camera == 0 {
                Some(reference)
            } else {
                subposes
                    .get(camera - 1)
                    .map(|subpose| reference.compose(subpose))
            };
        }
        RigLocalization {
            localized: true,
            rig_pose: Some(reference),
            cameras,
        }
    }
}

/// Candidate rig pose implied by one camera's pose.
fn rig_candidate(camera_pose: &Pose, camera: usize, subposes: &[Pose]) -> Option<Pose> {
    if camera == 0 {
        Some(*camera_pose)
    } else {
        subposes
            .get(camera - 1)
            .map(|subpose| camera_pose.compose(&subpose.inverse()))
    }
}

impl RigLocalizer for VoctreeRigLocalizer {
    fn is_initialized(&self) -> bool {
        !self.map.is_empty()
    }

    fn localize_rig(
        &mut self,
        images: &[GrayImage],
        params: &LocalizerParameters,
        _intrinsics: &[CameraIntrinsics],
        subposes: &[Pose],
    ) -> RigLocalization {
        let cameras: Vec<CameraLocalization> = images
            .iter()
            .enumerate()
            .map(|(camera, image)| {
                let localization = self.localize_camera(image);
                match &localization.matched_keyframe {
                    Some(id) => log::debug!(
                        "camera {camera} matched keyframe {id} with score {:.3}",
                        localization.score
                    ),
                    None => log::debug!("camera {camera} matched no keyframe"),
                }
                localization
            })
            .collect();

        if params.use_rig_naive {
            self.fuse_naive(cameras)
        } else {
            self.fuse_consensus(cameras, subposes, params.angular_threshold)
        }
    }
}
