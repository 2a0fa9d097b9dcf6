use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::estimator::{validate_threshold, EstimatorError, RobustEstimatorKind};

/// Error types for parameter parsing.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    /// The describer name is not known.
    #[error("Unknown describer type \"{0}\"")]
    UnknownDescriber(String),

    /// The preset name is not known.
    #[error("Unknown feature preset \"{0}\"")]
    UnknownPreset(String),

    /// The retrieval algorithm name is not known.
    #[error("Unknown retrieval algorithm \"{0}\"")]
    UnknownAlgorithm(String),
}

/// Feature extraction quality preset forwarded to the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeaturePreset {
    /// Fastest, fewest features.
    Low,
    /// Reduced feature count.
    Medium,
    /// The default tradeoff.
    #[default]
    Normal,
    /// More features, slower extraction.
    High,
    /// Densest extraction, slowest.
    Ultra,
}

impl fmt::Display for FeaturePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Ultra => "ultra",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FeaturePreset {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            other => Err(ParamsError::UnknownPreset(other.to_string())),
        }
    }
}

/// Describer families the engine can match against the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriberType {
    /// SIFT keypoint descriptors.
    Sift,
    /// AKAZE keypoint descriptors.
    Akaze,
    /// ORB keypoint descriptors.
    Orb,
    /// 16h5 fiducial tag family.
    Tag16h5,
    /// 36h11 fiducial tag family.
    Tag36h11,
}

impl DescriberType {
    /// Whether this describer is a fiducial tag family.
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag16h5 | Self::Tag36h11)
    }

    /// Parse a comma-separated describer list, e.g. `"sift,orb"`.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, ParamsError> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for DescriberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sift => "sift",
            Self::Akaze => "akaze",
            Self::Orb => "orb",
            Self::Tag16h5 => "tag16h5",
            Self::Tag36h11 => "tag36h11",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DescriberType {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sift" => Ok(Self::Sift),
            "akaze" => Ok(Self::Akaze),
            "orb" => Ok(Self::Orb),
            "tag16h5" => Ok(Self::Tag16h5),
            "tag36h11" => Ok(Self::Tag36h11),
            other => Err(ParamsError::UnknownDescriber(other.to_string())),
        }
    }
}

/// Immutable configuration bundle threaded through every localization call.
///
/// Built once from validated inputs before the frame loop starts and never
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct LocalizerParameters {
    /// Feature extraction preset.
    pub feature_preset: FeaturePreset,
    /// Robust estimator used for resection.
    pub resection_estimator: RobustEstimatorKind,
    /// Robust estimator used for matching with geometric validation.
    pub matching_estimator: RobustEstimatorKind,
    /// Maximum reprojection error (pixels) allowed for resection.
    pub resection_error_max: f64,
    /// Maximum matching error (pixels) allowed for geometric validation.
    pub matching_error_max: f64,
    /// Refine camera intrinsics for each localized image.
    pub refine_intrinsics: bool,
    /// Localize each camera of the rig separately instead of jointly.
    pub use_rig_naive: bool,
    /// Maximum angular deviation (radians) tolerated when fusing
    /// per-camera candidates into a rig pose.
    pub angular_threshold: f64,
}

impl Default for LocalizerParameters {
    fn default() -> Self {
        Self {
            feature_preset: FeaturePreset::Normal,
            resection_estimator: RobustEstimatorKind::ACRansac,
            matching_estimator: RobustEstimatorKind::ACRansac,
            resection_error_max: 4.0,
            matching_error_max: 4.0,
            refine_intrinsics: false,
            use_rig_naive: false,
            angular_threshold: 0.1_f64.to_radians(),
        }
    }
}

impl LocalizerParameters {
    /// Validate both error thresholds against their estimators and
    /// normalize them. Either failure must abort startup before any frame
    /// is processed.
    pub fn validated(mut self) -> Result<Self, EstimatorError> {
        self.matching_error_max =
            validate_threshold(self.matching_estimator, self.matching_error_max)?;
        self.resection_error_max =
            validate_threshold(self.resection_estimator, self.resection_error_max)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let params = LocalizerParameters::default().validated().unwrap();
        assert_eq!(params.resection_error_max, 4.0);
        assert_eq!(params.matching_error_max, 4.0);
    }

    #[test]
    fn auto_thresholds_normalize_to_infinity() {
        let params = LocalizerParameters {
            resection_error_max: 0.0,
            matching_error_max: 0.0,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert!(params.resection_error_max.is_infinite());
        assert!(params.matching_error_max.is_infinite());
    }

    #[test]
    fn loransac_zero_threshold_fails_validation() {
        let result = LocalizerParameters {
            resection_estimator: RobustEstimatorKind::LORansac,
            resection_error_max: 0.0,
            ..Default::default()
        }
        .validated();
        assert!(matches!(
            result,
            Err(EstimatorError::ThresholdTooSmall { .. })
        ));
    }

    #[test]
    fn describer_list_parsing() {
        assert_eq!(
            DescriberType::parse_list("sift, orb").unwrap(),
            vec![DescriberType::Sift, DescriberType::Orb]
        );
        assert!(DescriberType::parse_list("sift,unknown").is_err());
        assert!(DescriberType::Tag36h11.is_tag());
        assert!(!DescriberType::Sift.is_tag());
    }
}
