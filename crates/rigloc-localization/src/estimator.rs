use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Smallest admissible inlier threshold for fixed-threshold estimators.
const MIN_THRESHOLD: f64 = 1e-6;

/// Error types for robust-estimator configuration.
#[derive(Debug, Error, PartialEq)]
pub enum EstimatorError {
    /// The estimator name is not known.
    #[error("Unknown robust estimator \"{0}\"")]
    UnknownEstimator(String),

    /// The estimator kind is not usable for rig localization.
    #[error("Only acransac and loransac are supported, got {0}")]
    UnsupportedEstimator(RobustEstimatorKind),

    /// The threshold is too small for a fixed-threshold estimator.
    #[error("A threshold of {value} is too small for the {kind} estimator")]
    ThresholdTooSmall {
        /// The estimator the threshold was configured for.
        kind: RobustEstimatorKind,
        /// The rejected threshold value.
        value: f64,
    },
}

/// Robust estimation frameworks selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobustEstimatorKind {
    /// Plain random sample consensus.
    Ransac,
    /// A-contrario adaptive estimator; can select its own inlier threshold.
    ACRansac,
    /// Least median of squares.
    LSMeds,
    /// Locally optimized estimator with a fixed inlier threshold.
    LORansac,
    /// Maximum consensus search.
    MaxConsensus,
}

impl fmt::Display for RobustEstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ransac => "ransac",
            Self::ACRansac => "acransac",
            Self::LSMeds => "lsmeds",
            Self::LORansac => "loransac",
            Self::MaxConsensus => "maxconsensus",
        };
        write!(f, "{name}")
    }
}

impl FromStr for RobustEstimatorKind {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ransac" => Ok(Self::Ransac),
            "acransac" => Ok(Self::ACRansac),
            "lsmeds" => Ok(Self::LSMeds),
            "loransac" => Ok(Self::LORansac),
            "maxconsensus" => Ok(Self::MaxConsensus),
            other => Err(EstimatorError::UnknownEstimator(other.to_string())),
        }
    }
}

/// Validate an error threshold against the chosen robust estimator and
/// normalize it.
///
/// Only the a-contrario and the locally-optimized estimators are accepted.
/// For the a-contrario estimator a threshold of 0 means "select the
/// threshold automatically" and normalizes to infinity; the
/// locally-optimized estimator needs a strictly positive threshold because
/// a near-zero fixed radius would make every inlier test degenerate.
pub fn validate_threshold(
    kind: RobustEstimatorKind,
    value: f64,
) -> Result<f64, EstimatorError> {
    match kind {
        RobustEstimatorKind::ACRansac => {
            if value == 0.0 {
                Ok(f64::INFINITY)
            } else {
                Ok(value)
            }
        }
        RobustEstimatorKind::LORansac => {
            if value <= MIN_THRESHOLD {
                Err(EstimatorError::ThresholdTooSmall { kind, value })
            } else {
                Ok(value)
            }
        }
        other => Err(EstimatorError::UnsupportedEstimator(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acransac_zero_means_auto() {
        let normalized = validate_threshold(RobustEstimatorKind::ACRansac, 0.0).unwrap();
        assert!(normalized.is_infinite());
    }

    #[test]
    fn acransac_keeps_explicit_threshold() {
        assert_eq!(
            validate_threshold(RobustEstimatorKind::ACRansac, 4.0).unwrap(),
            4.0
        );
    }

    #[test]
    fn loransac_rejects_zero_and_tiny_thresholds() {
        assert!(matches!(
            validate_threshold(RobustEstimatorKind::LORansac, 0.0),
            Err(EstimatorError::ThresholdTooSmall { .. })
        ));
        assert!(matches!(
            validate_threshold(RobustEstimatorKind::LORansac, 1e-7),
            Err(EstimatorError::ThresholdTooSmall { .. })
        ));
    }

    #[test]
    fn loransac_accepts_positive_threshold_unchanged() {
        assert_eq!(
            validate_threshold(RobustEstimatorKind::LORansac, 1.0).unwrap(),
            1.0
        );
    }

    #[test]
    fn other_estimators_are_unsupported() {
        for kind in [
            RobustEstimatorKind::Ransac,
            RobustEstimatorKind::LSMeds,
            RobustEstimatorKind::MaxConsensus,
        ] {
            assert!(matches!(
                validate_threshold(kind, 4.0),
                Err(EstimatorError::UnsupportedEstimator(_))
            ));
        }
    }

    #[test]
    fn parse_roundtrip() {
        for kind in [
            RobustEstimatorKind::Ransac,
            RobustEstimatorKind::ACRansac,
            RobustEstimatorKind::LSMeds,
            RobustEstimatorKind::LORansac,
            RobustEstimatorKind::MaxConsensus,
        ] {
            assert_eq!(kind.to_string().parse::<RobustEstimatorKind>(), Ok(kind));
        }
        assert!(matches!(
            "prosac".parse::<RobustEstimatorKind>(),
            Err(EstimatorError::UnknownEstimator(_))
        ));
    }
}
