use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rigloc_core::Pose;

/// An error type for map handling.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    /// Error when reading the map file fails.
    #[error("Failed to read the map file {path}. {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Error when the map file cannot be parsed.
    #[error("Failed to parse the map file {path}. {source}")]
    Parse {
        /// The file that could not be parsed.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Error when a descriptor override file cannot be parsed.
    #[error("Failed to parse the descriptor file {path}. {source}")]
    Descriptor {
        /// The descriptor file that could not be parsed.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

/// One reference keyframe of the pre-built map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapKeyframe {
    /// Keyframe identifier.
    pub id: String,
    /// Camera-to-world pose of the keyframe.
    pub pose: Pose,
    /// Global appearance descriptor (L2-normalized).
    pub descriptor: Vec<f32>,
}

/// The pre-built 3D map the rig is localized against.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapData {
    /// Reference keyframes of the map.
    pub keyframes: Vec<MapKeyframe>,
}

impl MapData {
    /// Load the map from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MapError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override keyframe descriptors with `<id>.desc.json` files found in
    /// `dir`. Keyframes without an override file keep their embedded
    /// descriptor.
    pub fn apply_descriptor_folder(&mut self, dir: &Path) -> Result<(), MapError> {
        for keyframe in &mut self.keyframes {
            let path = dir.join(format!("{}.desc.json", keyframe.id));
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            keyframe.descriptor =
                serde_json::from_str(&content).map_err(|source| MapError::Descriptor {
                    path: path.clone(),
                    source,
                })?;
            log::debug!("descriptor of keyframe {} overridden", keyframe.id);
        }
        Ok(())
    }

    /// Whether the map holds no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Number of keyframes in the map.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> MapData {
        MapData {
            keyframes: vec![
                MapKeyframe {
                    id: "kf0".to_string(),
                    pose: Pose::IDENTITY,
                    descriptor: vec![1.0, 0.0],
                },
                MapKeyframe {
                    id: "kf1".to_string(),
                    pose: Pose::IDENTITY,
                    descriptor: vec![0.0, 1.0],
                },
            ],
        }
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, serde_json::to_string(&sample_map()).unwrap()).unwrap();

        let map = MapData::from_file(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.keyframes[1].id, "kf1");
    }

    #[test]
    fn missing_map_file_is_an_error() {
        assert!(matches!(
            MapData::from_file("/nonexistent/map.json"),
            Err(MapError::Io { .. })
        ));
    }

    #[test]
    fn descriptor_folder_overrides_matching_keyframes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kf1.desc.json"), "[0.5, 0.5]").unwrap();

        let mut map = sample_map();
        map.apply_descriptor_folder(dir.path()).unwrap();
        assert_eq!(map.keyframes[0].descriptor, vec![1.0, 0.0]);
        assert_eq!(map.keyframes[1].descriptor, vec![0.5, 0.5]);
    }
}
