use std::path::PathBuf;

/// An error type for the feed modules.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    /// Error when the media source does not exist.
    #[error("Media source does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Error when the media source kind is not supported.
    #[error("Unsupported media source: {0}")]
    UnsupportedMedia(PathBuf),

    /// Error when a media source yields no images at all.
    #[error("No images found in media source: {0}")]
    EmptyFeed(PathBuf),

    /// Error to manipulate a file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to decode an image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to create the image buffer.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] rigloc_core::ImageError),

    /// Error to parse an intrinsics calibration file.
    #[error("Failed to parse the intrinsics calibration file {path}. {source}")]
    InvalidCalibration {
        /// The calibration file that failed to parse.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A non-primary feed ran out of frames while the primary feed did not.
    #[error("Camera {camera} has no frame at index {frame} while camera 0 does")]
    Desync {
        /// Index of the exhausted camera.
        camera: usize,
        /// Frame index at which the feeds diverged.
        frame: usize,
    },

    /// A feed produced a frame without intrinsics.
    #[error("Camera {camera} has no intrinsics for image {image}")]
    MissingIntrinsics {
        /// Index of the uncalibrated camera.
        camera: usize,
        /// Identifier of the offending image.
        image: String,
    },
}
