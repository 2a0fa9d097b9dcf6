use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rigloc_core::{CameraIntrinsics, GrayImage, ImageSize};

use crate::calib::load_intrinsics;
use crate::error::FeedError;

/// File extensions recognized as still images.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// File extensions recognized as video containers.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

/// One decoded element of a camera feed.
#[derive(Clone, Debug)]
pub struct FeedFrame {
    /// The grayscale image.
    pub image: GrayImage,
    /// Intrinsics of the producing camera, when calibrated.
    pub intrinsics: Option<CameraIntrinsics>,
    /// Identifier of the source image (usually its path).
    pub id: String,
}

/// An ordered, possibly unbounded source of frames for one physical camera.
///
/// Reading a frame advances the feed, whether or not the caller goes on to
/// use the frame.
pub trait CameraFeed {
    /// Read the next frame, or `None` when the feed is exhausted.
    fn next_frame(&mut self) -> Result<Option<FeedFrame>, FeedError>;
}

fn decode_gray(path: &Path) -> Result<GrayImage, FeedError> {
    let decoded = image::open(path)?.to_luma8();
    let (width, height) = decoded.dimensions();
    let size = ImageSize {
        width: width as usize,
        height: height as usize,
    };
    Ok(GrayImage::new(size, decoded.into_raw())?)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|candidate| *candidate == ext)
        })
        .unwrap_or(false)
}

/// A feed over an ordered list of image files on disk.
///
/// Covers both image-sequence directories (sorted by file name) and
/// path-list files.
pub struct ImageSequenceFeed {
    paths: Vec<PathBuf>,
    intrinsics: Option<CameraIntrinsics>,
    cursor: usize,
}

impl ImageSequenceFeed {
    /// Scan a directory for images, sorted by file name.
    pub fn new(dir: &Path, intrinsics: Option<CameraIntrinsics>) -> Result<Self, FeedError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, &IMAGE_EXTENSIONS) {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(FeedError::EmptyFeed(dir.to_path_buf()));
        }
        log::debug!("feed over {} images in {}", paths.len(), dir.display());
        Ok(Self {
            paths,
            intrinsics,
            cursor: 0,
        })
    }

    fn from_paths(paths: Vec<PathBuf>, intrinsics: Option<CameraIntrinsics>) -> Self {
        Self {
            paths,
            intrinsics,
            cursor: 0,
        }
    }
}

impl CameraFeed for ImageSequenceFeed {
    fn next_frame(&mut self) -> Result<Option<FeedFrame>, FeedError> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        let image = decode_gray(path)?;
        Ok(Some(FeedFrame {
            image,
            intrinsics: self.intrinsics,
            id: path.display().to_string(),
        }))
    }
}

/// A feed over a text file listing one image path per line.
///
/// Relative paths are resolved against the directory of the list file.
pub struct PathListFeed {
    inner: ImageSequenceFeed,
}

impl PathListFeed {
    /// Read the path-list file and build the feed.
    pub fn new(list: &Path, intrinsics: Option<CameraIntrinsics>) -> Result<Self, FeedError> {
        let root = list.parent().map(Path::to_path_buf).unwrap_or_default();
        let content = std::fs::read_to_string(list)?;
        let paths: Vec<PathBuf> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let path = PathBuf::from(line);
                if path.is_absolute() {
                    path
                } else {
                    root.join(path)
                }
            })
            .collect();
        if paths.is_empty() {
            return Err(FeedError::EmptyFeed(list.to_path_buf()));
        }
        Ok(Self {
            inner: ImageSequenceFeed::from_paths(paths, intrinsics),
        })
    }
}

impl CameraFeed for PathListFeed {
    fn next_frame(&mut self) -> Result<Option<FeedFrame>, FeedError> {
        self.inner.next_frame()
    }
}

/// A feed over pre-decoded in-memory frames.
///
/// The stub source used by the test suites and by callers that acquire
/// frames through their own machinery.
#[derive(Default)]
pub struct MemoryFeed {
    frames: VecDeque<FeedFrame>,
}

impl MemoryFeed {
    /// Build a feed that yields the given frames in order.
    pub fn new(frames: Vec<FeedFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl CameraFeed for MemoryFeed {
    fn next_frame(&mut self) -> Result<Option<FeedFrame>, FeedError> {
        Ok(self.frames.pop_front())
    }
}

/// Open the feed for one camera given its media path and an optional
/// intrinsics calibration file.
///
/// The media path may be an image-sequence directory, a text file listing
/// one image path per line, or a single image. Video containers are
/// recognized but not supported by this build.
pub fn open_feed(
    media: &Path,
    calibration: Option<&Path>,
) -> Result<Box<dyn CameraFeed>, FeedError> {
    let intrinsics = calibration.map(load_intrinsics).transpose()?;
    if media.is_dir() {
        return Ok(Box::new(ImageSequenceFeed::new(media, intrinsics)?));
    }
    if !media.is_file() {
        return Err(FeedError::FileDoesNotExist(media.to_path_buf()));
    }
    if has_extension(media, &["txt"]) {
        return Ok(Box::new(PathListFeed::new(media, intrinsics)?));
    }
    if has_extension(media, &IMAGE_EXTENSIONS) {
        return Ok(Box::new(ImageSequenceFeed::from_paths(
            vec![media.to_path_buf()],
            intrinsics,
        )));
    }
    if has_extension(media, &VIDEO_EXTENSIONS) {
        log::error!(
            "video decoding is not bundled in this build: {}",
            media.display()
        );
    }
    Err(FeedError::UnsupportedMedia(media.to_path_buf()))
}
