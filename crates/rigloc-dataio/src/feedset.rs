use rigloc_core::{CameraIntrinsics, GrayImage};

use crate::error::FeedError;
use crate::feed::{CameraFeed, FeedFrame};

/// One synchronized set of frames, one per rig camera.
#[derive(Clone, Debug)]
pub struct FrameSet {
    /// Grayscale images in camera order.
    pub images: Vec<GrayImage>,
    /// Intrinsics in camera order.
    pub intrinsics: Vec<CameraIntrinsics>,
    /// Source image identifiers in camera order.
    pub image_ids: Vec<String>,
}

impl FrameSet {
    /// Number of cameras represented in the frame set.
    pub fn num_cameras(&self) -> usize {
        self.images.len()
    }
}

/// The fixed, ordered set of per-camera feeds of the rig.
///
/// Frame acquisition is all-or-nothing: either every feed produces a frame
/// or the stream ends. Camera 0 is authoritative for end-of-stream; any
/// other feed running dry first is a desynchronization fault.
pub struct FeedSet {
    feeds: Vec<Box<dyn CameraFeed>>,
    frames_read: usize,
}

impl FeedSet {
    /// Bundle the per-camera feeds, in camera order.
    pub fn new(feeds: Vec<Box<dyn CameraFeed>>) -> Self {
        Self {
            feeds,
            frames_read: 0,
        }
    }

    /// Number of cameras in the rig.
    pub fn num_cameras(&self) -> usize {
        self.feeds.len()
    }

    /// Number of synchronized frame sets read so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Read the next synchronized frame set.
    ///
    /// Returns `Ok(None)` when camera 0 is exhausted (normal end of
    /// stream; the remaining feeds are not polled). Each feed advances as
    /// soon as it is read, before the frame set as a whole is validated.
    pub fn read_synchronized(&mut self) -> Result<Option<FrameSet>, FeedError> {
        let frame = self.frames_read;
        let num_cameras = self.feeds.len();
        let mut images = Vec::with_capacity(num_cameras);
        let mut intrinsics = Vec::with_capacity(num_cameras);
        let mut image_ids = Vec::with_capacity(num_cameras);

        for (camera, feed) in self.feeds.iter_mut().enumerate() {
            match feed.next_frame()? {
                None if camera == 0 => return Ok(None),
                None => return Err(FeedError::Desync { camera, frame }),
                Some(FeedFrame {
                    image,
                    intrinsics: frame_intrinsics,
                    id,
                }) => {
                    let frame_intrinsics = frame_intrinsics.ok_or_else(|| {
                        FeedError::MissingIntrinsics {
                            camera,
                            image: id.clone(),
                        }
                    })?;
                    images.push(image);
                    intrinsics.push(frame_intrinsics);
                    image_ids.push(id);
                }
            }
        }

        self.frames_read += 1;
        Ok(Some(FrameSet {
            images,
            intrinsics,
            image_ids,
        }))
    }
}
