#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Per-camera intrinsics calibration file loading.
pub mod calib;

/// Error types for feed construction and frame acquisition.
pub mod error;

/// Camera feed contract and the bundled feed implementations.
pub mod feed;

/// Synchronized acquisition across the rig's feeds.
pub mod feedset;

pub use calib::load_intrinsics;
pub use error::FeedError;
pub use feed::{open_feed, CameraFeed, FeedFrame, ImageSequenceFeed, MemoryFeed, PathListFeed};
pub use feedset::{FeedSet, FrameSet};
