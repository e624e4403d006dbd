//! Courtside core: the basketball clip-annotation dataset model and the
//! pure operations over it.
//!
//! - [`schema`]: annotation entities, their JSON shape and validation.
//! - [`annotation_io`]: lossless load/save of annotation files.
//! - [`slicer`]: cutting a video annotation down to a clip window.
//! - [`event_mapper`]: game-log events to clip annotations.
//! - [`assembly`]: video annotations from detection inputs.
//! - [`ffmpeg`]: clip transcoding and frame extraction.
//! - [`overlay`]: drawing boxes on sampled frames.

pub mod annotation_io;
pub mod assembly;
pub mod detections;
pub mod error;
pub mod event_mapper;
pub mod ffmpeg;
pub mod game_log;
pub mod keypoints;
pub mod naming;
pub mod overlay;
pub mod schema;
pub mod slicer;
pub mod threshold_validation;
pub mod types;

pub use annotation_io::{load_video_annotation, save_video_annotation};
pub use error::CoreError;
pub use event_mapper::{map_events, write_clip_annotations, MapSummary, SkipReason};
pub use slicer::{slice_video_annotation, ClipIdentity, ClipWindow};
