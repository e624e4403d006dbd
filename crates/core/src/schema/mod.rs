//! Annotation schema: entities, their JSON shape, and validation rules.

pub mod action;
pub mod court;
pub mod detection;
pub mod lenient;
pub mod pose;
pub mod video;

pub use action::{ActionEvent, ActionType, RawEventRow, GAME_LOG_COLUMNS};
pub use court::{CourtPosition, Moment, Tracklet};
pub use detection::DetectionBox;
pub use pose::{Keypoint, PoseKeypoints};
pub use video::{FrameAnnotation, VideoAnnotation};
