//! Frame-level and video-level annotation aggregates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::action::ActionEvent;
use super::court::Tracklet;
use super::detection::DetectionBox;
use super::lenient;
use crate::error::CoreError;
use crate::types::FrameIndex;

/// Everything annotated for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotation {
    #[serde(deserialize_with = "lenient::int")]
    pub frame_id: FrameIndex,
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub bbox: Vec<DetectionBox>,
    #[serde(default)]
    pub tracklet: Option<Tracklet>,
}

impl FrameAnnotation {
    pub fn new(frame_id: FrameIndex) -> Self {
        Self {
            frame_id,
            bbox: Vec::new(),
            tracklet: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (i, detection) in self.bbox.iter().enumerate() {
            detection.validate().map_err(|e| nest(e, &format!("bbox[{i}]")))?;
        }
        if let Some(tracklet) = &self.tracklet {
            tracklet.validate().map_err(|e| nest(e, "tracklet"))?;
        }
        Ok(())
    }

    /// Shift this frame and everything it owns by `-offset`.
    pub fn rebase(&mut self, offset: FrameIndex) {
        self.frame_id -= offset;
        for detection in &mut self.bbox {
            detection.frame_number -= offset;
        }
        if let Some(tracklet) = &mut self.tracklet {
            tracklet.frame_number -= offset;
        }
    }
}

/// All annotations for one video, or for one clip cut from it.
///
/// Only clip-level annotations carry an `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnnotation {
    #[serde(deserialize_with = "lenient::int")]
    pub video_id: i64,
    pub video_path: String,
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub frames: Vec<FrameAnnotation>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub action: Option<ActionEvent>,
}

impl VideoAnnotation {
    /// Validate every owned entity and the uniqueness of frame ids.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::with_capacity(self.frames.len());
        for frame in &self.frames {
            if !seen.insert(frame.frame_id) {
                return Err(CoreError::Validation(format!(
                    "duplicate frame_id {} in video {}",
                    frame.frame_id, self.video_id
                )));
            }
            frame
                .validate()
                .map_err(|e| nest(e, &format!("frame {}", frame.frame_id)))?;
        }
        if let Some(action) = &self.action {
            action.validate().map_err(|e| nest(e, "action"))?;
        }
        Ok(())
    }

    pub fn frame(&self, frame_id: FrameIndex) -> Option<&FrameAnnotation> {
        self.frames.iter().find(|f| f.frame_id == frame_id)
    }

    /// Smallest and largest frame id, or `None` for an empty video.
    pub fn frame_span(&self) -> Option<(FrameIndex, FrameIndex)> {
        let min = self.frames.iter().map(|f| f.frame_id).min()?;
        let max = self.frames.iter().map(|f| f.frame_id).max()?;
        Some((min, max))
    }

    pub fn detection_count(&self) -> usize {
        self.frames.iter().map(|f| f.bbox.len()).sum()
    }
}

/// Prefix a validation message with the location of the failing entity.
fn nest(err: CoreError, location: &str) -> CoreError {
    match err {
        CoreError::Validation(msg) => CoreError::Validation(format!("{location}: {msg}")),
        other => other,
    }
}
