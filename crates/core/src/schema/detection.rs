//! Per-frame player detections.

use serde::{Deserialize, Serialize};

use super::lenient;
use super::pose::PoseKeypoints;
use crate::error::CoreError;
use crate::threshold_validation::{validate_finite, validate_non_negative, validate_unit_range};
use crate::types::FrameIndex;

/// A player bounding box taken as a snapshot of a tracklet at one frame.
///
/// Boxes come from a multi-object tracker; `player_id` is the tracker's
/// track id, not a roster id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    #[serde(deserialize_with = "lenient::int")]
    pub frame_number: FrameIndex,
    #[serde(deserialize_with = "lenient::int")]
    pub player_id: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<PoseKeypoints>,
}

impl DetectionBox {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_finite(self.x, "bbox.x")?;
        validate_finite(self.y, "bbox.y")?;
        validate_non_negative(self.width, "bbox.width")?;
        validate_non_negative(self.height, "bbox.height")?;
        validate_unit_range(self.confidence, "bbox.confidence")?;
        if let Some(pose) = &self.keypoints {
            pose.validate()?;
        }
        Ok(())
    }

    /// Parse one `frame,player,x,y,width,height,confidence[,...]` record.
    ///
    /// Trailing columns (MOT-style world coordinates) are ignored.
    pub fn from_record(fields: &[&str]) -> Result<Self, CoreError> {
        if fields.len() < 7 {
            return Err(CoreError::Validation(format!(
                "detection record needs at least 7 fields, got {}",
                fields.len()
            )));
        }
        let detection = Self {
            frame_number: lenient::parse_int_text(fields[0], "frame_number")?,
            player_id: lenient::parse_int_text(fields[1], "player_id")?,
            x: lenient::parse_float_text(fields[2], "x")?,
            y: lenient::parse_float_text(fields[3], "y")?,
            width: lenient::parse_float_text(fields[4], "width")?,
            height: lenient::parse_float_text(fields[5], "height")?,
            confidence: lenient::parse_float_text(fields[6], "confidence")?,
            keypoints: None,
        };
        detection.validate()?;
        Ok(detection)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
