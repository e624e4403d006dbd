//! Whole-body pose keypoints attached to a detection.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::keypoints::{keypoint_index, KEYPOINT_COUNT, SKELETON};
use crate::threshold_validation::{validate_finite, validate_unit_range};

/// One landmark: `(x, y, confidence)`. Serialized as a 3-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint(pub f64, pub f64, pub f64);

impl Keypoint {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn confidence(&self) -> f64 {
        self.2
    }
}

/// Exactly [`KEYPOINT_COUNT`] landmarks in COCO-WholeBody order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseKeypoints {
    points: Vec<Keypoint>,
}

impl PoseKeypoints {
    /// Build a pose, rejecting the wrong landmark count or invalid values.
    pub fn new(points: Vec<Keypoint>) -> Result<Self, CoreError> {
        let pose = Self { points };
        pose.validate()?;
        Ok(pose)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.points.len() != KEYPOINT_COUNT {
            return Err(CoreError::Validation(format!(
                "keypoints must contain exactly {KEYPOINT_COUNT} entries, got {}",
                self.points.len()
            )));
        }
        for (i, kp) in self.points.iter().enumerate() {
            validate_finite(kp.x(), &format!("keypoints[{i}].x"))?;
            validate_finite(kp.y(), &format!("keypoints[{i}].y"))?;
            validate_unit_range(kp.confidence(), &format!("keypoints[{i}].confidence"))?;
        }
        Ok(())
    }

    pub fn points(&self) -> &[Keypoint] {
        &self.points
    }

    /// Landmark by name, e.g. `"left_wrist"`.
    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        keypoint_index(name).and_then(|i| self.points.get(i))
    }

    /// The fixed bone list shared by every pose.
    pub fn skeleton() -> &'static [(usize, usize)] {
        &SKELETON
    }

    /// Bone endpoints whose landmarks both reach `min_confidence`.
    pub fn visible_bones(&self, min_confidence: f64) -> Vec<(Keypoint, Keypoint)> {
        SKELETON
            .iter()
            .filter_map(|&(a, b)| {
                let (pa, pb) = (self.points.get(a)?, self.points.get(b)?);
                (pa.confidence() >= min_confidence && pb.confidence() >= min_confidence)
                    .then_some((*pa, *pb))
            })
            .collect()
    }
}
