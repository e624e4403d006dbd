//! Tracked court positions and their link to video frames.

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::CoreError;
use crate::threshold_validation::{validate_finite, validate_non_negative, validate_range};
use crate::types::FrameIndex;

/// Court length in position units.
pub const COURT_LENGTH: f64 = 100.0;

/// Court width in position units.
pub const COURT_WIDTH: f64 = 50.0;

/// Team and player id carried by the ball.
pub const BALL_ID: i64 = -1;

/// Position of a player or the ball in court coordinates.
///
/// `x_position` runs along the court in `[0, 100]`, `y_position` across it in
/// `[0, 50]`. `z_position` is only meaningful for the ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtPosition {
    #[serde(deserialize_with = "lenient::int")]
    pub team_id: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub player_id: i64,
    pub x_position: f64,
    pub y_position: f64,
    pub z_position: f64,
}

impl CourtPosition {
    pub fn is_ball(&self) -> bool {
        self.team_id == BALL_ID && self.player_id == BALL_ID
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if (self.team_id == BALL_ID) != (self.player_id == BALL_ID) {
            return Err(CoreError::Validation(format!(
                "ball positions need team_id and player_id both {BALL_ID}, got team {} player {}",
                self.team_id, self.player_id
            )));
        }
        validate_range(self.x_position, 0.0, COURT_LENGTH, "x_position")?;
        validate_range(self.y_position, 0.0, COURT_WIDTH, "y_position")?;
        validate_finite(self.z_position, "z_position")
    }
}

/// Positions of every player and the ball at one game-clock instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    #[serde(deserialize_with = "lenient::int")]
    pub quarter: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub moment_id: i64,
    pub time_remaining_in_quarter: f64,
    #[serde(default)]
    pub time_remaining_on_shot_clock: Option<f64>,
    #[serde(default, deserialize_with = "lenient::null_as_empty")]
    pub player_positions: Vec<CourtPosition>,
}

impl Moment {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.quarter < 1 {
            return Err(CoreError::Validation(format!(
                "quarter must be at least 1, got {}",
                self.quarter
            )));
        }
        validate_non_negative(self.time_remaining_in_quarter, "time_remaining_in_quarter")?;
        if let Some(shot_clock) = self.time_remaining_on_shot_clock {
            validate_non_negative(shot_clock, "time_remaining_on_shot_clock")?;
        }
        for position in &self.player_positions {
            position.validate()?;
        }
        Ok(())
    }

    pub fn ball(&self) -> Option<&CourtPosition> {
        self.player_positions.iter().find(|p| p.is_ball())
    }
}

/// Link between a video frame and a [`Moment`], recovered by reading the
/// on-screen clock.
///
/// `pred_quarter` and `pred_time_remaining` are the OCR readings and may be
/// noisy; the moment's own clock is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracklet {
    #[serde(deserialize_with = "lenient::int")]
    pub frame_number: FrameIndex,
    pub pred_quarter: String,
    pub pred_time_remaining: f64,
    pub moment: Moment,
}

impl Tracklet {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_finite(self.pred_time_remaining, "pred_time_remaining")?;
        self.moment.validate()
    }
}
