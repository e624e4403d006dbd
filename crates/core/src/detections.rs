//! Loaders for the raw detection inputs of a replay video.
//!
//! - 2D positions: a JSON object mapping frame index (as a string) to a
//!   tracklet without its `frame_number`, or `null`.
//! - Player boxes: comma-separated `frame,player,x,y,w,h,conf[,...]` lines.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::CoreError;
use crate::schema::lenient::parse_int_text;
use crate::schema::{DetectionBox, Tracklet};
use crate::types::FrameIndex;

/// Tracklets keyed by frame. `None` marks a frame with no clock reading.
pub type TrackletsByFrame = BTreeMap<FrameIndex, Option<Tracklet>>;

/// Player boxes keyed by frame, in file order within a frame.
pub type BoxesByFrame = BTreeMap<FrameIndex, Vec<DetectionBox>>;

// ---------------------------------------------------------------------------
// 2D positions
// ---------------------------------------------------------------------------

pub fn load_2d_positions(path: &Path) -> Result<TrackletsByFrame, CoreError> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    parse_2d_positions(&bytes).map_err(|e| match e {
        CoreError::Validation(msg) => CoreError::Validation(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_2d_positions(bytes: &[u8]) -> Result<TrackletsByFrame, CoreError> {
    let raw: BTreeMap<String, Option<Value>> = serde_json::from_slice(bytes)?;
    let mut tracklets = TrackletsByFrame::new();
    for (key, body) in raw {
        let frame = parse_int_text(&key, "frame index")?;
        let tracklet = match body {
            Some(Value::Object(mut fields)) => {
                fields.insert("frame_number".to_string(), Value::from(frame));
                let tracklet: Tracklet = serde_json::from_value(Value::Object(fields))
                    .map_err(|e| CoreError::Validation(format!("frame {frame}: {e}")))?;
                tracklet
                    .validate()
                    .map_err(|e| CoreError::Validation(format!("frame {frame}: {e}")))?;
                Some(tracklet)
            }
            Some(Value::Null) | None => None,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "frame {frame}: expected a tracklet object, got {other}"
                )))
            }
        };
        tracklets.insert(frame, tracklet);
    }
    Ok(tracklets)
}

// ---------------------------------------------------------------------------
// Player boxes
// ---------------------------------------------------------------------------

pub fn load_player_boxes(path: &Path) -> Result<BoxesByFrame, CoreError> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    parse_player_boxes(file, &path.display().to_string())
}

/// Parse box lines. Malformed lines are logged and dropped.
pub fn parse_player_boxes<R: Read>(reader: R, source: &str) -> Result<BoxesByFrame, CoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut boxes = BoxesByFrame::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| {
            CoreError::Validation(format!("{source}: unreadable box record: {e}"))
        })?;
        let fields: Vec<&str> = record.iter().collect();
        match DetectionBox::from_record(&fields) {
            Ok(detection) => boxes.entry(detection.frame_number).or_default().push(detection),
            Err(e) => tracing::warn!(
                source,
                line = record.position().map(|p| p.line()).unwrap_or_default(),
                error = %e,
                "Skipping malformed box record",
            ),
        }
    }
    Ok(boxes)
}

/// Merge several box files; a frame present in more than one keeps all boxes
/// in file order.
pub fn merge_boxes(target: &mut BoxesByFrame, other: BoxesByFrame) {
    for (frame, mut detections) in other {
        target.entry(frame).or_default().append(&mut detections);
    }
}
