//! Building a video-level annotation from a replay's detection inputs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::annotation_io::save_video_annotation;
use crate::detections::{
    load_2d_positions, load_player_boxes, merge_boxes, BoxesByFrame, TrackletsByFrame,
};
use crate::error::CoreError;
use crate::naming::{find_all_files_containing, find_file_containing, ReplayName};
use crate::schema::{FrameAnnotation, VideoAnnotation};

/// Directories holding the detection inputs.
#[derive(Debug, Clone)]
pub struct DetectionDirs {
    pub positions_dir: PathBuf,
    pub boxes_dir: PathBuf,
}

/// What happened to one replay during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyOutcome {
    Written { frames: usize },
    AlreadyExists,
}

/// Assemble the annotation for `replay`.
///
/// Missing inputs are logged and treated as empty. Frames are the sorted
/// union of the frame indices found in either input.
pub fn generate_video_annotation(
    replay: &ReplayName,
    video_path: &str,
    dirs: &DetectionDirs,
) -> Result<VideoAnnotation, CoreError> {
    let game = replay.game_id.to_string();
    let period_id = replay.period_id();

    let tracklets = match find_file_containing(
        &dirs.positions_dir,
        &[&game, &replay.quarter_label()],
        "2D positions",
    ) {
        Ok(path) => load_2d_positions(&path)?,
        Err(e) if e.is_soft() => {
            tracing::warn!(game_id = replay.game_id, period = %period_id, error = %e, "No 2D positions");
            TrackletsByFrame::new()
        }
        Err(e) => return Err(e),
    };

    let box_files = find_all_files_containing(&dirs.boxes_dir, &[&game, &period_id])?;
    if box_files.is_empty() {
        tracing::warn!(game_id = replay.game_id, period = %period_id, "No player box files");
    }
    let mut boxes = BoxesByFrame::new();
    for path in &box_files {
        merge_boxes(&mut boxes, load_player_boxes(path)?);
    }

    Ok(assemble(replay, video_path, tracklets, boxes))
}

/// Join tracklets and boxes into frames.
pub fn assemble(
    replay: &ReplayName,
    video_path: &str,
    mut tracklets: TrackletsByFrame,
    mut boxes: BoxesByFrame,
) -> VideoAnnotation {
    let frame_ids: BTreeSet<_> = tracklets.keys().chain(boxes.keys()).copied().collect();
    let frames = frame_ids
        .into_iter()
        .map(|frame_id| FrameAnnotation {
            frame_id,
            bbox: boxes.remove(&frame_id).unwrap_or_default(),
            tracklet: tracklets.remove(&frame_id).flatten(),
        })
        .collect();

    VideoAnnotation {
        video_id: replay.game_id,
        video_path: video_path.to_string(),
        frames,
        caption: Some(format!(
            "Annotation for video {}, {}",
            replay.game_id,
            replay.period_id()
        )),
        action: None,
    }
}

/// Assemble and save the annotation for `replay` into `annotations_dir`,
/// unless it already exists there.
pub fn construct_video_annotation(
    replay: &ReplayName,
    video_path: &Path,
    dirs: &DetectionDirs,
    annotations_dir: &Path,
) -> Result<AssemblyOutcome, CoreError> {
    let output = annotations_dir.join(replay.video_annotation_file());
    if output.exists() {
        tracing::debug!(path = %output.display(), "Video annotation exists, skipping");
        return Ok(AssemblyOutcome::AlreadyExists);
    }
    let annotation =
        generate_video_annotation(replay, &video_path.to_string_lossy(), dirs)?;
    save_video_annotation(&annotation, &output)?;
    tracing::info!(
        game_id = replay.game_id,
        period = replay.period,
        frames = annotation.frames.len(),
        detections = annotation.detection_count(),
        "Generated video annotation",
    );
    Ok(AssemblyOutcome::Written {
        frames: annotation.frames.len(),
    })
}
