//! `annotate`: write one clip annotation per game-log event.

use std::path::PathBuf;
use std::sync::Arc;

use courtside_core::annotation_io::load_video_annotation;
use courtside_core::event_mapper::{write_clip_annotations, MapSummary};
use courtside_core::game_log::read_game_log;
use courtside_core::naming::{find_game_log, list_replays, ReplayName};
use courtside_core::CoreError;

use crate::context::ExecutionContext;
use crate::jobs::{progress_bar, task_failure};
use crate::report::{BatchReport, UnitStatus};

#[derive(Debug, Clone)]
pub struct AnnotateJob {
    pub replays_dir: PathBuf,
    pub game_logs_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fps: f64,
}

/// What happened to one replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateOutcome {
    Mapped(MapSummary),
    /// No game log or no video annotation for the replay.
    MissingInput,
}

/// Map every event of one replay's game log onto its video annotation.
pub fn annotate_replay(job: &AnnotateJob, replay: &ReplayName) -> Result<AnnotateOutcome, CoreError> {
    let log_path = match find_game_log(&job.game_logs_dir, replay.game_id) {
        Ok(path) => path,
        Err(e) if e.is_soft() => {
            tracing::warn!(game_id = replay.game_id, error = %e, "No game log, skipping replay");
            return Ok(AnnotateOutcome::MissingInput);
        }
        Err(e) => return Err(e),
    };

    let annotation_path = job.annotations_dir.join(replay.video_annotation_file());
    if !annotation_path.exists() {
        tracing::warn!(
            game_id = replay.game_id,
            period = replay.period,
            path = %annotation_path.display(),
            "No video annotation, skipping replay",
        );
        return Ok(AnnotateOutcome::MissingInput);
    }

    let rows = read_game_log(&log_path)?;
    let video = load_video_annotation(&annotation_path)?;
    let summary = write_clip_annotations(&video, &rows, replay, job.fps, &job.output_dir)?;
    Ok(AnnotateOutcome::Mapped(summary))
}

/// Run the batch. Returns the per-replay report and the event totals.
pub fn run(ctx: &ExecutionContext, job: AnnotateJob) -> Result<(BatchReport, MapSummary), CoreError> {
    let mut report = BatchReport::start("annotate");
    let replays = list_replays(&job.replays_dir)?;
    tracing::info!(videos = replays.len(), fps = job.fps, "Annotating clips");

    let bar = progress_bar(replays.len(), "annotate");
    let job = Arc::new(job);
    let results = ctx.run_blocking(
        replays,
        move |(_path, replay): (PathBuf, ReplayName)| {
            annotate_replay(&job, &replay).map_err(|e| {
                tracing::error!(
                    game_id = replay.game_id,
                    period = replay.period,
                    error = %e,
                    "Failed to annotate replay",
                );
                e
            })
        },
        |_| bar.inc(1),
    );
    bar.finish_and_clear();

    let mut totals = MapSummary::default();
    for result in results {
        let status = match result {
            Ok(Ok(AnnotateOutcome::Mapped(summary))) => {
                totals.merge(&summary);
                if summary.failed == 0 {
                    UnitStatus::Succeeded
                } else {
                    UnitStatus::Failed
                }
            }
            Ok(Ok(AnnotateOutcome::MissingInput)) => UnitStatus::Skipped,
            Ok(Err(_)) => UnitStatus::Failed,
            Err(e) => task_failure("annotate", &e),
        };
        report.record(status);
    }

    tracing::info!(
        written = totals.written,
        skipped = totals.skipped_total(),
        failed = totals.failed,
        "Clip annotation totals",
    );
    Ok((report.finish(), totals))
}

