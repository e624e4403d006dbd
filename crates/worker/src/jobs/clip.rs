//! `clip`: cut one video clip per accepted game-log event.
//!
//! Clips are cut in log order. The first clip ffmpeg fails to produce stops
//! that replay; the driver then appends its source path to the game's
//! failure ledger.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use courtside_core::event_mapper::plan_clips;
use courtside_core::ffmpeg::{CutOutcome, FfmpegTools};
use courtside_core::game_log::read_game_log;
use courtside_core::naming::{find_game_log, list_replays, ReplayName};
use courtside_core::types::GameId;
use courtside_core::CoreError;

use crate::context::ExecutionContext;
use crate::failures::FailureLedger;
use crate::jobs::{progress_bar, task_failure};
use crate::report::{BatchReport, UnitStatus};

#[derive(Debug, Clone)]
pub struct ClipJob {
    pub replays_dir: PathBuf,
    pub game_logs_dir: PathBuf,
    pub clips_dir: PathBuf,
    pub failure_dir: PathBuf,
    pub fps: f64,
    pub tools: FfmpegTools,
}

/// What happened to one replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    Cut { written: usize, existing: usize },
    NoGameLog,
    Failed { game_id: GameId, source: PathBuf, written: usize },
}

async fn clip_replay(
    job: &ClipJob,
    source: PathBuf,
    replay: ReplayName,
) -> Result<ClipOutcome, CoreError> {
    let log_path = match find_game_log(&job.game_logs_dir, replay.game_id) {
        Ok(path) => path,
        Err(e) if e.is_soft() => {
            tracing::warn!(game_id = replay.game_id, error = %e, "No game log, skipping replay");
            return Ok(ClipOutcome::NoGameLog);
        }
        Err(e) => return Err(e),
    };
    let rows = read_game_log(&log_path)?;
    let (plans, _) = plan_clips(&rows, &replay, job.fps);

    let dir = replay.clip_dir(&job.clips_dir);
    fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;

    let (mut written, mut existing) = (0, 0);
    for plan in &plans {
        let dst = dir.join(plan.key.video_file());
        let cut = job
            .tools
            .cut_clip(&source, &dst, plan.window.seek_offset(), plan.window.duration)
            .await;
        match cut {
            Ok(CutOutcome::Written) => written += 1,
            Ok(CutOutcome::AlreadyExists) => existing += 1,
            Err(e) => {
                tracing::error!(
                    game_id = replay.game_id,
                    period = replay.period,
                    event_id = plan.event.id,
                    error = %e,
                    "Clip was not produced, abandoning replay",
                );
                return Ok(ClipOutcome::Failed {
                    game_id: replay.game_id,
                    source,
                    written,
                });
            }
        }
    }

    tracing::debug!(game_id = replay.game_id, period = replay.period, written, existing, "Replay clipped");
    Ok(ClipOutcome::Cut { written, existing })
}

pub fn run(ctx: &ExecutionContext, job: ClipJob) -> Result<BatchReport, CoreError> {
    let mut report = BatchReport::start("clip");
    fs::create_dir_all(&job.clips_dir).map_err(|e| CoreError::io(&job.clips_dir, e))?;
    let replays = list_replays(&job.replays_dir)?;
    tracing::info!(videos = replays.len(), max_parallel = ctx.max_parallel(), "Cutting clips");

    let mut ledger = FailureLedger::new(&job.failure_dir);
    let bar = progress_bar(replays.len(), "clip");
    let job = Arc::new(job);
    let results = ctx.run_async(
        replays,
        move |(source, replay): (PathBuf, ReplayName)| {
            let job = Arc::clone(&job);
            async move { clip_replay(&job, source, replay).await }
        },
        |_| bar.inc(1),
    );
    bar.finish_and_clear();

    for result in results {
        let status = match result {
            Ok(Ok(ClipOutcome::Cut { .. })) => UnitStatus::Succeeded,
            Ok(Ok(ClipOutcome::NoGameLog)) => UnitStatus::Skipped,
            Ok(Ok(ClipOutcome::Failed { game_id, source, .. })) => {
                if let Err(e) = ledger.record(game_id, &source) {
                    tracing::error!(game_id, error = %e, "Could not append to failure ledger");
                }
                UnitStatus::Failed
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Replay could not be clipped");
                UnitStatus::Failed
            }
            Err(e) => task_failure("clip", &e),
        };
        report.record(status);
    }
    tracing::info!(failed_videos = ledger.count(), "Clip run complete");
    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::schema::GAME_LOG_COLUMNS;
    use tempfile::tempdir;

    #[tokio::test]
    async fn failed_cut_reports_source_without_touching_ledger() {
        let root = tempdir().unwrap();
        let logs = root.path().join("logs");
        fs::create_dir_all(&logs).unwrap();
        let mut row = vec![""; GAME_LOG_COLUMNS.len()];
        for (col, value) in [
            ("id", "7"),
            ("action_name", "Steal"),
            ("player_name", "Kyle Lowry"),
            ("half", "1"),
            ("second", "12"),
        ] {
            let i = GAME_LOG_COLUMNS.iter().position(|c| *c == col).unwrap();
            row[i] = value;
        }
        fs::write(
            logs.join("17601.csv"),
            format!("{}\n{}\n", GAME_LOG_COLUMNS.join(";"), row.join(";")),
        )
        .unwrap();
        let source = root.path().join("17601_x_period1.mp4");
        fs::write(&source, b"").unwrap();

        let job = ClipJob {
            replays_dir: root.path().to_path_buf(),
            game_logs_dir: logs,
            clips_dir: root.path().join("clips"),
            failure_dir: root.path().to_path_buf(),
            fps: 30.0,
            tools: FfmpegTools {
                ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
                ffprobe: PathBuf::from("/nonexistent/ffprobe"),
            },
        };
        let replay = ReplayName {
            game_id: 17601,
            period: 1,
        };

        let outcome = clip_replay(&job, source.clone(), replay).await.unwrap();
        assert_eq!(
            outcome,
            ClipOutcome::Failed {
                game_id: 17601,
                source,
                written: 0,
            }
        );
        assert!(!root.path().join("17601_failed_videos.txt").exists());
    }
}
