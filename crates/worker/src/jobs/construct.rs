//! `construct`: assemble one video annotation per replay from its detection
//! inputs.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use courtside_core::assembly::{construct_video_annotation, AssemblyOutcome, DetectionDirs};
use courtside_core::naming::{list_replays, ReplayName};
use courtside_core::CoreError;

use crate::context::ExecutionContext;
use crate::jobs::{progress_bar, task_failure};
use crate::report::{BatchReport, UnitStatus};

#[derive(Debug, Clone)]
pub struct ConstructJob {
    pub replays_dir: PathBuf,
    pub inputs: DetectionDirs,
    pub annotations_dir: PathBuf,
}

pub fn run(ctx: &ExecutionContext, job: ConstructJob) -> Result<BatchReport, CoreError> {
    let mut report = BatchReport::start("construct");
    fs::create_dir_all(&job.annotations_dir).map_err(|e| CoreError::io(&job.annotations_dir, e))?;
    let replays = list_replays(&job.replays_dir)?;
    tracing::info!(videos = replays.len(), "Constructing video annotations");

    let bar = progress_bar(replays.len(), "construct");
    let job = Arc::new(job);
    let results = ctx.run_blocking(
        replays,
        move |(path, replay): (PathBuf, ReplayName)| {
            construct_video_annotation(&replay, &path, &job.inputs, &job.annotations_dir).map_err(
                |e| {
                    tracing::error!(
                        game_id = replay.game_id,
                        period = replay.period,
                        error = %e,
                        "Failed to construct video annotation",
                    );
                    e
                },
            )
        },
        |_| bar.inc(1),
    );
    bar.finish_and_clear();

    for result in results {
        let status = match result {
            Ok(Ok(AssemblyOutcome::Written { .. })) => UnitStatus::Succeeded,
            Ok(Ok(AssemblyOutcome::AlreadyExists)) => UnitStatus::Skipped,
            Ok(Err(_)) => UnitStatus::Failed,
            Err(e) => task_failure("construct", &e),
        };
        report.record(status);
    }
    Ok(report.finish())
}
