//! `verify`: draw the boxes of a few sampled frames per clip so the
//! annotations can be checked by eye.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use courtside_core::annotation_io::load_video_annotation;
use courtside_core::ffmpeg::{parse_total_frames, FfmpegTools};
use courtside_core::naming::sorted_files;
use courtside_core::overlay::{overlay_file_name, render_frame_overlay, sample_frame_indices, save_jpeg};
use courtside_core::CoreError;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::context::ExecutionContext;
use crate::jobs::{progress_bar, task_failure};
use crate::report::{BatchReport, UnitStatus};

pub const DEFAULT_SAMPLES: usize = 2;

#[derive(Debug, Clone)]
pub struct VerifyJob {
    pub annotations_dir: PathBuf,
    /// Root searched for clip videos.
    pub videos_dir: PathBuf,
    pub output_dir: PathBuf,
    pub samples: usize,
    /// Fixed seed for reproducible sampling.
    pub seed: Option<u64>,
    pub tools: FfmpegTools,
}

/// Annotation files (`*.json`) in `dir`, sorted by name.
pub fn annotation_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    Ok(sorted_files(dir)?
        .into_iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect())
}

/// Find the clip video named `video_path`, either directly under `root` or
/// under `root/{game_id}/{period_id}/` as laid out by the clip command.
pub fn locate_clip_video(root: &Path, video_path: &str) -> Option<PathBuf> {
    let direct = root.join(video_path);
    if direct.exists() {
        return Some(direct);
    }
    let mut parts = video_path.split('_');
    let (game, period) = (parts.next()?, parts.next()?);
    let nested = root.join(game).join(period).join(video_path);
    nested.exists().then_some(nested)
}

async fn verify_annotation(
    job: &VerifyJob,
    annotation_path: PathBuf,
    mut rng: StdRng,
) -> Result<usize, CoreError> {
    let annotation = load_video_annotation(&annotation_path)?;
    let video = locate_clip_video(&job.videos_dir, &annotation.video_path).ok_or_else(|| {
        CoreError::NotFound {
            entity: "clip video",
            key: annotation.video_path.clone(),
        }
    })?;

    let probe = job.tools.probe_video(&video).await?;
    let total_frames = parse_total_frames(&probe).unwrap_or_default();
    let indices = sample_frame_indices(&mut rng, total_frames, job.samples);
    let stem = annotation_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    for &index in &indices {
        let png = job.tools.grab_frame_png(&video, index).await?;
        let image = render_frame_overlay(&png, annotation.frame(index))?;
        save_jpeg(&image, &job.output_dir.join(overlay_file_name(&stem, index)))?;
    }
    tracing::debug!(path = %annotation_path.display(), frames = ?indices, "Rendered overlay frames");
    Ok(indices.len())
}

pub fn run(ctx: &ExecutionContext, job: VerifyJob) -> Result<BatchReport, CoreError> {
    let mut report = BatchReport::start("verify");
    fs::create_dir_all(&job.output_dir).map_err(|e| CoreError::io(&job.output_dir, e))?;
    let files = annotation_files(&job.annotations_dir)?;
    tracing::info!(annotations = files.len(), samples = job.samples, "Verifying clip annotations");

    // One generator per unit, derived up front so a seeded run is
    // reproducible regardless of completion order.
    let mut seeder = match job.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let units: Vec<(PathBuf, StdRng)> = files
        .into_iter()
        .map(|path| (path, StdRng::from_rng(&mut seeder)))
        .collect();

    let bar = progress_bar(units.len(), "verify");
    let job = Arc::new(job);
    let results = ctx.run_async(
        units,
        move |(path, rng): (PathBuf, StdRng)| {
            let job = Arc::clone(&job);
            async move {
                verify_annotation(&job, path.clone(), rng).await.map_err(|e| {
                    tracing::error!(path = %path.display(), error = %e, "Verification failed");
                    e
                })
            }
        },
        |_| bar.inc(1),
    );
    bar.finish_and_clear();

    for result in results {
        let status = match result {
            Ok(Ok(0)) => UnitStatus::Skipped,
            Ok(Ok(_)) => UnitStatus::Succeeded,
            Ok(Err(_)) => UnitStatus::Failed,
            Err(e) => task_failure("verify", &e),
        };
        report.record(status);
    }
    Ok(report.finish())
}
