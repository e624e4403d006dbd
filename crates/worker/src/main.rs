//! `courtside` -- basketball clip-annotation dataset tooling.
//!
//! Subcommands run over a dataset tree rooted at `COURTSIDE_DATA_DIR`:
//!
//! | Command     | Reads                                        | Writes              |
//! |-------------|----------------------------------------------|---------------------|
//! | `construct` | `game-replays`, `2d-player-positions`, `player-tracklets` | `annotations` |
//! | `annotate`  | `game-replays`, `hudl-game-logs`, `annotations` | `clip-annotations` |
//! | `clip`      | `game-replays`, `hudl-game-logs`             | `clips`             |
//! | `verify`    | a clip-annotation directory, `clips`         | overlay JPEGs       |
//!
//! See [`WorkerConfig::from_env`] for the environment variables.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtside_core::assembly::DetectionDirs;
use courtside_worker::config::WorkerConfig;
use courtside_worker::context::ExecutionContext;
use courtside_worker::jobs::{annotate, clip, construct, verify};
use courtside_worker::report::BatchReport;

#[derive(Debug, Parser)]
#[command(name = "courtside", version, about = "Basketball clip-annotation dataset tooling")]
struct Cli {
    /// Dataset root (overrides COURTSIDE_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Maximum videos processed at once (overrides COURTSIDE_MAX_PARALLEL).
    #[arg(long, global = true, value_name = "N")]
    max_parallel: Option<usize>,

    /// Frame rate of the replay videos (overrides COURTSIDE_FPS).
    #[arg(long, global = true)]
    fps: Option<f64>,

    /// Also write the batch report as JSON.
    #[arg(long, global = true, value_name = "FILE")]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assemble video annotations from detection inputs.
    Construct,
    /// Write clip annotations from game logs.
    Annotate,
    /// Cut event clips with ffmpeg.
    Clip,
    /// Draw sampled frames of each clip with its boxes.
    Verify {
        /// Directory of clip annotation files.
        #[arg(long, value_name = "DIR")]
        annotations: PathBuf,
        /// Root of the clip videos (default: `<data>/clips`).
        #[arg(long, value_name = "DIR")]
        videos: Option<PathBuf>,
        /// Where overlay JPEGs are written.
        #[arg(long, value_name = "DIR", default_value = "output_frames")]
        output: PathBuf,
        /// Frames sampled per clip.
        #[arg(long, default_value_t = verify::DEFAULT_SAMPLES)]
        samples: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = WorkerConfig::from_env().context("Invalid worker configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(n) = cli.max_parallel {
        anyhow::ensure!(n > 0, "--max-parallel must be positive");
        config.max_parallel = n;
    }
    if let Some(fps) = cli.fps {
        anyhow::ensure!(fps.is_finite() && fps > 0.0, "--fps must be a positive number");
        config.fps = fps;
    }
    tracing::info!(
        data_dir = %config.data_dir.display(),
        fps = config.fps,
        max_parallel = config.max_parallel,
        "Loaded worker configuration",
    );

    let ctx = ExecutionContext::new(config.max_parallel).context("Failed to start runtime")?;
    let result = run_command(&ctx, &config, cli.command);
    ctx.shutdown();
    let report = result?;

    if let Some(path) = cli.report {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }
    Ok(())
}

fn run_command(
    ctx: &ExecutionContext,
    config: &WorkerConfig,
    command: Command,
) -> anyhow::Result<BatchReport> {
    let data = config.dataset();
    let report = match command {
        Command::Construct => construct::run(
            ctx,
            construct::ConstructJob {
                replays_dir: data.replays,
                inputs: DetectionDirs {
                    positions_dir: data.positions,
                    boxes_dir: data.boxes,
                },
                annotations_dir: data.annotations,
            },
        )?,
        Command::Annotate => {
            let (report, _) = annotate::run(
                ctx,
                annotate::AnnotateJob {
                    replays_dir: data.replays,
                    game_logs_dir: data.game_logs,
                    annotations_dir: data.annotations,
                    output_dir: data.clip_annotations,
                    fps: config.fps,
                },
            )?;
            report
        }
        Command::Clip => clip::run(
            ctx,
            clip::ClipJob {
                replays_dir: data.replays,
                game_logs_dir: data.game_logs,
                clips_dir: data.clips,
                failure_dir: config.failure_dir.clone(),
                fps: config.fps,
                tools: config.tools(),
            },
        )?,
        Command::Verify {
            annotations,
            videos,
            output,
            samples,
            seed,
        } => verify::run(
            ctx,
            verify::VerifyJob {
                annotations_dir: annotations,
                videos_dir: videos.unwrap_or(data.clips),
                output_dir: output,
                samples,
                seed,
                tools: config.tools(),
            },
        )?,
    };
    Ok(report)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "courtside_worker=info,courtside_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
