//! Integration tests for the batch drivers over a small on-disk dataset.
//!
//! No test here runs a real ffmpeg; the clip job is pointed at a missing
//! binary to exercise the failure ledger.

use std::fs;
use std::path::{Path, PathBuf};

use courtside_core::assembly::DetectionDirs;
use courtside_core::event_mapper::SkipReason;
use courtside_core::ffmpeg::FfmpegTools;
use courtside_core::schema::GAME_LOG_COLUMNS;
use courtside_worker::config::DatasetPaths;
use courtside_worker::context::ExecutionContext;
use courtside_worker::jobs::{annotate, clip, construct};

const REPLAYS: [&str; 2] = [
    "17601_11-01-2015_1_Cleveland Cavaliers_98_Toronto Raptors_period1.mp4",
    "17601_11-01-2015_1_Cleveland Cavaliers_98_Toronto Raptors_period2.mp4",
];

fn log_line(values: &[(&str, &str)]) -> String {
    GAME_LOG_COLUMNS
        .iter()
        .map(|col| {
            values
                .iter()
                .find(|(c, _)| c == col)
                .map(|(_, v)| *v)
                .unwrap_or("")
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn dataset(root: &Path) -> DatasetPaths {
    let data = DatasetPaths::under(root);
    for dir in [&data.replays, &data.game_logs, &data.positions, &data.boxes] {
        fs::create_dir_all(dir).unwrap();
    }
    for name in REPLAYS {
        fs::write(data.replays.join(name), b"").unwrap();
    }
    fs::write(data.replays.join(".DS_Store"), b"").unwrap();

    for period in ["period1", "period2"] {
        let boxes: String = (0..300)
            .map(|f| format!("{f},3,10,10,20,40,0.8\n"))
            .collect();
        fs::write(data.boxes.join(format!("17601_{period}.txt")), boxes).unwrap();
    }

    let log = [
        GAME_LOG_COLUMNS.join(";"),
        log_line(&[
            ("id", "1"),
            ("action_name", "2+"),
            ("player_name", "DeMar DeRozan"),
            ("half", "1"),
            ("second", "5"),
        ]),
        log_line(&[
            ("id", "2"),
            ("action_name", "Rebound"),
            ("player_name", "Jonas Valanciunas"),
            ("half", "2"),
            ("second", "3"),
        ]),
        log_line(&[
            ("id", "3"),
            ("action_name", "Assisting"),
            ("player_name", "Kyle Lowry"),
            ("half", "2"),
            ("second", "3"),
        ]),
    ]
    .join("\n");
    fs::write(data.game_logs.join("17601_hudl.csv"), log).unwrap();
    data
}

fn construct_job(data: &DatasetPaths) -> construct::ConstructJob {
    construct::ConstructJob {
        replays_dir: data.replays.clone(),
        inputs: DetectionDirs {
            positions_dir: data.positions.clone(),
            boxes_dir: data.boxes.clone(),
        },
        annotations_dir: data.annotations.clone(),
    }
}

fn annotate_job(data: &DatasetPaths) -> annotate::AnnotateJob {
    annotate::AnnotateJob {
        replays_dir: data.replays.clone(),
        game_logs_dir: data.game_logs.clone(),
        annotations_dir: data.annotations.clone(),
        output_dir: data.clip_annotations.clone(),
        fps: 30.0,
    }
}

// ---------------------------------------------------------------------------
// construct + annotate
// ---------------------------------------------------------------------------

#[test]
fn construct_then_annotate_is_resumable() {
    let root = tempfile::tempdir().unwrap();
    let data = dataset(root.path());
    let ctx = ExecutionContext::new(2).unwrap();

    let report = construct::run(&ctx, construct_job(&data)).unwrap();
    assert_eq!((report.total, report.succeeded, report.failed), (2, 2, 0));
    assert!(data.annotations.join("17601_period1_video_annotation.json").exists());

    let (report, totals) = annotate::run(&ctx, annotate_job(&data)).unwrap();
    assert_eq!((report.total, report.succeeded), (2, 2));
    assert_eq!(totals.written, 2);
    assert_eq!(totals.skipped_for(SkipReason::MissingTeammate), 1);
    assert!(data
        .clip_annotations
        .join("17601/period1/17601_period1_2+_1_annotation.json")
        .exists());
    assert!(data
        .clip_annotations
        .join("17601/period2/17601_period2_Rebound_2_annotation.json")
        .exists());

    let again = construct::run(&ctx, construct_job(&data)).unwrap();
    assert_eq!(again.skipped, 2);
    let (_, totals) = annotate::run(&ctx, annotate_job(&data)).unwrap();
    assert_eq!(totals.written, 0);
    assert_eq!(totals.skipped_for(SkipReason::AlreadyExists), 2);

    ctx.shutdown();
}

#[test]
fn annotate_without_inputs_skips() {
    let root = tempfile::tempdir().unwrap();
    let data = dataset(root.path());
    fs::remove_file(data.game_logs.join("17601_hudl.csv")).unwrap();
    let ctx = ExecutionContext::new(2).unwrap();

    let (report, totals) = annotate::run(&ctx, annotate_job(&data)).unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(totals.written, 0);
    ctx.shutdown();
}

// ---------------------------------------------------------------------------
// clip
// ---------------------------------------------------------------------------

#[test]
fn missing_ffmpeg_records_failures() {
    let root = tempfile::tempdir().unwrap();
    let data = dataset(root.path());
    let failure_dir = root.path().join("failures");
    fs::create_dir_all(&failure_dir).unwrap();
    let ctx = ExecutionContext::new(2).unwrap();

    let report = clip::run(
        &ctx,
        clip::ClipJob {
            replays_dir: data.replays.clone(),
            game_logs_dir: data.game_logs.clone(),
            clips_dir: data.clips.clone(),
            failure_dir: failure_dir.clone(),
            fps: 30.0,
            tools: FfmpegTools {
                ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
                ffprobe: PathBuf::from("/nonexistent/ffprobe"),
            },
        },
    )
    .unwrap();
    ctx.shutdown();

    assert_eq!((report.total, report.failed), (2, 2));
    let ledger = fs::read_to_string(failure_dir.join("17601_failed_videos.txt")).unwrap();
    assert_eq!(ledger.lines().count(), 2);
    assert!(ledger.contains("period1.mp4"));
    assert!(ledger.contains("period2.mp4"));
}
