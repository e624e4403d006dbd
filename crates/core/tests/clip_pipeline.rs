//! End-to-end: detection inputs -> video annotation -> clip annotations.

use std::fs;
use std::path::Path;

use courtside_core::assembly::{construct_video_annotation, AssemblyOutcome, DetectionDirs};
use courtside_core::event_mapper::{write_clip_annotations, SkipReason};
use courtside_core::game_log::read_game_log;
use courtside_core::naming::{find_game_log, list_replays};
use courtside_core::schema::GAME_LOG_COLUMNS;
use courtside_core::load_video_annotation;

const REPLAY: &str = "17601_11-01-2015_1_Cleveland Cavaliers_98_Toronto Raptors_period1.mp4";

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

fn write_dataset(root: &Path) -> DetectionDirs {
    let dirs = DetectionDirs {
        positions_dir: root.join("2d-player-positions"),
        boxes_dir: root.join("player-tracklets"),
    };
    for dir in [
        root.join("game-replays"),
        root.join("hudl-game-logs"),
        root.join("annotations"),
        dirs.positions_dir.clone(),
        dirs.boxes_dir.clone(),
    ] {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(root.join("game-replays").join(REPLAY), b"").unwrap();

    let boxes: String = (0..=90)
        .map(|f| format!("{f},7,100,50,40,80,0.9\n"))
        .collect();
    fs::write(dirs.boxes_dir.join("17601_period1_tracks.txt"), boxes).unwrap();
    fs::write(
        dirs.positions_dir.join("17601_Q1.json"),
        r#"{"3": {"pred_quarter": "1", "pred_time_remaining": 719.0,
                  "moment": {"quarter": 1, "moment_id": 1, "time_remaining_in_quarter": 719.0,
                             "time_remaining_on_shot_clock": null, "player_positions": null}},
            "95": null}"#,
    )
    .unwrap();

    let log = [
        GAME_LOG_COLUMNS.join(";"),
        log_line(&[
            ("id", "501"),
            ("action_name", "Steal"),
            ("player_id", "200768"),
            ("player_name", "Kyle Lowry"),
            ("half", "1"),
            ("second", "1.0"),
        ]),
        log_line(&[("id", "502"), ("action_name", "Timeout"), ("half", "1"), ("second", "2")]),
        log_line(&[
            ("id", "503"),
            ("action_name", "Turnover"),
            ("player_name", "Kyle Lowry"),
            ("half", "2"),
            ("second", "4"),
        ]),
    ]
    .join("\n");
    fs::write(root.join("hudl-game-logs").join("hudl_17601.csv"), log).unwrap();
    dirs
}

#[test]
fn detections_to_clip_annotations() {
    let root = tempfile::tempdir().unwrap();
    let dirs = write_dataset(root.path());
    let annotations = root.path().join("annotations");

    let replays = list_replays(&root.path().join("game-replays")).unwrap();
    assert_eq!(replays.len(), 1);
    let (replay_path, replay) = &replays[0];

    let outcome = construct_video_annotation(replay, replay_path, &dirs, &annotations).unwrap();
    assert_eq!(outcome, AssemblyOutcome::Written { frames: 92 });

    let video = load_video_annotation(&annotations.join(replay.video_annotation_file())).unwrap();
    assert_eq!(video.frame_span(), Some((0, 95)));
    assert!(video.frame(3).unwrap().tracklet.is_some());
    assert!(video.frame(95).unwrap().bbox.is_empty());

    let log = find_game_log(&root.path().join("hudl-game-logs"), replay.game_id).unwrap();
    let rows = read_game_log(&log).unwrap();
    let out = root.path().join("clip-annotations");
    let summary = write_clip_annotations(&video, &rows, replay, 30.0, &out).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped_for(SkipReason::Ignored), 1);
    assert_eq!(summary.skipped_for(SkipReason::WrongPeriod), 1);

    // Steal at 1.0 s: padding 3.5 s, window [-165, 135) at 30 fps.
    let clip = load_video_annotation(
        &out.join("17601")
            .join("period1")
            .join("17601_period1_Steal_501_annotation.json"),
    )
    .unwrap();
    assert_eq!(clip.video_id, 17601501);
    assert_eq!(clip.video_path, "17601_period1_Steal_501.mp4");
    assert_eq!(clip.caption.as_deref(), Some("Steal by Kyle Lowry"));
    assert_eq!(clip.frames.len(), 92);
    assert_eq!(clip.frame_span(), Some((165, 260)));
    let frame = clip.frame(168).unwrap();
    assert_eq!(frame.bbox[0].frame_number, 168);
    assert_eq!(frame.tracklet.as_ref().unwrap().frame_number, 168);
    let action = clip.action.unwrap();
    assert_eq!(action.id, 501);
    assert_eq!(action.player_id.as_deref(), Some("200768"));
}
