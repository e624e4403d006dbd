//! Turning game-log events into clip annotations.
//!
//! Each row of a game log is either planned into a clip (a time window that
//! ends shortly after the logged second) or skipped for a [`SkipReason`].
//! Rows are processed in log order; an annotation file that already exists
//! is never rewritten, so an interrupted run can be resumed.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::annotation_io::save_video_annotation;
use crate::error::CoreError;
use crate::naming::{ClipKey, ReplayName};
use crate::schema::lenient::parse_int_text;
use crate::schema::{ActionEvent, ActionType, RawEventRow, VideoAnnotation};
use crate::slicer::{slice_video_annotation, ClipIdentity, ClipWindow};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Administrative log entries that never produce a clip.
pub const IGNORED_ACTIONS: [&str; 18] = [
    "Start of the offensive possession",
    "Shooting guard",
    "Guard",
    "Center",
    "Power forward",
    "Forward",
    "Timeout",
    "Halftime",
    "2nd quarter",
    "Starting lineup",
    "3rd quarter",
    "1st quarter",
    "4th quarter",
    "Match end",
    "Game stop",
    "Ball in play",
    "Error leading to goal",
    "Accurate pass",
];

/// Length of every event clip, in seconds.
pub const CLIP_DURATION_SECS: f64 = 10.0;

/// Seconds added after the logged time so the clip covers the end of the play.
///
/// Free-throw style codes (any code containing `1`) get 4.5 s, turnovers
/// 2.5 s, everything else 3.5 s.
pub fn padding_for(action: ActionType) -> f64 {
    if action.as_str().contains('1') {
        4.5
    } else if action == ActionType::Turnover {
        2.5
    } else {
        3.5
    }
}

// ---------------------------------------------------------------------------
// Skip accounting
// ---------------------------------------------------------------------------

/// Why a game-log row did not produce a clip annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    WrongPeriod,
    Ignored,
    MissingSecond,
    MissingPlayerName,
    UnrecognizedType,
    /// An `Assisting` row without a `teammate_id`.
    MissingTeammate,
    Invalid,
    AlreadyExists,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongPeriod => "wrong_period",
            Self::Ignored => "ignored",
            Self::MissingSecond => "missing_second",
            Self::MissingPlayerName => "missing_player_name",
            Self::UnrecognizedType => "unrecognized_type",
            Self::MissingTeammate => "missing_teammate",
            Self::Invalid => "invalid",
            Self::AlreadyExists => "already_exists",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome counts for one game log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub written: usize,
    pub failed: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl MapSummary {
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &MapSummary) {
        self.written += other.written;
        self.failed += other.failed;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_default() += count;
        }
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// A game-log event accepted for clipping.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedClip {
    pub key: ClipKey,
    /// The event as attached to the clip; its player fields name the actor.
    pub event: ActionEvent,
    pub actor_name: String,
    pub window: ClipWindow,
}

impl PlannedClip {
    pub fn identity(&self) -> ClipIdentity {
        ClipIdentity {
            event_id: self.event.id,
            action: self.event.action_name,
            actor_name: self.actor_name.clone(),
            video_path: self.key.video_file(),
        }
    }

    /// Cut this clip's annotation out of `source` and attach the event.
    pub fn build_annotation(&self, source: &VideoAnnotation) -> Result<VideoAnnotation, CoreError> {
        let mut clip = slice_video_annotation(source, &self.window, &self.identity())?;
        clip.action = Some(self.event.clone());
        Ok(clip)
    }
}

/// Decide whether one row of `replay`'s game log becomes a clip.
pub fn plan_event(row: &RawEventRow, replay: &ReplayName, fps: f64) -> Result<PlannedClip, SkipReason> {
    let half = row
        .get("half")
        .and_then(|h| parse_int_text(h, "half").ok());
    if half != Some(i64::from(replay.period)) {
        return Err(SkipReason::WrongPeriod);
    }

    let code = row.get("action_name").ok_or(SkipReason::Invalid)?;
    if IGNORED_ACTIONS.contains(&code) {
        return Err(SkipReason::Ignored);
    }
    if row.get("second").is_none() {
        return Err(SkipReason::MissingSecond);
    }
    if row.get("player_name").is_none() {
        return Err(SkipReason::MissingPlayerName);
    }
    if ActionType::from_code(code).is_none() {
        return Err(SkipReason::UnrecognizedType);
    }

    let mut event = ActionEvent::from_row(row).map_err(|e| {
        tracing::warn!(event_id = row.get("id"), error = %e, "Skipping invalid game-log row");
        SkipReason::Invalid
    })?;

    let (actor_id, actor_name) = if event.action_name == ActionType::Assisting {
        // Unnamed teammates are credited under the logged player's name.
        match (event.teammate_id.clone(), event.teammate_name.clone()) {
            (Some(id), Some(name)) => (Some(id), name),
            (Some(id), None) => match event.player_name.clone() {
                Some(name) => (Some(id), name),
                None => return Err(SkipReason::MissingPlayerName),
            },
            (None, _) => return Err(SkipReason::MissingTeammate),
        }
    } else {
        match event.player_name.clone() {
            Some(name) => (event.player_id.clone(), name),
            None => return Err(SkipReason::MissingPlayerName),
        }
    };
    event.player_id = actor_id;
    event.player_name = Some(actor_name.clone());

    let second = event.second.ok_or(SkipReason::MissingSecond)?;
    let window = ClipWindow::new(
        second + padding_for(event.action_name),
        CLIP_DURATION_SECS,
        fps,
    )
    .map_err(|e| {
        tracing::warn!(event_id = event.id, error = %e, "Skipping event with unusable clip window");
        SkipReason::Invalid
    })?;

    Ok(PlannedClip {
        key: ClipKey {
            replay: replay.clone(),
            action: event.action_name,
            event_id: event.id,
        },
        event,
        actor_name,
        window,
    })
}

/// Plan every row, in log order. Skips are counted in the summary.
pub fn plan_clips(
    rows: &[RawEventRow],
    replay: &ReplayName,
    fps: f64,
) -> (Vec<PlannedClip>, MapSummary) {
    let mut summary = MapSummary::default();
    let mut plans = Vec::new();
    for row in rows {
        match plan_event(row, replay, fps) {
            Ok(plan) => plans.push(plan),
            Err(reason) => {
                tracing::trace!(event_id = row.get("id"), %reason, "Skipped game-log row");
                summary.record_skip(reason);
            }
        }
    }
    (plans, summary)
}

/// Build the clip annotation of every accepted event, in log order.
///
/// A clip that cannot be built is logged and counted as failed; it never
/// costs the other rows their clips.
pub fn map_events(
    source: &VideoAnnotation,
    rows: &[RawEventRow],
    replay: &ReplayName,
    fps: f64,
) -> (Vec<(ClipKey, VideoAnnotation)>, MapSummary) {
    let (plans, mut summary) = plan_clips(rows, replay, fps);
    let mut clips = Vec::with_capacity(plans.len());
    for plan in plans {
        match plan.build_annotation(source) {
            Ok(clip) => clips.push((plan.key, clip)),
            Err(e) => {
                tracing::warn!(event_id = plan.event.id, error = %e, "Failed to build clip annotation");
                summary.failed += 1;
            }
        }
    }
    (clips, summary)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write one annotation file per accepted event under
/// `{output_root}/{game_id}/{period_id}/`.
///
/// Existing files are left untouched and counted as
/// [`SkipReason::AlreadyExists`]. A clip that fails to build or save is
/// logged and counted as failed; the remaining rows are still processed.
pub fn write_clip_annotations(
    source: &VideoAnnotation,
    rows: &[RawEventRow],
    replay: &ReplayName,
    fps: f64,
    output_root: &Path,
) -> Result<MapSummary, CoreError> {
    let dir = replay.clip_dir(output_root);
    fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;

    let (plans, mut summary) = plan_clips(rows, replay, fps);
    for plan in plans {
        let path = dir.join(plan.key.annotation_file());
        if path.exists() {
            summary.record_skip(SkipReason::AlreadyExists);
            continue;
        }
        match plan
            .build_annotation(source)
            .and_then(|clip| save_video_annotation(&clip, &path))
        {
            Ok(()) => summary.written += 1,
            Err(e) => {
                tracing::error!(
                    game_id = replay.game_id,
                    period = replay.period,
                    event_id = plan.event.id,
                    error = %e,
                    "Failed to write clip annotation",
                );
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        game_id = replay.game_id,
        period = replay.period,
        written = summary.written,
        skipped = summary.skipped_total(),
        failed = summary.failed,
        "Mapped game-log events",
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation_io::load_video_annotation;
    use crate::schema::{FrameAnnotation, GAME_LOG_COLUMNS};
    use tempfile::tempdir;

    fn row(values: &[(&str, &str)]) -> RawEventRow {
        RawEventRow::normalize(GAME_LOG_COLUMNS.iter().map(|col| {
            values
                .iter()
                .find(|(c, _)| c == col)
                .map(|(_, v)| *v)
                .unwrap_or("")
        }))
        .unwrap()
    }

    fn event_row(id: &str, action: &str, second: &str) -> RawEventRow {
        row(&[
            ("id", id),
            ("action_name", action),
            ("player_id", "2544.0"),
            ("player_name", "LeBron James"),
            ("half", "1"),
            ("second", second),
        ])
    }

    fn replay() -> ReplayName {
        ReplayName {
            game_id: 17601,
            period: 1,
        }
    }

    fn source(frames: impl IntoIterator<Item = i64>) -> VideoAnnotation {
        VideoAnnotation {
            video_id: 17601,
            video_path: "17601_period1.mp4".into(),
            frames: frames.into_iter().map(FrameAnnotation::new).collect(),
            caption: None,
            action: None,
        }
    }

    // -- padding -------------------------------------------------------------

    #[test]
    fn padding_by_action() {
        assert_eq!(padding_for(ActionType::Turnover), 2.5);
        assert_eq!(padding_for(ActionType::MadeSingleFreeThrow), 4.5);
        assert_eq!(padding_for(ActionType::ThreePlusOne), 4.5);
        assert_eq!(padding_for(ActionType::Rebound), 3.5);
    }

    #[test]
    fn padding_is_decided_per_row() {
        let rows = vec![
            event_row("1", "1+", "10"),
            event_row("2", "Rebound", "10"),
        ];
        let (plans, _) = plan_clips(&rows, &replay(), 30.0);
        assert_eq!(plans[0].window.start_second, 14.5);
        assert_eq!(plans[1].window.start_second, 13.5);
    }

    // -- filtering -----------------------------------------------------------

    #[test]
    fn rows_are_filtered_with_reasons() {
        let other_half = row(&[
            ("id", "1"),
            ("action_name", "Steal"),
            ("player_name", "X"),
            ("half", "2"),
            ("second", "5"),
        ]);
        let rows = vec![
            other_half,
            event_row("2", "Timeout", "5"),
            row(&[("id", "3"), ("action_name", "Steal"), ("half", "1"), ("player_name", "X")]),
            row(&[("id", "4"), ("action_name", "Steal"), ("half", "1"), ("second", "5")]),
            event_row("5", "Alley-oop", "5"),
            event_row("6", "Steal", "5"),
        ];
        let (plans, summary) = plan_clips(&rows, &replay(), 30.0);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].event.id, 6);
        assert_eq!(summary.skipped_for(SkipReason::WrongPeriod), 1);
        assert_eq!(summary.skipped_for(SkipReason::Ignored), 1);
        assert_eq!(summary.skipped_for(SkipReason::MissingSecond), 1);
        assert_eq!(summary.skipped_for(SkipReason::MissingPlayerName), 1);
        assert_eq!(summary.skipped_for(SkipReason::UnrecognizedType), 1);
        assert_eq!(summary.skipped_total(), 5);
    }

    #[test]
    fn assisting_credits_the_teammate() {
        let assist = row(&[
            ("id", "9"),
            ("action_name", "Assisting"),
            ("player_id", "2544"),
            ("player_name", "LeBron James"),
            ("teammate_id", "202681.0"),
            ("teammate_name", "Kyrie Irving"),
            ("half", "1"),
            ("second", "20"),
        ]);
        let plan = plan_event(&assist, &replay(), 30.0).unwrap();
        assert_eq!(plan.actor_name, "Kyrie Irving");
        assert_eq!(plan.event.player_id.as_deref(), Some("202681"));
        assert_eq!(plan.event.player_name.as_deref(), Some("Kyrie Irving"));
        assert_eq!(plan.identity().caption(), "Assisting by Kyrie Irving");
    }

    #[test]
    fn assisting_without_teammate_is_skipped() {
        let assist = event_row("9", "Assisting", "20");
        assert_eq!(
            plan_event(&assist, &replay(), 30.0),
            Err(SkipReason::MissingTeammate)
        );
    }

    #[test]
    fn assisting_without_teammate_name_keeps_player_name() {
        let assist = row(&[
            ("id", "9"),
            ("action_name", "Assisting"),
            ("player_name", "LeBron James"),
            ("teammate_id", "202681"),
            ("half", "1"),
            ("second", "20"),
        ]);
        let plan = plan_event(&assist, &replay(), 30.0).unwrap();
        assert_eq!(plan.actor_name, "LeBron James");
        assert_eq!(plan.event.player_id.as_deref(), Some("202681"));
    }

    // -- end to end ----------------------------------------------------------

    #[test]
    fn turnover_clip_shifts_frames() {
        let rows = vec![event_row("77", "Turnover", "1.0")];
        let (clips, summary) = map_events(&source(10..=40), &rows, &replay(), 30.0);
        assert_eq!(summary.failed, 0);
        assert_eq!(clips.len(), 1);
        let (key, clip) = &clips[0];
        assert_eq!(key.stem(), "17601_period1_Turnover_77");
        assert_eq!(clip.frames.len(), 31);
        for (frame, source_id) in clip.frames.iter().zip(10..=40) {
            assert_eq!(frame.frame_id, source_id + 195);
        }
        assert_eq!(clip.video_id, 1760177);
        assert_eq!(clip.caption.as_deref(), Some("Turnover by LeBron James"));
        assert_eq!(clip.action.as_ref().unwrap().id, 77);
    }

    #[test]
    fn one_unbuildable_clip_keeps_the_rest() {
        // 922337203 followed by an 11-digit event id overflows a 64-bit clip id.
        let mut video = source(0..300);
        video.video_id = 922337203;
        let rows = vec![event_row("5", "Steal", "4"), event_row("99999999999", "Steal", "6")];

        let (clips, summary) = map_events(&video, &rows, &replay(), 30.0);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].0.event_id, 5);
        assert_eq!(clips[0].1.video_id, 9223372035);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn writing_is_resumable() {
        let dir = tempdir().unwrap();
        let rows = vec![event_row("1", "Steal", "4"), event_row("2", "2+", "8")];
        let video = source(0..300);

        let first = write_clip_annotations(&video, &rows, &replay(), 30.0, dir.path()).unwrap();
        assert_eq!(first.written, 2);

        let path = dir
            .path()
            .join("17601")
            .join("period1")
            .join("17601_period1_2+_2_annotation.json");
        let loaded = load_video_annotation(&path).unwrap();
        assert_eq!(loaded.video_path, "17601_period1_2+_2.mp4");

        let second = write_clip_annotations(&video, &rows, &replay(), 30.0, dir.path()).unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.skipped_for(SkipReason::AlreadyExists), 2);
    }

    #[test]
    fn summaries_merge() {
        let mut a = MapSummary::default();
        a.written = 2;
        a.record_skip(SkipReason::Ignored);
        let mut b = MapSummary::default();
        b.failed = 1;
        b.record_skip(SkipReason::Ignored);
        b.record_skip(SkipReason::WrongPeriod);
        a.merge(&b);
        assert_eq!(a.written, 2);
        assert_eq!(a.failed, 1);
        assert_eq!(a.skipped_for(SkipReason::Ignored), 2);
        assert_eq!(a.skipped_total(), 3);
    }
}
