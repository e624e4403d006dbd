//! Dataset file naming conventions.
//!
//! Replay videos are named
//! `{game_id}_{date}_{n}_{home}_{score}_{away}_period{p}.mp4`; every derived
//! file is keyed by game id and period id.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;
use crate::schema::ActionType;
use crate::types::GameId;

/// Extension of replay and clip videos.
pub const VIDEO_EXTENSION: &str = "mp4";

// ---------------------------------------------------------------------------
// Replay video names
// ---------------------------------------------------------------------------

/// Identity of one replay video: a game and one of its periods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplayName {
    pub game_id: GameId,
    /// Period number, e.g. `3` for `period3`.
    pub period: u32,
}

impl ReplayName {
    /// Parse a replay file name. Returns `None` for anything that does not
    /// follow the convention.
    pub fn parse(file_name: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"^(?P<game>\d+)_.*_period(?P<period>\d+)\.mp4$").expect("valid regex")
        });
        let caps = re.captures(file_name)?;
        Some(Self {
            game_id: caps["game"].parse().ok()?,
            period: caps["period"].parse().ok()?,
        })
    }

    /// Period id as used in file names, e.g. `period3`.
    pub fn period_id(&self) -> String {
        format!("period{}", self.period)
    }

    /// Quarter label used by the 2D-position exports, e.g. `Q3`.
    pub fn quarter_label(&self) -> String {
        format!("Q{}", self.period)
    }

    /// File name of the video-level annotation for this replay.
    pub fn video_annotation_file(&self) -> String {
        format!("{}_{}_video_annotation.json", self.game_id, self.period_id())
    }

    /// Output directory for this replay's clips: `{root}/{game_id}/{period_id}`.
    pub fn clip_dir(&self, root: &Path) -> PathBuf {
        root.join(self.game_id.to_string()).join(self.period_id())
    }
}

// ---------------------------------------------------------------------------
// Clip keys
// ---------------------------------------------------------------------------

/// Composite key of one event clip: `{game_id}_{period_id}_{action}_{event_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipKey {
    pub replay: ReplayName,
    pub action: ActionType,
    pub event_id: i64,
}

impl ClipKey {
    pub fn stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.replay.game_id,
            self.replay.period_id(),
            self.action.as_str(),
            self.event_id
        )
    }

    /// File name of the transcoded clip video.
    pub fn video_file(&self) -> String {
        format!("{}.{VIDEO_EXTENSION}", self.stem())
    }

    /// File name of the clip annotation.
    pub fn annotation_file(&self) -> String {
        format!("{}_annotation.json", self.stem())
    }
}

// ---------------------------------------------------------------------------
// Directory lookups
// ---------------------------------------------------------------------------

/// List the regular files of `dir` in name order.
pub fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| CoreError::io(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Replay videos in `dir`, sorted by name. Hidden files and non-video
/// entries are ignored.
pub fn list_replays(dir: &Path) -> Result<Vec<(PathBuf, ReplayName)>, CoreError> {
    let mut replays = Vec::new();
    for path in sorted_files(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || path.extension().and_then(|e| e.to_str()) != Some(VIDEO_EXTENSION) {
            continue;
        }
        match ReplayName::parse(name) {
            Some(replay) => replays.push((path.clone(), replay)),
            None => tracing::warn!(file = name, "Skipping replay with unrecognized name"),
        }
    }
    Ok(replays)
}

/// First file in `dir` (by name) whose name contains every `needle`.
pub fn find_file_containing(
    dir: &Path,
    needles: &[&str],
    entity: &'static str,
) -> Result<PathBuf, CoreError> {
    find_all_files_containing(dir, needles)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::NotFound {
            entity,
            key: format!("{} in {}", needles.join(" + "), dir.display()),
        })
}

/// Every file in `dir` (by name) whose name contains every `needle`.
pub fn find_all_files_containing(dir: &Path, needles: &[&str]) -> Result<Vec<PathBuf>, CoreError> {
    Ok(sorted_files(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| needles.iter().all(|needle| n.contains(needle)))
        })
        .collect())
}

/// Game log for `game_id` in `log_dir`.
pub fn find_game_log(log_dir: &Path, game_id: GameId) -> Result<PathBuf, CoreError> {
    find_file_containing(log_dir, &[&game_id.to_string()], "game log")
}
