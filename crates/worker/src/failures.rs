//! Per-game ledgers of replay videos whose clips could not be produced.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use courtside_core::types::GameId;
use courtside_core::CoreError;

/// Every this-many failures a running total is logged.
pub const FAILURE_LOG_INTERVAL: usize = 100;

/// Appends failed source paths to `{dir}/{game_id}_failed_videos.txt`.
///
/// Owned by the batch driver, which records failures as tasks complete, so
/// no file I/O happens on runtime worker threads.
pub struct FailureLedger {
    dir: PathBuf,
    count: usize,
}

impl FailureLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            count: 0,
        }
    }

    pub fn ledger_path(&self, game_id: GameId) -> PathBuf {
        self.dir.join(format!("{game_id}_failed_videos.txt"))
    }

    /// Append `source` to the game's ledger and bump the failure count.
    pub fn record(&mut self, game_id: GameId, source: &Path) -> Result<(), CoreError> {
        let path = self.ledger_path(game_id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| CoreError::io(&path, e))?;
        writeln!(file, "{}", source.display()).map_err(|e| CoreError::io(&path, e))?;

        self.count += 1;
        if self.count % FAILURE_LOG_INTERVAL == 0 {
            tracing::warn!(failed = self.count, "Failed videos so far");
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_one_line_per_failure() {
        let dir = tempdir().unwrap();
        let mut ledger = FailureLedger::new(dir.path());
        ledger.record(17601, Path::new("game-replays/a_period1.mp4")).unwrap();
        ledger.record(17601, Path::new("game-replays/a_period2.mp4")).unwrap();
        ledger.record(17993, Path::new("game-replays/b_period1.mp4")).unwrap();

        let text = std::fs::read_to_string(dir.path().join("17601_failed_videos.txt")).unwrap();
        assert_eq!(
            text,
            "game-replays/a_period1.mp4\ngame-replays/a_period2.mp4\n"
        );
        assert!(ledger.ledger_path(17993).exists());
        assert_eq!(ledger.count(), 3);
    }

    #[test]
    fn missing_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let mut ledger = FailureLedger::new(dir.path().join("nope"));
        assert!(ledger.record(1, Path::new("x.mp4")).is_err());
        assert_eq!(ledger.count(), 0);
    }
}
