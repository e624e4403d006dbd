//! End-of-batch summary.

use std::fs;
use std::path::Path;

use chrono::Utc;
use courtside_core::types::Timestamp;
use courtside_core::CoreError;
use serde::Serialize;

/// Outcome counts of one batch command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub command: String,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// How a single unit of a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl BatchReport {
    pub fn start(command: &str) -> Self {
        Self {
            command: command.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            total: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
        }
    }

    pub fn record(&mut self, status: UnitStatus) {
        self.total += 1;
        match status {
            UnitStatus::Succeeded => self.succeeded += 1,
            UnitStatus::Failed => self.failed += 1,
            UnitStatus::Skipped => self.skipped += 1,
        }
    }

    /// Stamp the finish time and log the totals.
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        tracing::info!(
            command = %self.command,
            total = self.total,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            "Batch finished",
        );
        self
    }

    pub fn write_json(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| CoreError::io(path, e))
    }
}
