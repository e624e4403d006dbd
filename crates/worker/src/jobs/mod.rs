//! Batch commands. Each job fans its units (one replay video or one clip
//! annotation) out over an [`ExecutionContext`](crate::context::ExecutionContext)
//! and folds the results into a [`BatchReport`](crate::report::BatchReport).

pub mod annotate;
pub mod clip;
pub mod construct;
pub mod verify;

use indicatif::{ProgressBar, ProgressStyle};

use crate::context::TaskError;
use crate::report::UnitStatus;

/// Progress bar ticking once per finished unit.
pub(crate) fn progress_bar(len: usize, label: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{prefix:>10} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_prefix(label);
    bar
}

/// Status of a unit whose task itself failed (panic or cancellation).
pub(crate) fn task_failure(command: &str, err: &TaskError) -> UnitStatus {
    tracing::error!(command, error = %err, "Unit task did not complete");
    UnitStatus::Failed
}
