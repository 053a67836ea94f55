//! Result types returned by a conversion run.

use crate::pipeline::freshness::artifact_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Aggregate result of one [`crate::convert::run_conversion`] call.
///
/// Success is tracked per batch, not per file: md-to-pdf reports one exit
/// status for all files it was given. Use [`ConversionOutcome::artifacts_for`]
/// to see which PDFs actually exist afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// `true` iff every batch exited with status 0 (also `true` when nothing
    /// needed converting).
    pub overall_success: bool,
    /// Standard output of every batch, concatenated in batch order.
    pub combined_stdout: String,
    /// Standard error of every batch, concatenated in batch order. Also holds
    /// launch-failure messages.
    pub combined_stderr: String,
    /// Files handed to the converter (attempted, not confirmed).
    pub processed_count: usize,
    /// Files whose PDF was already newer than the source.
    pub skipped_count: usize,
}

/// The three cases a front-end reports differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every file was already up to date.
    NothingToDo,
    /// At least one batch failed; show the captured error text.
    Failed,
    /// Every batch succeeded.
    Succeeded,
}

impl ConversionOutcome {
    /// Outcome of a run where every requested file was fresh.
    pub fn nothing_to_do(skipped_count: usize) -> Self {
        Self {
            overall_success: true,
            skipped_count,
            ..Self::default()
        }
    }

    /// Number of classified input files.
    pub fn total(&self) -> usize {
        self.processed_count + self.skipped_count
    }

    pub fn status(&self) -> RunStatus {
        if self.processed_count == 0 && self.overall_success {
            RunStatus::NothingToDo
        } else if self.overall_success {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        }
    }

    /// `(source, artifact)` pairs for every source whose PDF exists on disk,
    /// in input order. This is the per-file check the batch exit code cannot
    /// provide.
    pub fn artifacts_for<P: AsRef<Path>>(&self, sources: &[P]) -> Vec<(PathBuf, PathBuf)> {
        sources
            .iter()
            .map(|s| {
                let src = s.as_ref().to_path_buf();
                let pdf = artifact_path(&src);
                (src, pdf)
            })
            .filter(|(_, pdf)| pdf.is_file())
            .collect()
    }
}

/// Dry-run result of [`crate::convert::plan_conversion`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionPlan {
    /// Sources that would be handed to the converter, in input order.
    pub to_process: Vec<PathBuf>,
    /// Sources whose artifact is already newer.
    pub skipped: Vec<PathBuf>,
    /// `to_process` split into converter invocations.
    pub batches: Vec<Vec<PathBuf>>,
}
