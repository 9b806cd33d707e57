//! Core types for nexus-import

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Upload-target convention of a repository
///
/// `Raw` maps a file to its verbatim root-relative path; `Maven2` derives the
/// target path from the file's Maven coordinate. The type is chosen upstream
/// (configuration) and never inferred from file content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Verbatim relative-path upload
    Raw,
    /// GAV-derived path upload
    Maven2,
}

impl RepositoryType {
    /// Wire name of this repository type ("raw" or "maven2").
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::Raw => "raw",
            RepositoryType::Maven2 => "maven2",
        }
    }
}

impl std::fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file queued for upload
///
/// Created per discovered file and consumed once by the batch executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTask {
    /// Absolute path of the source file
    pub source_path: PathBuf,
    /// Target repository convention
    pub repository_type: RepositoryType,
}

impl UploadTask {
    /// Create a task for a discovered file.
    pub fn new(source_path: impl Into<PathBuf>, repository_type: RepositoryType) -> Self {
        Self {
            source_path: source_path.into(),
            repository_type,
        }
    }
}

/// Final state of one upload task, never mutated after creation
#[derive(Debug)]
pub struct UploadOutcome {
    /// The task this outcome belongs to
    pub task: UploadTask,
    /// Whether the upload completed successfully
    pub success: bool,
    /// Last HTTP status observed, if a request was attempted
    pub http_status: Option<u16>,
    /// The failure, when the upload did not succeed
    pub error: Option<Error>,
}

impl UploadOutcome {
    /// Outcome for a completed upload.
    pub fn succeeded(task: UploadTask, http_status: u16) -> Self {
        Self {
            task,
            success: true,
            http_status: Some(http_status),
            error: None,
        }
    }

    /// Outcome for a failed upload.
    pub fn failed(task: UploadTask, error: Error) -> Self {
        let http_status = error.http_status();
        Self {
            task,
            success: false,
            http_status,
            error: Some(error),
        }
    }
}

/// One failed task inside a [`BatchSummary`]
#[derive(Debug)]
pub struct TaskFailure {
    /// The failed task
    pub task: UploadTask,
    /// Why it failed
    pub error: Error,
}

/// Aggregated result of one batch run
///
/// Failures are keyed by the task's dispatch index, never by task value, so
/// two tasks with identical paths can never collapse into one entry.
#[derive(Debug)]
pub struct BatchSummary {
    /// Number of tasks dispatched
    pub total: usize,
    /// Number of successful uploads
    pub succeeded: usize,
    /// Number of failed uploads
    pub failed: usize,
    /// Wall-clock duration of the batch
    pub elapsed: Duration,
    /// Failed tasks by dispatch index
    pub failures: BTreeMap<usize, TaskFailure>,
}

impl BatchSummary {
    /// Fold per-task outcomes into a summary.
    ///
    /// Holds the invariant `succeeded + failed == total`: every non-success
    /// lands in the failure map.
    pub fn from_outcomes(outcomes: BTreeMap<usize, UploadOutcome>, elapsed: Duration) -> Self {
        let total = outcomes.len();
        let mut succeeded = 0;
        let mut failures = BTreeMap::new();

        for (index, outcome) in outcomes {
            if outcome.success {
                succeeded += 1;
            } else {
                let error = outcome
                    .error
                    .unwrap_or_else(|| Error::Other("upload failed with no recorded error".into()));
                failures.insert(
                    index,
                    TaskFailure {
                        task: outcome.task,
                        error,
                    },
                );
            }
        }

        let failed = failures.len();
        Self {
            total,
            succeeded,
            failed,
            elapsed,
            failures,
        }
    }
}
