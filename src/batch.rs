//! Bounded-concurrency batch execution
//!
//! Fans the upload pipeline out over a collection of tasks. A semaphore is
//! the admission gate: dispatch acquires an owned permit (in input order)
//! before spawning each worker, so the number of in-flight uploads never
//! exceeds the configured degree. Completion order is unconstrained; the
//! summary never depends on it.

use crate::error::Error;
use crate::observer::Observer;
use crate::types::{BatchSummary, UploadOutcome, UploadTask};
use crate::upload::UploadPipeline;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs an upload pipeline over many tasks with bounded concurrency
pub struct BatchExecutor {
    pipeline: Arc<UploadPipeline>,
    concurrency: usize,
    observer: Arc<dyn Observer>,
}

impl BatchExecutor {
    /// Create an executor with the given concurrency degree.
    ///
    /// A degenerate degree of zero falls open to serial execution rather than
    /// erroring, matching the fail-open policy of the retry layer.
    pub fn new(
        pipeline: Arc<UploadPipeline>,
        concurrency: usize,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
            observer,
        }
    }

    /// Upload every task, collecting exactly one outcome per task.
    ///
    /// Per-task failures never abort sibling tasks; they are aggregated into
    /// the summary's failure map, keyed by dispatch index. All workers are
    /// joined before the summary is produced: no partial summaries, no
    /// abandoned tasks.
    ///
    /// Cancellation is honored at dispatch boundaries: tasks not yet started
    /// fail fast with [`Error::Cancelled`], in-flight uploads finish or time
    /// out naturally.
    pub async fn run(&self, tasks: Vec<UploadTask>, cancel: &CancellationToken) -> BatchSummary {
        let started = Instant::now();
        let total = tasks.len();
        self.observer.debug(&format!(
            "starting batch of {total} uploads with concurrency {}",
            self.concurrency
        ));

        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut workers: Vec<(usize, UploadTask, JoinHandle<UploadOutcome>)> = Vec::new();
        let mut outcomes: BTreeMap<usize, UploadOutcome> = BTreeMap::new();

        for (index, task) in tasks.into_iter().enumerate() {
            if cancel.is_cancelled() {
                outcomes.insert(index, UploadOutcome::failed(task, Error::Cancelled));
                continue;
            }

            let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                // The gate is never closed while the executor owns it; treat
                // a closed gate like cancellation rather than losing the task.
                outcomes.insert(index, UploadOutcome::failed(task, Error::Cancelled));
                continue;
            };

            let pipeline = Arc::clone(&self.pipeline);
            let cancel = cancel.clone();
            let worker_task = task.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                match pipeline.upload(&worker_task, &cancel).await {
                    Ok(status) => UploadOutcome::succeeded(worker_task, status),
                    Err(error) => UploadOutcome::failed(worker_task, error),
                }
            });
            workers.push((index, task, handle));
        }

        // Join barrier: every outcome is observed before the summary exists.
        for (index, task, handle) in workers {
            match handle.await {
                Ok(outcome) => {
                    outcomes.insert(index, outcome);
                }
                Err(join_error) => {
                    self.observer.error(&format!(
                        "upload worker for {} failed: {join_error}",
                        task.source_path.display()
                    ));
                    outcomes.insert(
                        index,
                        UploadOutcome::failed(
                            task,
                            Error::Other(format!("upload worker panicked: {join_error}")),
                        ),
                    );
                }
            }
        }

        let summary = BatchSummary::from_outcomes(outcomes, started.elapsed());
        self.observer.info(&format!(
            "batch finished: {}/{} succeeded, {} failed in {:?}",
            summary.succeeded, summary.total, summary.failed, summary.elapsed
        ));
        summary
    }
}
