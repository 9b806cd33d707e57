//! Per-file upload pipeline
//!
//! For one file: resolve the target URL, open the source, stream an HTTP PUT
//! through the injected transport, validate the response. Target resolution
//! happens once per task and is never retried; a file that doesn't fit the
//! repository layout will not start fitting on a second attempt. The
//! open→transmit→validate sequence, by contrast, is re-executed on every
//! retry so the read cursor is never stale.

use crate::config::RetryConfig;
use crate::coordinate::MavenCoordinate;
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::retry::retry_with_backoff;
use crate::transport::Transport;
use crate::types::{RepositoryType, UploadTask};
use crate::walker::root_relative_segments;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

/// Uploads single files to their repository-specific target URL
pub struct UploadPipeline {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    base_url: String,
    repository: String,
    root_path: PathBuf,
    retry: RetryConfig,
}

impl UploadPipeline {
    /// Create a pipeline targeting one repository.
    pub fn new(
        transport: Arc<dyn Transport>,
        observer: Arc<dyn Observer>,
        base_url: &str,
        repository: &str,
        root_path: impl Into<PathBuf>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            observer,
            base_url: normalize_base_url(base_url),
            repository: repository.to_string(),
            root_path: root_path.into(),
            retry,
        }
    }

    /// Full target URL for a task.
    ///
    /// Maven2 tasks resolve their coordinate and use its canonical repository
    /// path; raw tasks use the verbatim root-relative path. Failures here are
    /// structural and never retried.
    pub fn target_url(&self, task: &UploadTask) -> Result<String> {
        let path = match task.repository_type {
            RepositoryType::Maven2 => {
                MavenCoordinate::for_file(&self.root_path, &task.source_path)?.repository_path()
            }
            RepositoryType::Raw => {
                root_relative_segments(&self.root_path, &task.source_path)?.join("/")
            }
        };
        Ok(format!(
            "{}/repository/{}/{}",
            self.base_url, self.repository, path
        ))
    }

    /// Upload one file, retrying transient failures per the retry config.
    ///
    /// Returns the successful HTTP status code (200 or 201). On exhaustion
    /// the final error is returned, never swallowed.
    pub async fn upload(&self, task: &UploadTask, cancel: &CancellationToken) -> Result<u16> {
        let url = self.target_url(task)?;
        self.observer.debug(&format!(
            "uploading {} -> {url}",
            task.source_path.display()
        ));

        retry_with_backoff(&self.retry, self.observer.as_ref(), cancel, || {
            self.attempt(&task.source_path, &url)
        })
        .await
    }

    /// One open → transmit → validate attempt.
    async fn attempt(&self, path: &Path, url: &str) -> Result<u16> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        if length == 0 {
            // Invalid input, not a transport fault: rejected before any
            // request leaves the process.
            return Err(Error::EmptySource {
                path: path.to_path_buf(),
            });
        }

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let status = self.transport.put(url, body, length).await?;
        if matches!(status, 200 | 201) {
            Ok(status)
        } else {
            Err(Error::UnexpectedStatus {
                status,
                url: url.to_string(),
            })
        }
    }
}

/// Strip any trailing slash so URL assembly controls its own separators.
pub(crate) fn normalize_base_url(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
