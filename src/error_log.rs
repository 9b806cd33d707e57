//! Durable append-only log of structured import failures
//!
//! Independent of the in-memory aggregation in the batch executor: records
//! survive the process for offline inspection. One self-contained JSON object
//! per line, so any prefix of the log is recoverable even after a crash
//! between records.

use crate::coordinate::MavenCoordinate;
use crate::error::Result;
use crate::types::RepositoryType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// One structured import failure
///
/// Maven2 records carry the coordinate fields when the coordinate could still
/// be resolved; raw records leave them out entirely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    /// Source file that failed to import
    pub file_path: String,
    /// Repository convention the file was destined for
    pub repository_type: RepositoryType,
    /// Human-readable failure message
    #[serde(rename = "error")]
    pub message: String,
    /// Group id, when resolvable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Artifact id, when resolvable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    /// Version, when resolvable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Classifier, when resolvable and present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ImportError {
    /// Record for a raw-repository failure.
    pub fn raw(file_path: &Path, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.display().to_string(),
            repository_type: RepositoryType::Raw,
            message: message.into(),
            group_id: None,
            artifact_id: None,
            version: None,
            classifier: None,
        }
    }

    /// Record for a maven2 failure, with coordinate fields when available.
    pub fn maven2(
        file_path: &Path,
        message: impl Into<String>,
        coordinate: Option<&MavenCoordinate>,
    ) -> Self {
        Self {
            file_path: file_path.display().to_string(),
            repository_type: RepositoryType::Maven2,
            message: message.into(),
            group_id: coordinate.map(|c| c.group_id.clone()),
            artifact_id: coordinate.map(|c| c.artifact_id.clone()),
            version: coordinate.map(|c| c.version.clone()),
            classifier: coordinate.and_then(|c| c.classifier.clone()),
        }
    }
}

/// Append-only JSON-lines failure log
///
/// Safe under concurrent appenders: the file is opened, written and closed
/// inside a single mutual-exclusion region, and each append is one complete
/// line.
pub struct ErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ErrorLog {
    /// Create a log writing to `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the underlying log artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a self-contained JSON line.
    pub async fn append(&self, record: &ImportError) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every record in append order.
    ///
    /// Decoding stops cleanly at end of file; a malformed record aborts the
    /// read with a serialization error.
    pub async fn read_all(&self) -> Result<Vec<ImportError>> {
        let _guard = self.lock.lock().await;

        let file = tokio::fs::File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}
