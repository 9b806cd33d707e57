//! Error types for nexus-import
//!
//! One crate-level error enum covers the whole import pipeline, from
//! configuration loading to per-file upload failures. Structural errors
//! (bad layout, unparsable filename, empty file) are permanent; transport
//! errors are transient and handled by the retry layer (see
//! [`crate::retry::IsRetryable`]).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nexus-import operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nexus-import
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "nexus.url")
        key: Option<String>,
    },

    /// Maven2 layout too shallow to carry group, artifact and version folders
    #[error("invalid maven2 layout: {path}")]
    MalformedLayout {
        /// The offending root-relative path
        path: String,
    },

    /// Filename does not match the `artifact-version[-classifier]` grammar
    #[error("unparsable artifact file name: {file_name}")]
    UnparsableFileName {
        /// The filename that failed to parse
        file_name: String,
    },

    /// Source file is not located under the configured import root
    #[error("source file {} is outside the import root {}", path.display(), root.display())]
    SourceOutsideRoot {
        /// The source file path
        path: PathBuf,
        /// The configured import root
        root: PathBuf,
    },

    /// Zero-length source file, rejected before any transport call
    #[error("source file is empty: {}", path.display())]
    EmptySource {
        /// The empty source file
        path: PathBuf,
    },

    /// Network-level transport failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upload target answered with a status other than 200/201
    #[error("unexpected response status {status} for {url}")]
    UnexpectedStatus {
        /// The HTTP status code received
        status: u16,
        /// The request URL
        url: String,
    },

    /// All retry attempts exhausted; wraps the last observed error
    #[error("operation failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// How many attempts were made
        attempts: u32,
        /// The error observed on the final attempt
        #[source]
        source: Box<Error>,
    },

    /// Operation abandoned because the batch was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Config`] with an optional offending key.
    pub fn config(message: impl Into<String>, key: Option<&str>) -> Self {
        Error::Config {
            message: message.into(),
            key: key.map(str::to_string),
        }
    }

    /// Last HTTP status carried by this error, looking through retry wrapping.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            Error::RetryExhausted { source, .. } => source.http_status(),
            _ => None,
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_surfaces_through_retry_wrapping() {
        let inner = Error::UnexpectedStatus {
            status: 503,
            url: "http://nexus.example.com/repository/releases/a".to_string(),
        };
        let wrapped = Error::RetryExhausted {
            attempts: 3,
            source: Box::new(inner),
        };
        assert_eq!(wrapped.http_status(), Some(503));
    }

    #[test]
    fn http_status_is_none_for_structural_errors() {
        let err = Error::EmptySource {
            path: PathBuf::from("/tmp/a.jar"),
        };
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn config_error_carries_the_offending_key() {
        let err = Error::config("batch_size out of range", Some("general.batch_size"));
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("general.batch_size")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
