//! # nexus-import
//!
//! Batch importer that uploads local artifact trees into Nexus `raw` and
//! `maven2` repositories over HTTP.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - The binary is a thin wrapper; every piece is usable
//!   as a plain Rust API
//! - **Bounded by construction** - Concurrency and retries are explicit,
//!   testable parameters, not incidental channel capacities
//! - **Partial-failure tolerant** - One bad file never stops the batch; every
//!   failure is aggregated in memory and persisted to a durable error log
//! - **Injected collaborators** - Transport and diagnostics are trait
//!   objects, so unit tests run without a server or global logger state
//!
//! ## Quick Start
//!
//! ```no_run
//! use nexus_import::{
//!     BatchExecutor, HttpTransport, RepositoryType, TracingObserver, UploadPipeline, UploadTask,
//! };
//! use nexus_import::config::{AuthConfig, ProxyConfig, RetryConfig};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthConfig {
//!         auth_type: "basic".to_string(),
//!         user_token: "importer".to_string(),
//!         pass_token: "secret".to_string(),
//!         ..AuthConfig::default()
//!     };
//!     let transport = Arc::new(HttpTransport::new(&auth, &ProxyConfig::default(), false)?);
//!     let observer = Arc::new(TracingObserver);
//!
//!     let pipeline = Arc::new(UploadPipeline::new(
//!         transport,
//!         observer.clone(),
//!         "https://nexus.example.com",
//!         "releases",
//!         "/data/artifacts",
//!         RetryConfig::default(),
//!     ));
//!     let executor = BatchExecutor::new(pipeline, 4, observer);
//!
//!     let tasks = vec![UploadTask::new(
//!         "/data/artifacts/com/example/widget/1.0.0/widget-1.0.0.jar",
//!         RepositoryType::Maven2,
//!     )];
//!     let summary = executor.run(tasks, &CancellationToken::new()).await;
//!     println!("{}/{} uploaded", summary.succeeded, summary.total);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Bounded-concurrency batch execution
pub mod batch;
/// Nexus registry API client
pub mod client;
/// Configuration types
pub mod config;
/// Maven2 coordinate resolution
pub mod coordinate;
/// Error types
pub mod error;
/// Durable log of import failures
pub mod error_log;
/// Diagnostic observer collaborators
pub mod observer;
/// Retry middleware with exponential backoff
pub mod retry;
/// HTTP transport with authentication and proxy support
pub mod transport;
/// Core task and summary types
pub mod types;
/// Per-file upload pipeline
pub mod upload;
/// Source tree discovery
pub mod walker;

// Re-export commonly used types
pub use batch::BatchExecutor;
pub use client::RepositoryClient;
pub use config::Config;
pub use coordinate::MavenCoordinate;
pub use error::{Error, Result};
pub use error_log::{ErrorLog, ImportError};
pub use observer::{NoopObserver, Observer, TracingObserver};
pub use retry::{IsRetryable, retry_with_backoff};
pub use transport::{Credentials, HttpTransport, Transport};
pub use types::{BatchSummary, RepositoryType, TaskFailure, UploadOutcome, UploadTask};
pub use upload::UploadPipeline;
pub use walker::discover_files;
