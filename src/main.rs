//! nexus-import binary: load the configuration, wire the pipeline, run the
//! batch, persist failures.

use clap::Parser;
use nexus_import::config::Config;
use nexus_import::coordinate::MavenCoordinate;
use nexus_import::error::{Error, Result};
use nexus_import::error_log::{ErrorLog, ImportError};
use nexus_import::observer::{Observer, TracingObserver};
use nexus_import::transport::{HttpTransport, Transport};
use nexus_import::types::{RepositoryType, TaskFailure, UploadTask};
use nexus_import::{BatchExecutor, RepositoryClient, UploadPipeline, discover_files};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "nexus-import")]
#[command(about = "Batch-import local artifact trees into a Nexus repository")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "nexus-import.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("nexus-import: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    init_tracing(&config.general.log_level);

    tracing::info!(
        config = %cli.config.display(),
        repository = %config.nexus.repository,
        repository_type = %config.nexus.repository_type,
        "starting import"
    );

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        &config.auth,
        &config.proxy,
        config.nexus.force_replace,
    )?);
    let observer: Arc<dyn Observer> = Arc::new(TracingObserver);

    let client = RepositoryClient::new(Arc::clone(&transport), &config.nexus.url);
    if !client.repository_exists(&config.nexus.repository).await? {
        return Err(Error::config(
            format!(
                "repository '{}' does not exist on {}",
                config.nexus.repository, config.nexus.url
            ),
            Some("nexus.repository"),
        ));
    }

    let files = discover_files(&config.general.root_path)?;
    tracing::info!(
        files = files.len(),
        root = %config.general.root_path.display(),
        "discovered source files"
    );
    let tasks: Vec<UploadTask> = files
        .into_iter()
        .map(|path| UploadTask::new(path, config.nexus.repository_type))
        .collect();

    let pipeline = Arc::new(UploadPipeline::new(
        transport,
        Arc::clone(&observer),
        &config.nexus.url,
        &config.nexus.repository,
        config.general.root_path.clone(),
        config.retry.clone(),
    ));
    let executor = BatchExecutor::new(pipeline, config.general.batch_size, observer);

    // Ctrl-C abandons not-yet-started tasks; in-flight uploads finish or
    // time out on their own.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling remaining uploads");
            interrupt.cancel();
        }
    });

    let summary = executor.run(tasks, &cancel).await;

    let error_log = ErrorLog::new(config.general.error_log_path.clone());
    for failure in summary.failures.values() {
        tracing::error!(
            file = %failure.task.source_path.display(),
            error = %failure.error,
            "upload failed"
        );
        let record = failure_record(&config.general.root_path, failure);
        if let Err(error) = error_log.append(&record).await {
            tracing::error!(error = %error, "failed to persist import error");
        }
    }

    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        elapsed = ?summary.elapsed,
        "import finished"
    );
    if summary.failed > 0 {
        tracing::warn!(
            log = %error_log.path().display(),
            "some uploads failed; see the error log for details"
        );
    }

    // Per-task failures are reported, not fatal: only startup and traversal
    // errors exit nonzero.
    Ok(())
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("nexus_import={log_level}"))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the durable record for one failed task, recovering the Maven
/// coordinate when the layout still allows it.
fn failure_record(root: &Path, failure: &TaskFailure) -> ImportError {
    let message = failure.error.to_string();
    match failure.task.repository_type {
        RepositoryType::Raw => ImportError::raw(&failure.task.source_path, message),
        RepositoryType::Maven2 => {
            let coordinate = MavenCoordinate::for_file(root, &failure.task.source_path).ok();
            ImportError::maven2(&failure.task.source_path, message, coordinate.as_ref())
        }
    }
}
