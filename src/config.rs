//! Configuration types for nexus-import
//!
//! Loaded from a TOML file, with serde-supplied defaults for every optional
//! field. Validation happens eagerly in [`Config::load`] so the pipeline only
//! ever sees a coherent configuration.

use crate::error::{Error, Result};
use crate::types::RepositoryType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest accepted concurrency degree for a batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Top-level application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Import root, logging and batch settings
    pub general: GeneralConfig,
    /// Target Nexus instance and repository
    pub nexus: NexusConfig,
    /// Retry behavior for transient upload failures
    #[serde(default)]
    pub retry: RetryConfig,
    /// Authentication applied to every outgoing request
    pub auth: AuthConfig,
    /// Optional HTTP proxy
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Import root, logging and batch settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory whose files are imported (required)
    pub root_path: PathBuf,

    /// Where the durable JSON-lines failure log is written
    #[serde(default = "default_error_log_path")]
    pub error_log_path: PathBuf,

    /// Log level for the tracing subscriber (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum concurrent uploads (default: 1)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Target Nexus instance and repository
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NexusConfig {
    /// Base URL of the Nexus instance, e.g. `https://nexus.example.com`
    pub url: String,

    /// Name of the target repository
    pub repository: String,

    /// Upload-target convention of the repository (default: raw)
    #[serde(default = "default_repository_type")]
    pub repository_type: RepositoryType,

    /// Ask the server to replace existing components (default: false)
    #[serde(default)]
    pub force_replace: bool,
}

/// Retry configuration for transient upload failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts per upload, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled after each further failure
    /// (seconds; default: 2)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
        }
    }
}

/// Authentication configuration
///
/// Exactly one scheme is active, selected by `type`; the fields required by
/// that scheme must be present (checked by
/// [`crate::transport::Credentials::from_config`]).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Authentication scheme: "basic", "bearer" or "header"
    #[serde(rename = "type")]
    pub auth_type: String,

    /// Username for basic auth
    #[serde(default)]
    pub user_token: String,

    /// Password for basic auth
    #[serde(default)]
    pub pass_token: String,

    /// Token for bearer auth
    #[serde(default)]
    pub access_token: String,

    /// Header name for header auth
    #[serde(default)]
    pub header_name: String,

    /// Header value for header auth
    #[serde(default)]
    pub header_value: String,
}

/// Optional HTTP proxy configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Route requests through the proxy
    #[serde(default)]
    pub enabled: bool,

    /// Proxy host, required when enabled
    #[serde(default)]
    pub host: String,

    /// Proxy port, required when enabled
    #[serde(default)]
    pub port: u16,

    /// Proxy username (optional)
    #[serde(default)]
    pub username: String,

    /// Proxy password (optional)
    #[serde(default)]
    pub password: String,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("cannot read configuration file {}: {e}", path.display()),
                None,
            )
        })?;
        let config: Config = toml::from_str(&contents).map_err(|e| {
            Error::config(
                format!("cannot parse configuration file {}: {e}", path.display()),
                None,
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field coherence beyond what serde enforces.
    pub fn validate(&self) -> Result<()> {
        if self.general.root_path.as_os_str().is_empty() {
            return Err(Error::config(
                "general.root_path must not be empty",
                Some("general.root_path"),
            ));
        }
        if self.general.batch_size == 0 || self.general.batch_size > MAX_BATCH_SIZE {
            return Err(Error::config(
                format!("general.batch_size must be between 1 and {MAX_BATCH_SIZE}"),
                Some("general.batch_size"),
            ));
        }
        if self.nexus.repository.is_empty() {
            return Err(Error::config(
                "nexus.repository must not be empty",
                Some("nexus.repository"),
            ));
        }
        url::Url::parse(&self.nexus.url).map_err(|e| {
            Error::config(
                format!("nexus.url is not a valid URL: {e}"),
                Some("nexus.url"),
            )
        })?;
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts must be at least 1",
                Some("retry.max_attempts"),
            ));
        }
        if self.proxy.enabled {
            if self.proxy.host.is_empty() {
                return Err(Error::config(
                    "proxy.host is required when the proxy is enabled",
                    Some("proxy.host"),
                ));
            }
            if self.proxy.port == 0 {
                return Err(Error::config(
                    "proxy.port is required when the proxy is enabled",
                    Some("proxy.port"),
                ));
            }
        }
        // Surfaces missing per-scheme auth fields early.
        crate::transport::Credentials::from_config(&self.auth)?;
        Ok(())
    }
}

fn default_error_log_path() -> PathBuf {
    PathBuf::from("nexus-import-errors.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_batch_size() -> usize {
    1
}

fn default_repository_type() -> RepositoryType {
    RepositoryType::Raw
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

// Duration fields are written as plain seconds in the TOML file.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
