//! Nexus registry API client
//!
//! Thin wrapper over the transport for the repository existence pre-check.
//! Upload traffic goes through [`crate::upload::UploadPipeline`]; this client
//! only talks to the management API.

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::upload::normalize_base_url;
use std::sync::Arc;

/// Client for the Nexus repositories API
pub struct RepositoryClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl RepositoryClient {
    /// Create a client for the given Nexus base URL.
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Check whether a repository exists.
    ///
    /// Issues `HEAD {base}/service/rest/v1/repositories/{repo}`: 200 means it
    /// exists, 404 means it doesn't, anything else is an error.
    pub async fn repository_exists(&self, repository: &str) -> Result<bool> {
        if repository.is_empty() {
            return Err(Error::config(
                "repository name cannot be empty",
                Some("nexus.repository"),
            ));
        }

        let url = format!(
            "{}/service/rest/v1/repositories/{repository}",
            self.base_url
        );
        match self.transport.head(&url).await? {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(Error::UnexpectedStatus { status, url }),
        }
    }
}
