//! HTTP transport with authentication and proxy support
//!
//! The [`Transport`] trait is the seam between the upload pipeline and the
//! network: implementations apply authentication, proxying, fixed headers and
//! timeouts transparently, so callers only ever see a status code or a
//! transport error.

use crate::config::{AuthConfig, ProxyConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// End-to-end timeout for each request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport capability used by the upload pipeline and the repository client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a PUT with a streaming body, returning the response status code.
    async fn put(&self, url: &str, body: reqwest::Body, content_length: u64) -> Result<u16>;

    /// Issue a bodyless HEAD, returning the response status code.
    async fn head(&self, url: &str) -> Result<u16>;
}

/// Authentication material applied to every outgoing request
#[derive(Clone, Debug)]
pub enum Credentials {
    /// HTTP basic auth
    Basic {
        /// Username
        user: String,
        /// Password
        pass: String,
    },
    /// Bearer token in the Authorization header
    Bearer {
        /// The token
        token: String,
    },
    /// Arbitrary static header
    Header {
        /// Header name
        name: String,
        /// Header value
        value: String,
    },
}

impl Credentials {
    /// Build credentials from the auth config section.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the fields required by the selected scheme are
    /// missing or the scheme is unknown.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        match auth.auth_type.as_str() {
            "basic" => {
                if auth.user_token.is_empty() || auth.pass_token.is_empty() {
                    return Err(Error::config(
                        "auth.type 'basic' requires both user_token and pass_token",
                        Some("auth"),
                    ));
                }
                Ok(Credentials::Basic {
                    user: auth.user_token.clone(),
                    pass: auth.pass_token.clone(),
                })
            }
            "bearer" => {
                if auth.access_token.is_empty() {
                    return Err(Error::config(
                        "auth.type 'bearer' requires access_token",
                        Some("auth"),
                    ));
                }
                Ok(Credentials::Bearer {
                    token: auth.access_token.clone(),
                })
            }
            "header" => {
                if auth.header_name.is_empty() || auth.header_value.is_empty() {
                    return Err(Error::config(
                        "auth.type 'header' requires both header_name and header_value",
                        Some("auth"),
                    ));
                }
                Ok(Credentials::Header {
                    name: auth.header_name.clone(),
                    value: auth.header_value.clone(),
                })
            }
            other => Err(Error::config(
                format!("unsupported auth.type: '{other}' (expected basic, bearer or header)"),
                Some("auth.type"),
            )),
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credentials::Basic { user, pass } => request.basic_auth(user, Some(pass)),
            Credentials::Bearer { token } => request.bearer_auth(token),
            Credentials::Header { name, value } => request.header(name.as_str(), value.as_str()),
        }
    }
}

/// reqwest-backed [`Transport`] with optional proxy support
pub struct HttpTransport {
    client: reqwest::Client,
    credentials: Credentials,
    force_replace: bool,
}

impl HttpTransport {
    /// Build the transport from the auth and proxy config sections.
    pub fn new(auth: &AuthConfig, proxy: &ProxyConfig, force_replace: bool) -> Result<Self> {
        let credentials = Credentials::from_config(auth)?;

        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT);

        if proxy.enabled {
            if proxy.host.is_empty() || proxy.port == 0 {
                return Err(Error::config(
                    "proxy is enabled but host or port is not set",
                    Some("proxy"),
                ));
            }
            let mut configured = reqwest::Proxy::all(format!("http://{}:{}", proxy.host, proxy.port))
                .map_err(|e| {
                    Error::config(format!("invalid proxy address: {e}"), Some("proxy"))
                })?;
            if !proxy.username.is_empty() && !proxy.password.is_empty() {
                configured = configured.basic_auth(&proxy.username, &proxy.password);
            }
            builder = builder.proxy(configured);
        }

        let client = builder.build()?;
        Ok(Self {
            client,
            credentials,
            force_replace,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn put(&self, url: &str, body: reqwest::Body, content_length: u64) -> Result<u16> {
        let request = self.credentials.apply(
            self.client
                .put(url)
                .header("X-Content-Force-Replace", self.force_replace.to_string())
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .header(reqwest::header::CONTENT_LENGTH, content_length)
                .body(body),
        );
        let response = request.send().await?;
        Ok(response.status().as_u16())
    }

    async fn head(&self, url: &str) -> Result<u16> {
        let response = self.credentials.apply(self.client.head(url)).send().await?;
        Ok(response.status().as_u16())
    }
}
