//! reqwest-backed transport
//!
//! Provides the production [`Transport`]:
//! - Connection pooling shared by every clone
//! - Default headers and user agent
//! - Optional rate limiting
//! - Error classification into transport-kind failures
//!
//! Status codes are passed through untouched and nothing is retried here;
//! see [`RetryTransport`](super::RetryTransport) for an opt-in retry layer.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::types::{Transport, TransportRequest, TransportResponse, TransportResult};
use crate::error::{Error, Result};
use crate::types::Headers;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: Headers,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            rate_limit: None,
            default_headers: Headers::new(),
            user_agent: format!("docstore-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new config builder
    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::default()
    }
}

/// Builder for HTTP transport config
#[derive(Default)]
pub struct HttpTransportConfigBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key, value);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpTransportConfig {
        self.config
    }
}

/// HTTP transport over reqwest
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the transport configuration
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    async fn execute(&self, request: TransportRequest) -> TransportResult {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let method = request.method();
        let timeout = request.timeout_override().unwrap_or(self.config.timeout);
        let mut req = self
            .client
            .request(method.into(), request.url().clone())
            .timeout(timeout);

        // Request headers win over defaults
        let mut headers = self.config.default_headers.clone();
        headers.extend_from(request.header_map());
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }

        if let Some(body) = request.body_bytes() {
            req = req.body(body.clone());
        }

        debug!("Sending {} {}", method, request.url());

        let response = req
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status().as_u16();
        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            match value.to_str() {
                // Repeated names are folded into one comma-separated value
                Ok(v) => response_headers.append(name.as_str(), v),
                Err(_) => warn!("Dropping non-ASCII response header '{}'", name),
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        debug!(
            "Completed {} {} with status {} ({} bytes)",
            method,
            request.url(),
            status,
            body.len()
        );

        Ok(TransportResponse::new(status, response_headers, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> TransportResult {
        self.execute(request).await
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Map a reqwest failure onto the transport error taxonomy
fn classify_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        warn!("Request timed out after {:?}", timeout);
        #[allow(clippy::cast_possible_truncation)]
        return Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        };
    }
    if error.is_connect() {
        warn!("Connection failed: {}", error);
        return Error::connect(error.to_string());
    }
    Error::Http(error)
}
