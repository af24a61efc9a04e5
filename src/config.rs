//! Client configuration
//!
//! Loaded from YAML or JSON. Every section except `endpoint` has defaults
//! matching a CosmosDB-style document store.

use crate::decode::{EnvelopeConfig, DEFAULT_CONTINUATION_HEADER};
use crate::error::{Error, Result};
use crate::pagination::DEFAULT_PAGE_SIZE_HEADER;
use crate::transport::{HttpTransportConfig, RateLimiterConfig, RetryPolicy};
use crate::types::{Headers, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default request header carrying the partition key
pub const DEFAULT_PARTITION_KEY_HEADER: &str = "x-ms-documentdb-partitionkey";

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the collection (e.g., "https://acct.documents.azure.com/dbs/app/colls/items")
    pub endpoint: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Response envelope layout
    #[serde(default)]
    pub envelope: EnvelopeConfig,
}

impl ClientConfig {
    /// Create a config with defaults for everything but the endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: HttpConfig::default(),
            pagination: PaginationConfig::default(),
            envelope: EnvelopeConfig::default(),
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::config("endpoint must not be empty"));
        }
        crate::transport::parse_absolute_url(&self.endpoint)?;

        if self.http.timeout_ms == 0 {
            return Err(Error::config("http.timeout_ms must be greater than zero"));
        }
        if self.pagination.page_size == Some(0) {
            return Err(Error::config("pagination.page_size must be greater than zero"));
        }
        if self.pagination.max_pages == Some(0) {
            return Err(Error::config("pagination.max_pages must be greater than zero"));
        }
        if self.pagination.continuation_header.trim().is_empty() {
            return Err(Error::config(
                "pagination.continuation_header must not be empty",
            ));
        }
        if self.envelope.continuation_header.is_none() && self.envelope.continuation_path.is_none()
        {
            return Err(Error::config(
                "envelope needs a continuation_header or a continuation_path",
            ));
        }
        Ok(())
    }

    /// Transport settings derived from the `http` section
    pub fn transport_config(&self) -> HttpTransportConfig {
        let mut builder = HttpTransportConfig::builder()
            .timeout(Duration::from_millis(self.http.timeout_ms));
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(limit) = &self.http.rate_limit {
            builder = builder.rate_limit(limit.clone());
        }
        let mut config = builder.build();
        config.default_headers = self.http.headers();
        config
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub default_headers: StringMap,

    /// Rate limiting
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Retry of transport-kind failures; disabled when absent
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: None,
            default_headers: StringMap::new(),
            rate_limit: None,
            retry: None,
        }
    }
}

impl HttpConfig {
    /// Set a default header, replacing any entry whose name differs only in case
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.default_headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.insert(name, value.into());
    }

    /// Default headers as a case-insensitive map, sorted by name
    pub fn headers(&self) -> Headers {
        let mut entries: Vec<_> = self.default_headers.iter().collect();
        entries.sort();
        entries.into_iter().collect()
    }
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Pagination settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Request header carrying the continuation token
    pub continuation_header: String,
    /// Request header carrying the page size
    pub page_size_header: String,
    /// Request header carrying the partition key
    pub partition_key_header: String,
    /// Documents per page to ask for
    pub page_size: Option<u32>,
    /// Upper bound on pages fetched by one cursor
    pub max_pages: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            continuation_header: DEFAULT_CONTINUATION_HEADER.to_string(),
            page_size_header: DEFAULT_PAGE_SIZE_HEADER.to_string(),
            partition_key_header: DEFAULT_PARTITION_KEY_HEADER.to_string(),
            page_size: None,
            max_pages: None,
        }
    }
}
