//! Error types for docstore-client
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Pages and document wrappers cannot hold an [`Error`] (it wraps
//! non-clonable reqwest errors), so they carry a [`DataSourceError`]
//! descriptor instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for docstore-client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Request Validation Errors
    // ============================================================================
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL must be absolute: {url}")]
    RelativeUrl { url: String },

    #[error("Unsupported HTTP method: '{method}'")]
    UnsupportedMethod { method: String },

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Connection failed: {message}")]
    Connect { message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Transport closed before completing the request")]
    TransportClosed,

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Malformed continuation token: {message}")]
    MalformedContinuation { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Page failed: {0}")]
    Page(DataSourceError),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a malformed continuation error
    pub fn malformed_continuation(message: impl Into<String>) -> Self {
        Self::MalformedContinuation {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create an unsupported method error
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_)
            | Error::Timeout { .. }
            | Error::Connect { .. }
            | Error::TransportClosed => ErrorKind::Transport,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Decode { .. } | Error::MalformedContinuation { .. } | Error::JsonParse(_) => {
                ErrorKind::Decode
            }
            Error::Page(inner) => inner.kind,
            Error::InvalidUrl(_)
            | Error::RelativeUrl { .. }
            | Error::UnsupportedMethod { .. }
            | Error::InvalidHeader { .. } => ErrorKind::Request,
            Error::Config { .. } | Error::YamlParse(_) | Error::Io(_) | Error::Other(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only transport-kind failures qualify. HTTP statuses never reach this
    /// type from the transport, so a 5xx is never retried here.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Timeout { .. } | Error::Connect { .. } => true,
            _ => false,
        }
    }
}

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connectivity, timeout, TLS, malformed wire response
    Transport,
    /// The exchange was cancelled by the caller
    Cancelled,
    /// The request could not be built (bad URL, verb, header)
    Request,
    /// The response envelope or continuation token could not be decoded
    Decode,
    /// The server answered with a non-success status
    Status,
    /// A single document failed to decode
    Document,
    /// Anything else
    Other,
}

/// Clonable error descriptor carried by pages and document wrappers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct DataSourceError {
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// HTTP status, when the server answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl DataSourceError {
    /// Create a new descriptor
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Create a descriptor for a non-success HTTP status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Status,
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a per-document descriptor
    pub fn document(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Document, message)
    }
}

impl From<&Error> for DataSourceError {
    fn from(err: &Error) -> Self {
        if let Error::Page(inner) = err {
            return inner.clone();
        }
        let status = match err {
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status,
        }
    }
}

impl From<Error> for DataSourceError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for docstore-client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
