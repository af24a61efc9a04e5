//! Decoder types and traits
//!
//! Defines the envelope layout and the page decoder abstraction.

use crate::pagination::Page;
use crate::transport::TransportResponse;
use serde::{Deserialize, Serialize};

/// Default response header carrying the continuation token
pub const DEFAULT_CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Where things live in a page response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Path to the documents array (e.g., "Documents" or "$.data.items")
    pub documents_path: String,
    /// Response header carrying the continuation token
    pub continuation_header: Option<String>,
    /// Body path carrying the continuation token; checked before the header
    pub continuation_path: Option<String>,
    /// Field holding the user document; `None` decodes the whole object
    pub value_field: Option<String>,
    /// Field holding the document id
    pub id_field: String,
    /// Field holding the partition key
    pub partition_field: String,
    /// Field holding the entity tag
    pub etag_field: String,
    /// Field holding the last-modified time in epoch seconds
    pub timestamp_field: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            documents_path: "Documents".to_string(),
            continuation_header: Some(DEFAULT_CONTINUATION_HEADER.to_string()),
            continuation_path: None,
            value_field: Some("document".to_string()),
            id_field: "id".to_string(),
            partition_field: "PartitionKey".to_string(),
            etag_field: "_etag".to_string(),
            timestamp_field: "_ts".to_string(),
        }
    }
}

impl EnvelopeConfig {
    /// Envelope where each document is the user value itself
    pub fn plain(documents_path: impl Into<String>) -> Self {
        Self {
            documents_path: documents_path.into(),
            value_field: None,
            ..Default::default()
        }
    }

    /// Read the continuation token from a body path instead of a header
    #[must_use]
    pub fn with_continuation_path(mut self, path: impl Into<String>) -> Self {
        self.continuation_path = Some(path.into());
        self
    }

    /// Read the continuation token from a different header
    #[must_use]
    pub fn with_continuation_header(mut self, header: impl Into<String>) -> Self {
        self.continuation_header = Some(header.into());
        self
    }

    /// Set the field holding the user document
    #[must_use]
    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = Some(field.into());
        self
    }
}

/// Turns one transport response into one page.
///
/// Decoding never fails as a call: request-level and envelope failures
/// become a failed page, per-document failures stay in their wrapper.
/// Implementations must be deterministic.
pub trait PageDecoder<T>: Send + Sync {
    /// Decode a response into a page
    fn decode_page(&self, response: &TransportResponse) -> Page<T>;
}
