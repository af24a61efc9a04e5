//! Pagination types
//!
//! A [`Page`] is one decoded step of a paginated query. Pages are immutable;
//! the continuation token is the only state carried from one page to the
//! next.

use crate::error::DataSourceError;
use chrono::{DateTime, Utc};

/// Metadata the store attaches to every document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Document id
    pub id: Option<String>,
    /// Partition the document lives in
    pub partition: Option<String>,
    /// Entity tag for optimistic concurrency
    pub etag: Option<String>,
    /// Last server-side modification
    pub last_updated: Option<DateTime<Utc>>,
}

/// A retrieved document plus its decode status.
///
/// Exactly one of [`value`](Self::value) and [`error`](Self::error) is set.
/// The raw JSON is kept either way so callers can log or re-decode it.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrapper<T> {
    json_value: String,
    deserialized_value: Option<T>,
    metadata: DocumentMetadata,
    error: Option<DataSourceError>,
}

impl<T> DocumentWrapper<T> {
    /// Wrap a successfully decoded document
    pub fn decoded(json_value: impl Into<String>, value: T, metadata: DocumentMetadata) -> Self {
        Self {
            json_value: json_value.into(),
            deserialized_value: Some(value),
            metadata,
            error: None,
        }
    }

    /// Wrap a document that failed to decode
    pub fn failed(
        json_value: impl Into<String>,
        metadata: DocumentMetadata,
        error: DataSourceError,
    ) -> Self {
        Self {
            json_value: json_value.into(),
            deserialized_value: None,
            metadata,
            error: Some(error),
        }
    }

    /// Raw JSON text as received
    pub fn json_value(&self) -> &str {
        &self.json_value
    }

    /// Decoded value, if decoding succeeded
    pub fn value(&self) -> Option<&T> {
        self.deserialized_value.as_ref()
    }

    /// Consume the wrapper, returning the decoded value
    pub fn into_value(self) -> Option<T> {
        self.deserialized_value
    }

    /// Document id
    pub fn id(&self) -> Option<&str> {
        self.metadata.id.as_deref()
    }

    /// Partition key
    pub fn partition(&self) -> Option<&str> {
        self.metadata.partition.as_deref()
    }

    /// Entity tag
    pub fn etag(&self) -> Option<&str> {
        self.metadata.etag.as_deref()
    }

    /// Last modification time
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.metadata.last_updated
    }

    /// All metadata
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Decode failure for this document
    pub fn error(&self) -> Option<&DataSourceError> {
        self.error.as_ref()
    }

    /// Whether the document decoded
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// What a driver must do after observing a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Request the next page with this token
    Continue(String),
    /// No more pages
    Done,
    /// The page failed; stop regardless of any token
    Failed(DataSourceError),
}

/// One page of documents
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<DocumentWrapper<T>>,
    continuation_token: Option<String>,
    error: Option<DataSourceError>,
}

impl<T> Page<T> {
    /// Create a successful page. An empty token is stored as absent.
    pub fn new(items: Vec<DocumentWrapper<T>>, continuation_token: Option<String>) -> Self {
        Self {
            items,
            continuation_token: continuation_token.filter(|t| !t.is_empty()),
            error: None,
        }
    }

    /// Create a failed page. It has no items and no token.
    pub fn failed(error: DataSourceError) -> Self {
        Self {
            items: Vec::new(),
            continuation_token: None,
            error: Some(error),
        }
    }

    /// Documents in server order
    pub fn items(&self) -> &[DocumentWrapper<T>] {
        &self.items
    }

    /// Consume the page, returning its documents
    pub fn into_items(self) -> Vec<DocumentWrapper<T>> {
        self.items
    }

    /// Token for the next page; empty when there are no further pages
    pub fn continuation_token(&self) -> &str {
        self.continuation_token.as_deref().unwrap_or_default()
    }

    /// Page-level error
    pub fn error(&self) -> Option<&DataSourceError> {
        self.error.as_ref()
    }

    /// Whether a follow-up request is allowed
    pub fn has_next_page(&self) -> bool {
        self.error.is_none() && self.continuation_token.is_some()
    }

    /// Number of documents on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no documents
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Decide the next pagination step.
    ///
    /// An error always stops pagination. Otherwise the token alone decides;
    /// an empty page with a token still continues.
    pub fn outcome(&self) -> PageOutcome {
        if let Some(error) = &self.error {
            return PageOutcome::Failed(error.clone());
        }
        match &self.continuation_token {
            Some(token) => PageOutcome::Continue(token.clone()),
            None => PageOutcome::Done,
        }
    }
}

/// Where a cursor is between calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// The next call fetches a page with this token (none for the first page)
    Fetching(Option<String>),
    /// No further pages will be requested: the last page had no
    /// continuation token, or the page bound was reached with one still
    /// outstanding (see `PagedCursor::resume_token`)
    Done,
    /// A transport, status or decode failure ended the sequence
    Failed(DataSourceError),
}

impl CursorState {
    /// Whether no further pages will be fetched
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fetching(_))
    }
}

impl From<PageOutcome> for CursorState {
    fn from(outcome: PageOutcome) -> Self {
        match outcome {
            PageOutcome::Continue(token) => Self::Fetching(Some(token)),
            PageOutcome::Done => Self::Done,
            PageOutcome::Failed(error) => Self::Failed(error),
        }
    }
}
