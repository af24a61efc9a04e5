// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Docstore Client
//!
//! Async client for a remote document store that returns query results
//! one page at a time, linked by opaque continuation tokens.
//!
//! ## Features
//!
//! - **Async Transport**: One HTTP exchange per call, completed exactly once
//! - **Cancellation**: Race any exchange against a caller-supplied signal
//! - **Paged Cursors**: Follow continuation tokens until the listing ends
//! - **Per-Document Errors**: A broken document never hides its neighbours
//! - **Resumable**: Save a token, open a new cursor from it later
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docstore_client::{ClientConfig, DocumentClient};
//!
//! #[tokio::main]
//! async fn main() -> docstore_client::Result<()> {
//!     let config = ClientConfig::from_file("docstore.yaml")?;
//!     let client = DocumentClient::from_config(config)?;
//!
//!     let mut cursor = client.list::<serde_json::Value>("docs")?;
//!     while let Some(page) = cursor.next_page().await {
//!         for doc in page.items() {
//!             println!("{:?}", doc.value());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      DocumentClient                        │
//! │   list(path)   list_partition(path, key)   resume(token)   │
//! └──────────────────────────────┬─────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴─────┬──────────────────────┐
//! │  Transport   │    PagedCursor      │    PageDecoder       │
//! ├──────────────┼─────────────────────┼──────────────────────┤
//! │ HTTP         │ Fetching(token)     │ JSON envelope        │
//! │ Retry        │ Done                │ Continuation token   │
//! │ Rate limit   │ Failed(error)       │ Per-document errors  │
//! │ Mock         │                     │                      │
//! └──────────────┴─────────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Async request/response transport
pub mod transport;

/// Pages and continuation-token cursors
pub mod pagination;

/// Response decoders
pub mod decode;

/// Client configuration
pub mod config;

/// Document client
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{DataSourceError, Error, ErrorKind, Result};
pub use types::*;

pub use client::{DocumentClient, DocumentCursor};
pub use config::ClientConfig;
pub use decode::{EnvelopeConfig, JsonPageDecoder, PageDecoder};
pub use pagination::{CursorState, DocumentWrapper, Page, PageQuery, PagedCursor};
pub use transport::{
    send_cancellable, spawn_send, HttpTransport, MockTransport, PendingResponse, Transport,
    TransportRequest, TransportResponse,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
