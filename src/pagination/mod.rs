//! Pagination module
//!
//! Continuation-token pagination over a [`Transport`](crate::transport::Transport).
//!
//! # Overview
//!
//! ```text
//! Fetching(None) ──send──▶ Page ──token──▶ Fetching(token) ──▶ ...
//!                            │
//!                            ├── no token ──▶ Done
//!                            └── error ─────▶ Failed
//! ```
//!
//! The token is the only state carried between pages. An error on a page
//! stops the sequence even when a token is present, and an empty page with
//! a token does not.

mod cursor;
mod query;
mod types;

pub use cursor::PagedCursor;
pub use query::{PageQuery, DEFAULT_PAGE_SIZE_HEADER};
pub use types::{CursorState, DocumentMetadata, DocumentWrapper, Page, PageOutcome};

#[cfg(test)]
mod tests;
