//! Lazy cursor over a paginated collection
//!
//! Drives the pagination state machine one transport exchange at a time.
//! Nothing is fetched until the caller asks for a page, and page N+1 is only
//! requested after page N has been decoded.

use super::query::PageQuery;
use super::types::{CursorState, DocumentWrapper, Page};
use crate::decode::{JsonPageDecoder, PageDecoder};
use crate::error::{DataSourceError, Error, Result};
use crate::transport::Transport;
use futures::Stream;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Forward-only cursor yielding [`Page`]s
pub struct PagedCursor<T, Tr, D = JsonPageDecoder> {
    transport: Tr,
    query: PageQuery,
    decoder: D,
    state: CursorState,
    pages_fetched: u32,
    max_pages: Option<u32>,
    resume_token: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, Tr, D> PagedCursor<T, Tr, D>
where
    Tr: Transport,
    D: PageDecoder<T>,
{
    /// Create a cursor starting at the first page
    pub fn new(transport: Tr, query: PageQuery, decoder: D) -> Self {
        Self {
            transport,
            query,
            decoder,
            state: CursorState::Fetching(None),
            pages_fetched: 0,
            max_pages: None,
            resume_token: None,
            _marker: PhantomData,
        }
    }

    /// Create a cursor that continues from a cached token.
    ///
    /// An empty token starts from the first page.
    pub fn resume(transport: Tr, query: PageQuery, decoder: D, token: impl Into<String>) -> Self {
        let token = Some(token.into()).filter(|t| !t.is_empty());
        let mut cursor = Self::new(transport, query, decoder);
        cursor.state = CursorState::Fetching(token.clone());
        cursor.resume_token = token;
        cursor
    }

    /// Stop after `max_pages` pages even if the server keeps sending tokens
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Current state
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Whether no further pages will be fetched
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of exchanges performed
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Token of the next unfetched page, if any.
    ///
    /// Still available after the page bound stops the cursor, so the
    /// sequence can be resumed later.
    pub fn resume_token(&self) -> Option<&str> {
        self.resume_token.as_deref()
    }

    /// Fetch the next page.
    ///
    /// Returns `None` once the cursor is done or failed. A failed exchange or
    /// undecodable response is returned as a page carrying the error, after
    /// which the cursor stops.
    pub async fn next_page(&mut self) -> Option<Page<T>> {
        let token = match &self.state {
            CursorState::Fetching(token) => token.clone(),
            CursorState::Done | CursorState::Failed(_) => return None,
        };

        if let Some(max) = self.max_pages {
            if self.pages_fetched >= max {
                warn!(
                    "Stopping pagination after {} pages with a continuation token outstanding",
                    max
                );
                self.state = CursorState::Done;
                return None;
            }
        }

        let request = self.query.request(token.as_deref());
        debug!(
            "Fetching page {} of {} {}",
            self.pages_fetched + 1,
            request.method(),
            request.url()
        );

        let page = match self.transport.send(request).await {
            Ok(response) => self.decoder.decode_page(&response),
            Err(e) => {
                warn!("Page request failed: {}", e);
                Page::failed(DataSourceError::from(&e))
            }
        };
        self.pages_fetched += 1;

        self.state = CursorState::from(page.outcome());
        self.resume_token = match &self.state {
            CursorState::Fetching(next) => next.clone(),
            CursorState::Done => None,
            // Keep the token that produced the failure so the caller can retry it
            CursorState::Failed(_) => token,
        };

        debug!(
            "Page {} returned {} documents, state {:?}",
            self.pages_fetched,
            page.len(),
            self.state
        );

        Some(page)
    }

    /// Drain the cursor and return every document.
    ///
    /// Documents that failed to decode are included with their error set.
    /// The first page-level error aborts the drain.
    pub async fn collect_documents(mut self) -> Result<Vec<DocumentWrapper<T>>> {
        let mut documents = Vec::new();
        while let Some(page) = self.next_page().await {
            if let Some(error) = page.error() {
                return Err(Error::Page(error.clone()));
            }
            documents.extend(page.into_items());
        }
        Ok(documents)
    }

    /// Convert the cursor into a stream of pages
    pub fn into_stream(self) -> impl Stream<Item = Page<T>> {
        futures::stream::unfold(self, |mut cursor| async move {
            let page = cursor.next_page().await?;
            Some((page, cursor))
        })
    }
}

impl<T, Tr, D> std::fmt::Debug for PagedCursor<T, Tr, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedCursor")
            .field("url", &self.query.url().as_str())
            .field("state", &self.state)
            .field("pages_fetched", &self.pages_fetched)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}
