//! In-memory transport for tests
//!
//! Replies come from a FIFO script. Once the script runs dry the transport
//! answers with the configured fallback response, or fails the call with an
//! error if there is none. Every request is recorded.

use super::types::{Transport, TransportRequest, TransportResponse, TransportResult};
use crate::error::Error;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Scripted transport
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<TransportResult>>,
    fallback: Option<TransportResponse>,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that answers every call with `response`
    pub fn repeating(response: TransportResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::default()
        }
    }

    /// Delay every reply by `delay`
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response
    #[must_use]
    pub fn respond(self, response: TransportResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn fail(self, error: Error) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue a reply on a shared transport
    pub fn push(&self, reply: TransportResult) {
        lock(&self.replies).push_back(reply);
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received, in order
    pub fn requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }

    /// Number of scripted replies not yet consumed
    pub fn pending(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> TransportResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request);

        let reply = lock(&self.replies).pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match (reply, &self.fallback) {
            (Some(reply), _) => reply,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(Error::Other("mock transport has no scripted reply".into())),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
