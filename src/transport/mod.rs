//! Transport module
//!
//! One asynchronous HTTP exchange per call, completing exactly once.
//!
//! # Features
//!
//! - **Pluggable**: pagination only depends on the [`Transport`] trait
//! - **HttpTransport**: reqwest implementation with rate limiting
//! - **RetryTransport**: opt-in retry of transport-kind failures
//! - **MockTransport**: scripted replies for tests
//! - **Detached dispatch and cancellation** helpers

mod client;
mod mock;
mod rate_limit;
mod retry;
mod types;

pub use client::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder};
pub use mock::MockTransport;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::{RetryPolicy, RetryTransport};
pub use types::{Transport, TransportRequest, TransportResponse, TransportResult};

pub(crate) use types::parse_absolute_url;

use crate::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::debug;

/// Handle to an exchange running on the tokio runtime.
///
/// Resolves to exactly one [`TransportResult`]. If the task dies before
/// reporting, the handle resolves to [`Error::TransportClosed`].
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<TransportResult>,
}

impl Future for PendingResponse {
    type Output = TransportResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(Error::TransportClosed)))
    }
}

/// Start an exchange without waiting for it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_send<T>(transport: Arc<T>, request: TransportRequest) -> PendingResponse
where
    T: Transport + ?Sized + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = transport.send(request).await;
        if tx.send(result).is_err() {
            debug!("Response dropped: caller no longer waiting");
        }
    });
    PendingResponse { rx }
}

/// Race an exchange against a cancellation signal.
///
/// When `cancel` resolves first the in-flight exchange is dropped and the
/// call completes with [`Error::Cancelled`].
pub async fn send_cancellable<T, C>(
    transport: &T,
    request: TransportRequest,
    cancel: C,
) -> TransportResult
where
    T: Transport + ?Sized,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = cancel => {
            debug!("Exchange cancelled by caller");
            Err(Error::Cancelled)
        }
        result = transport.send(request) => result,
    }
}
