//! Retry layer
//!
//! Wraps any [`Transport`] and retries transport-kind failures (timeouts,
//! refused connections) with a backoff delay. Responses are never retried,
//! whatever their status: a 503 is still a completed exchange.

use super::types::{Transport, TransportRequest, TransportResult};
use crate::types::BackoffType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial delay for backoff
    #[serde(
        rename = "initial_backoff_ms",
        default = "default_initial_backoff",
        with = "duration_ms"
    )]
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    #[serde(
        rename = "max_backoff_ms",
        default = "default_max_backoff",
        with = "duration_ms"
    )]
    pub max_backoff: Duration,
    /// Type of backoff strategy
    #[serde(default)]
    pub backoff_type: BackoffType,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(100)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(60)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
            backoff_type: BackoffType::Exponential,
        }
    }
}

impl RetryPolicy {
    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }
}

/// Transport decorator retrying transport-kind failures
#[derive(Debug, Clone)]
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryTransport<T> {
    /// Wrap a transport with a retry policy
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped transport
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// The retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, request: TransportRequest) -> TransportResult {
        let mut attempt = 0;
        loop {
            match self.inner.send(request.clone()).await {
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.calculate_backoff(attempt);
                    warn!(
                        "{}, attempt {}/{}, retrying in {:?}",
                        e,
                        attempt + 1,
                        self.policy.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
