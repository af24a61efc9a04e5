//! Transport types and traits
//!
//! Defines the request/response values exchanged with a [`Transport`] and the
//! trait itself.

use crate::error::{Error, Result};
use crate::types::{Headers, Method};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Outcome of one transport exchange.
///
/// `Ok` carries the response whatever its status code; `Err` is reserved for
/// transport-kind failures.
pub type TransportResult = Result<TransportResponse>;

/// A single HTTP exchange to perform
#[derive(Debug, Clone)]
pub struct TransportRequest {
    url: Url,
    method: Method,
    headers: Headers,
    body: Option<Bytes>,
    timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a request for an absolute URL
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self::from_url(method, parse_absolute_url(url)?))
    }

    /// Create a request from an already parsed URL
    pub fn from_url(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: Headers::new(),
            body: None,
            timeout: None,
        }
    }

    /// Create a request from loosely typed parts, validating each of them
    pub fn from_parts(
        url: &str,
        method: &str,
        headers: Option<Headers>,
        body: Option<Bytes>,
    ) -> Result<Self> {
        let method: Method = method.parse()?;
        let mut request = Self::new(method, url)?;
        if let Some(headers) = headers {
            request.headers = headers;
        }
        request.body = body;
        Ok(request)
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a set of headers into this request
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend_from(headers);
        self
    }

    /// Set a raw body
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize a JSON body and set the content type
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.body = Some(Bytes::from(bytes));
        self.headers.insert("Content-Type", "application/json");
        Ok(self)
    }

    /// Override the transport timeout for this request
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP verb
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request headers
    pub fn header_map(&self) -> &Headers {
        &self.headers
    }

    /// Request body, if any
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Per-request timeout override
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Response of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Raw body, possibly empty
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a 200 response with a JSON body
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(
            200,
            Headers::new().with("Content-Type", "application/json"),
            value.to_string(),
        )
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get response body as UTF-8 string
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| Error::decode(format!("Invalid UTF-8 in response body: {e}")))
    }

    /// Parse response body as JSON
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Asynchronous HTTP transport.
///
/// Every call to [`send`](Transport::send) completes exactly once, with
/// either the response or a transport-kind error. Implementations must be
/// safe to share between independent callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange
    async fn send(&self, request: TransportRequest) -> TransportResult;

    /// Validate loosely typed request parts, then perform the exchange.
    ///
    /// Validation failures complete the call with an error without touching
    /// the network.
    async fn send_async(
        &self,
        url: &str,
        method: &str,
        headers: Option<Headers>,
        body: Option<Bytes>,
    ) -> TransportResult {
        let request = TransportRequest::from_parts(url, method, headers, body)?;
        self.send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: TransportRequest) -> TransportResult {
        (**self).send(request).await
    }
}

/// Parse a URL and require it to be absolute
pub(crate) fn parse_absolute_url(url: &str) -> Result<Url> {
    match Url::parse(url) {
        Ok(parsed) if parsed.cannot_be_a_base() => Err(Error::RelativeUrl {
            url: url.to_string(),
        }),
        Ok(parsed) => Ok(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => Err(Error::RelativeUrl {
            url: url.to_string(),
        }),
        Err(e) => Err(Error::InvalidUrl(e)),
    }
}
