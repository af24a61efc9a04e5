//! Page request construction
//!
//! A [`PageQuery`] is the fixed part of a paginated request. Each step only
//! adds the continuation token of the previous page.

use crate::decode::DEFAULT_CONTINUATION_HEADER;
use crate::error::Result;
use crate::transport::{parse_absolute_url, TransportRequest};
use crate::types::{Headers, Method};
use bytes::Bytes;
use serde::Serialize;
use url::Url;

/// Default request header carrying the page size
pub const DEFAULT_PAGE_SIZE_HEADER: &str = "x-ms-max-item-count";

/// Template for every request of one pagination sequence
#[derive(Debug, Clone)]
pub struct PageQuery {
    url: Url,
    method: Method,
    headers: Headers,
    body: Option<Bytes>,
    page_size: Option<u32>,
    continuation_header: String,
    page_size_header: String,
}

impl PageQuery {
    /// Create a query
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self::from_url(method, parse_absolute_url(url)?))
    }

    /// Create a GET query
    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a query from a parsed URL
    pub fn from_url(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: Headers::new(),
            body: None,
            page_size: None,
            continuation_header: DEFAULT_CONTINUATION_HEADER.to_string(),
            page_size_header: DEFAULT_PAGE_SIZE_HEADER.to_string(),
        }
    }

    /// Add a header sent with every page request
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge headers sent with every page request
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.extend_from(headers);
        self
    }

    /// Set a raw body sent with every page request
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize a JSON body (e.g., a query document)
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        self.headers.insert("Content-Type", "application/json");
        Ok(self)
    }

    /// Ask the server for at most `size` documents per page
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Header used to send the continuation token
    #[must_use]
    pub fn continuation_header(mut self, name: impl Into<String>) -> Self {
        self.continuation_header = name.into();
        self
    }

    /// Header used to send the page size
    #[must_use]
    pub fn page_size_header(mut self, name: impl Into<String>) -> Self {
        self.page_size_header = name.into();
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

    /// Build the request for one page.
    ///
    /// The first page is requested without a token; later pages echo the
    /// previous token verbatim.
    pub fn request(&self, continuation: Option<&str>) -> TransportRequest {
        let mut request =
            TransportRequest::from_url(self.method, self.url.clone()).headers(&self.headers);

        if let Some(size) = self.page_size {
            request = request.header(&self.page_size_header, size.to_string());
        }
        if let Some(token) = continuation.filter(|t| !t.is_empty()) {
            request = request.header(&self.continuation_header, token);
        }
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }
        request
    }
}
