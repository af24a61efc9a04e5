//! Document client
//!
//! Binds a transport to a [`ClientConfig`] and opens cursors over the
//! collection at the configured endpoint.

use crate::config::ClientConfig;
use crate::decode::JsonPageDecoder;
use crate::error::{Error, Result};
use crate::pagination::{PageQuery, PagedCursor};
use crate::transport::{parse_absolute_url, HttpTransport, RetryTransport, Transport};
use crate::types::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Cursor type returned by [`DocumentClient`]
pub type DocumentCursor<T> = PagedCursor<T, Arc<dyn Transport>, JsonPageDecoder>;

/// Read-side client for one document collection
#[derive(Clone)]
pub struct DocumentClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl DocumentClient {
    /// Create a client over HTTP, wrapped in a retry layer when configured
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpTransport::with_config(config.transport_config())?;
        let transport: Arc<dyn Transport> = match &config.http.retry {
            Some(policy) => Arc::new(RetryTransport::new(http, policy.clone())),
            None => Arc::new(http),
        };
        Ok(Self { transport, config })
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Build the query for a path below the endpoint.
    ///
    /// Absolute URLs are used as given.
    pub fn query(&self, path: &str) -> Result<PageQuery> {
        let url = self.build_url(path);
        let pagination = &self.config.pagination;

        let mut query = PageQuery::from_url(Method::GET, parse_absolute_url(&url)?)
            .continuation_header(&pagination.continuation_header)
            .page_size_header(&pagination.page_size_header);
        if let Some(size) = pagination.page_size {
            query = query.page_size(size);
        }
        Ok(query)
    }

    /// List every document under `path`
    pub fn list<T: DeserializeOwned>(&self, path: &str) -> Result<DocumentCursor<T>> {
        let query = self.query(path)?;
        Ok(self.open(query, None))
    }

    /// List documents of one partition under `path`
    pub fn list_partition<T: DeserializeOwned>(
        &self,
        path: &str,
        partition: &str,
    ) -> Result<DocumentCursor<T>> {
        let key = serde_json::to_string(&[partition])?;
        let query = self
            .query(path)?
            .header(&self.config.pagination.partition_key_header, key);
        Ok(self.open(query, None))
    }

    /// Continue a listing from a token saved by an earlier cursor
    pub fn resume<T: DeserializeOwned>(
        &self,
        path: &str,
        token: impl Into<String>,
    ) -> Result<DocumentCursor<T>> {
        let query = self.query(path)?;
        Ok(self.open(query, Some(token.into())))
    }

    /// Open a cursor over an arbitrary query
    pub fn open<T: DeserializeOwned>(
        &self,
        query: PageQuery,
        token: Option<String>,
    ) -> DocumentCursor<T> {
        debug!("Opening cursor on {}", query.url());
        let transport = Arc::clone(&self.transport);
        let decoder = JsonPageDecoder::with_config(self.config.envelope.clone());
        let cursor = match token {
            Some(token) => PagedCursor::resume(transport, query, decoder, token),
            None => PagedCursor::new(transport, query, decoder),
        };
        match self.config.pagination.max_pages {
            Some(max) => cursor.with_max_pages(max),
            None => cursor,
        }
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.config.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

impl std::fmt::Debug for DocumentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentClient")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

impl TryFrom<ClientConfig> for DocumentClient {
    type Error = Error;

    fn try_from(config: ClientConfig) -> Result<Self> {
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportResponse};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Note {
        title: String,
    }

    fn client(mock: &Arc<MockTransport>) -> DocumentClient {
        let mut config = ClientConfig::new("https://acct.documents.example.com/dbs/app/colls/notes/");
        config.pagination.page_size = Some(10);
        DocumentClient::with_transport(mock.clone(), config).unwrap()
    }

    #[test]
    fn test_query_url_building() {
        let mock = Arc::new(MockTransport::new());
        let client = client(&mock);

        let query = client.query("/docs").unwrap();
        assert_eq!(
            query.url().as_str(),
            "https://acct.documents.example.com/dbs/app/colls/notes/docs"
        );

        let absolute = client.query("https://other.example.com/docs").unwrap();
        assert_eq!(absolute.url().host_str(), Some("other.example.com"));

        let root = client.query("").unwrap();
        assert!(root.url().as_str().ends_with("/colls/notes"));
    }

    #[tokio::test]
    async fn test_list_partition_sends_headers() {
        let mock = Arc::new(MockTransport::new().respond(TransportResponse::json(&json!({
            "Documents": [{"id": "1", "PartitionKey": "user-1", "document": {"title": "hi"}}]
        }))));
        let client = client(&mock);

        let mut cursor = client.list_partition::<Note>("docs", "user-1").unwrap();
        let page = cursor.next_page().await.unwrap();
        assert_eq!(page.items()[0].value().unwrap().title, "hi");
        assert_eq!(page.items()[0].partition(), Some("user-1"));

        let requests = mock.requests();
        let request = &requests[0];
        assert_eq!(
            request.header_map().get("x-ms-documentdb-partitionkey"),
            Some("[\"user-1\"]")
        );
        assert_eq!(request.header_map().get("x-ms-max-item-count"), Some("10"));
    }

    #[tokio::test]
    async fn test_resume_sends_token_and_max_pages_applies() {
        let page = TransportResponse::json(&json!({"Documents": []}))
            .with_header("x-ms-continuation", "again");
        let mock = Arc::new(MockTransport::repeating(page));

        let mut config = ClientConfig::new("https://example.com/colls/notes");
        config.pagination.max_pages = Some(2);
        let client = DocumentClient::with_transport(mock.clone(), config).unwrap();

        let documents = client
            .resume::<Note>("docs", "saved")
            .unwrap()
            .collect_documents()
            .await
            .unwrap();

        assert!(documents.is_empty());
        assert_eq!(mock.call_count(), 2);
        assert_eq!(
            mock.requests()[0].header_map().get("x-ms-continuation"),
            Some("saved")
        );
    }

    #[test]
    fn test_from_config_validates() {
        assert!(DocumentClient::from_config(ClientConfig::new("not a url")).is_err());
        let client = DocumentClient::try_from(ClientConfig::new("https://example.com/docs"));
        assert!(client.is_ok());
    }
}
