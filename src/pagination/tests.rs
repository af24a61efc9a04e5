//! Tests for pagination module

use super::*;
use crate::decode::{EnvelopeConfig, JsonPageDecoder};
use crate::error::{DataSourceError, Error, ErrorKind};
use crate::transport::{MockTransport, TransportResponse};
use crate::types::{Headers, Method};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Item {
    n: u32,
}

const URL: &str = "https://acct.documents.example.com/dbs/app/colls/items/docs";

fn page_response(values: &[u32], token: Option<&str>) -> TransportResponse {
    let documents: Vec<_> = values
        .iter()
        .map(|n| json!({"id": n.to_string(), "n": n}))
        .collect();
    let mut response = TransportResponse::json(&json!({ "Documents": documents }));
    if let Some(token) = token {
        response = response.with_header("x-ms-continuation", token);
    }
    response
}

fn decoder() -> JsonPageDecoder {
    JsonPageDecoder::with_config(EnvelopeConfig::plain("Documents"))
}

fn cursor(transport: Arc<MockTransport>) -> PagedCursor<Item, Arc<MockTransport>> {
    PagedCursor::new(transport, PageQuery::get(URL).unwrap(), decoder())
}

fn sent_tokens(transport: &MockTransport) -> Vec<Option<String>> {
    transport
        .requests()
        .iter()
        .map(|r| r.header_map().get("x-ms-continuation").map(str::to_string))
        .collect()
}

// ============================================================================
// Page Tests
// ============================================================================

#[test]
fn test_page_new_normalizes_empty_token() {
    let page: Page<Item> = Page::new(Vec::new(), Some(String::new()));
    assert_eq!(page.continuation_token(), "");
    assert_eq!(page.outcome(), PageOutcome::Done);
}

#[test]
fn test_page_failed_has_no_items_or_token() {
    let page: Page<Item> = Page::failed(DataSourceError::new(ErrorKind::Decode, "bad"));
    assert!(page.is_empty());
    assert_eq!(page.continuation_token(), "");
    assert!(!page.has_next_page());
    assert!(matches!(page.outcome(), PageOutcome::Failed(_)));
}

#[test]
fn test_page_outcome_continue_on_empty_items() {
    let page: Page<Item> = Page::new(Vec::new(), Some("t".to_string()));
    assert_eq!(page.outcome(), PageOutcome::Continue("t".to_string()));
}

#[test]
fn test_document_wrapper_accessors() {
    let metadata = DocumentMetadata {
        id: Some("d1".to_string()),
        ..Default::default()
    };
    let ok = DocumentWrapper::decoded("{\"n\":1}", Item { n: 1 }, metadata.clone());
    assert!(ok.is_ok());
    assert_eq!(ok.id(), Some("d1"));
    assert_eq!(ok.clone().into_value(), Some(Item { n: 1 }));

    let bad: DocumentWrapper<Item> =
        DocumentWrapper::failed("{}", metadata, DataSourceError::document("missing n"));
    assert!(!bad.is_ok());
    assert!(bad.value().is_none());
    assert_eq!(bad.error().unwrap().message, "missing n");
}

#[test]
fn test_cursor_state_from_outcome() {
    assert_eq!(
        CursorState::from(PageOutcome::Continue("x".to_string())),
        CursorState::Fetching(Some("x".to_string()))
    );
    assert!(CursorState::from(PageOutcome::Done).is_terminal());
    assert!(!CursorState::Fetching(None).is_terminal());
}

// ============================================================================
// PageQuery Tests
// ============================================================================

#[test]
fn test_page_query_first_request_has_no_token() {
    let query = PageQuery::get(URL)
        .unwrap()
        .header("x-ms-documentdb-partitionkey", "[\"user-1\"]")
        .page_size(25);

    let request = query.request(None);
    assert_eq!(request.method(), Method::GET);
    assert_eq!(request.url().as_str(), URL);
    assert!(!request.header_map().contains("x-ms-continuation"));
    assert_eq!(
        request.header_map().get(DEFAULT_PAGE_SIZE_HEADER),
        Some("25")
    );
    assert_eq!(
        request.header_map().get("x-ms-documentdb-partitionkey"),
        Some("[\"user-1\"]")
    );
}

#[test]
fn test_page_query_echoes_token_verbatim() {
    let query = PageQuery::new(Method::POST, URL)
        .unwrap()
        .json(&json!({"query": "SELECT * FROM c"}))
        .unwrap()
        .continuation_header("x-next");

    let token = "{\"token\":\"+RID:~abc==#RT:2\",\"range\":{\"min\":\"\",\"max\":\"FF\"}}";
    let request = query.request(Some(token));

    assert_eq!(request.header_map().get("X-Next"), Some(token));
    assert!(request.body_bytes().is_some());
    assert_eq!(
        request.header_map().get("content-type"),
        Some("application/json")
    );
}

#[test]
fn test_page_query_rejects_relative_url() {
    let err = PageQuery::get("colls/items/docs").unwrap_err();
    assert!(matches!(err, Error::RelativeUrl { .. }));
}

// ============================================================================
// PagedCursor Tests
// ============================================================================

#[tokio::test]
async fn test_cursor_walks_all_pages() {
    let transport = Arc::new(
        MockTransport::new()
            .respond(page_response(&[1, 2], Some("t1")))
            .respond(page_response(&[3], Some("t2")))
            .respond(page_response(&[4, 5], None)),
    );
    let mut cursor = cursor(Arc::clone(&transport));
    assert_eq!(cursor.state(), &CursorState::Fetching(None));

    let mut seen = Vec::new();
    while let Some(page) = cursor.next_page().await {
        assert!(page.error().is_none());
        seen.extend(page.items().iter().map(|d| d.value().unwrap().n));
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(cursor.state(), &CursorState::Done);
    assert!(cursor.is_finished());
    assert_eq!(cursor.pages_fetched(), 3);
    assert!(cursor.resume_token().is_none());
    assert_eq!(
        sent_tokens(&transport),
        vec![None, Some("t1".to_string()), Some("t2".to_string())]
    );

    // Finished cursors do not issue further requests
    assert!(cursor.next_page().await.is_none());
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_cursor_continues_through_empty_pages() {
    let transport = Arc::new(
        MockTransport::new()
            .respond(page_response(&[], Some("sparse-1")))
            .respond(page_response(&[], Some("sparse-2")))
            .respond(page_response(&[9], None)),
    );
    let mut cursor = cursor(Arc::clone(&transport));

    let first = cursor.next_page().await.unwrap();
    assert!(first.is_empty());
    assert!(!cursor.is_finished());

    let second = cursor.next_page().await.unwrap();
    assert!(second.is_empty());
    assert_eq!(
        cursor.state(),
        &CursorState::Fetching(Some("sparse-2".to_string()))
    );

    let third = cursor.next_page().await.unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(cursor.state(), &CursorState::Done);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_cursor_stops_on_error_page_despite_token() {
    let failing = TransportResponse::new(
        500,
        Headers::new().with("x-ms-continuation", "looks-valid"),
        "boom",
    );
    let transport = Arc::new(
        MockTransport::new()
            .respond(page_response(&[1], Some("t1")))
            .respond(failing)
            .respond(page_response(&[2], None)),
    );
    let mut cursor = cursor(Arc::clone(&transport));

    assert!(cursor.next_page().await.unwrap().error().is_none());

    let failed = cursor.next_page().await.unwrap();
    let error = failed.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Status);
    assert_eq!(error.status, Some(500));
    assert!(matches!(cursor.state(), CursorState::Failed(_)));

    assert!(cursor.next_page().await.is_none());
    assert_eq!(transport.call_count(), 2);
    assert_eq!(transport.pending(), 1);
    // The failed request's token is kept for a later retry
    assert_eq!(cursor.resume_token(), Some("t1"));
}

#[tokio::test]
async fn test_cursor_transport_failure_yields_failed_page() {
    let transport = Arc::new(MockTransport::new().fail(Error::Timeout { timeout_ms: 30 }));
    let mut cursor = cursor(Arc::clone(&transport));

    let page = cursor.next_page().await.unwrap();
    let error = page.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Transport);
    assert!(page.is_empty());
    assert!(matches!(cursor.state(), CursorState::Failed(e) if e.kind == ErrorKind::Transport));
    assert!(cursor.next_page().await.is_none());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_cursor_keeps_going_past_bad_documents() {
    let bad_page = TransportResponse::json(&json!({
        "Documents": [{"n": 1}, {"n": "two"}, {"n": 3}]
    }))
    .with_header("x-ms-continuation", "t1");
    let transport = Arc::new(
        MockTransport::new()
            .respond(bad_page)
            .respond(page_response(&[4], None)),
    );

    let documents = cursor(transport).collect_documents().await.unwrap();
    assert_eq!(documents.len(), 4);
    assert_eq!(documents.iter().filter(|d| d.is_ok()).count(), 3);
    assert_eq!(
        documents[1].error().map(|e| e.kind),
        Some(ErrorKind::Document)
    );
}

#[tokio::test]
async fn test_cursor_collect_documents_propagates_page_error() {
    let transport = Arc::new(
        MockTransport::new()
            .respond(page_response(&[1], Some("t1")))
            .respond(TransportResponse::new(200, Headers::new(), "not json")),
    );

    let err = cursor(transport).collect_documents().await.unwrap_err();
    assert!(matches!(err, Error::Page(ref e) if e.kind == ErrorKind::Decode));
}

#[tokio::test]
async fn test_cursor_resume_from_cached_token() {
    let transport = Arc::new(MockTransport::new().respond(page_response(&[7], None)));
    let mut cursor: PagedCursor<Item, _> = PagedCursor::resume(
        Arc::clone(&transport),
        PageQuery::get(URL).unwrap(),
        decoder(),
        "cached",
    );
    assert_eq!(cursor.resume_token(), Some("cached"));

    let page = cursor.next_page().await.unwrap();
    assert_eq!(page.items()[0].value(), Some(&Item { n: 7 }));
    assert_eq!(sent_tokens(&transport), vec![Some("cached".to_string())]);
}

#[tokio::test]
async fn test_cursor_resume_with_empty_token_starts_over() {
    let transport = Arc::new(MockTransport::new().respond(page_response(&[1], None)));
    let mut cursor: PagedCursor<Item, _> = PagedCursor::resume(
        Arc::clone(&transport),
        PageQuery::get(URL).unwrap(),
        decoder(),
        "",
    );
    cursor.next_page().await.unwrap();
    assert_eq!(sent_tokens(&transport), vec![None]);
}

#[tokio::test]
async fn test_endless_backend_is_bounded_by_the_caller() {
    let transport = Arc::new(MockTransport::repeating(page_response(&[1], Some("again"))));
    let mut cursor = cursor(Arc::clone(&transport));

    let step_bound = 25;
    let mut steps = 0;
    while cursor.next_page().await.is_some() {
        steps += 1;
        if steps == step_bound {
            break;
        }
    }

    assert_eq!(steps, step_bound);
    assert!(!cursor.is_finished(), "backend never stops sending tokens");
    assert_eq!(transport.call_count(), step_bound);
}

#[tokio::test]
async fn test_cursor_max_pages_bound() {
    let transport = Arc::new(MockTransport::repeating(page_response(&[1], Some("again"))));
    let mut cursor = cursor(Arc::clone(&transport)).with_max_pages(3);

    let mut pages = 0;
    while cursor.next_page().await.is_some() {
        pages += 1;
    }

    assert_eq!(pages, 3);
    assert_eq!(cursor.state(), &CursorState::Done);
    assert_eq!(cursor.resume_token(), Some("again"));
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_cursor_into_stream() {
    let transport = Arc::new(
        MockTransport::new()
            .respond(page_response(&[1], Some("t1")))
            .respond(page_response(&[2, 3], None)),
    );

    let pages: Vec<Page<Item>> = cursor(transport).into_stream().collect().await;
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].len(), 2);
    assert_eq!(pages[1].continuation_token(), "");
}

#[tokio::test]
async fn test_concurrent_cursors_are_independent() {
    let left = Arc::new(
        MockTransport::new()
            .respond(page_response(&[1], Some("l1")))
            .respond(page_response(&[2], None)),
    );
    let right = Arc::new(
        MockTransport::new()
            .respond(page_response(&[10], Some("r1")))
            .respond(page_response(&[20], Some("r2")))
            .respond(page_response(&[30], None)),
    );

    let (l, r) = tokio::join!(
        cursor(Arc::clone(&left)).collect_documents(),
        cursor(Arc::clone(&right)).collect_documents()
    );

    let l: Vec<u32> = l.unwrap().into_iter().map(|d| d.into_value().unwrap().n).collect();
    let r: Vec<u32> = r.unwrap().into_iter().map(|d| d.into_value().unwrap().n).collect();
    assert_eq!(l, vec![1, 2]);
    assert_eq!(r, vec![10, 20, 30]);
    assert_eq!(
        sent_tokens(&right),
        vec![None, Some("r1".to_string()), Some("r2".to_string())]
    );
}
