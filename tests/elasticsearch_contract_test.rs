//! Elasticsearch contract tests against a mock HTTP server
//!
//! These pin the wire shapes cinesync relies on: index existence checks,
//! index creation with mappings, and idempotent `_bulk` upserts keyed by
//! document id.

use cinesync::adapters::elasticsearch::{SearchClient, SearchLoader};
use cinesync::config::{ElasticsearchConfig, RetryConfig};
use cinesync::core::sync::DocumentSink;
use cinesync::domain::{CinesyncError, IndexDocument, SearchError, SearchIndex};
use mockito::{Matcher, Server};
use uuid::Uuid;

fn es_config(base_url: &str) -> ElasticsearchConfig {
    ElasticsearchConfig {
        base_url: base_url.to_string(),
        username: None,
        password: None,
        timeout_seconds: 5,
    }
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 1,
        initial_delay_ms: 1,
        max_delay_ms: 1,
        backoff_multiplier: 1.0,
    }
}

fn doc(id: Uuid) -> IndexDocument {
    IndexDocument {
        id,
        body: serde_json::json!({"id": id, "title": "Solaris"}),
    }
}

#[tokio::test]
async fn test_missing_index_is_created_with_mappings() {
    let mut server = Server::new_async().await;

    let head = server
        .mock("HEAD", "/movies")
        .with_status(404)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/movies")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "mappings": {"dynamic": "strict"}
        })))
        .with_status(200)
        .with_body(r#"{"acknowledged": true}"#)
        .create_async()
        .await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    let loader = SearchLoader::new(client, vec![SearchIndex::Movies], fast_retry());
    loader.ensure_indexes().await.unwrap();

    head.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_existing_index_is_left_alone() {
    let mut server = Server::new_async().await;

    let head = server
        .mock("HEAD", "/genres")
        .with_status(200)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/genres")
        .expect(0)
        .create_async()
        .await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    let loader = SearchLoader::new(client, vec![SearchIndex::Genres], fast_retry());
    loader.ensure_indexes().await.unwrap();

    head.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_bulk_upsert_sends_index_actions_keyed_by_id() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();

    let bulk = server
        .mock("POST", "/_bulk")
        .match_header("content-type", "application/x-ndjson")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""_index":"movies""#.to_string()),
            Matcher::Regex(format!(r#""_id":"{id}""#)),
            Matcher::Regex(r#""title":"Solaris""#.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"took": 3, "errors": false, "items": []}"#)
        .create_async()
        .await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    client
        .bulk_upsert(SearchIndex::Movies, &[doc(id)])
        .await
        .unwrap();

    bulk.assert_async().await;
}

#[tokio::test]
async fn test_resending_same_document_is_accepted() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();

    // The upsert contract: same id twice is two successful index actions,
    // the second overwriting the first.
    let bulk = server
        .mock("POST", "/_bulk")
        .with_status(200)
        .with_body(r#"{"took": 1, "errors": false, "items": []}"#)
        .expect(2)
        .create_async()
        .await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    client.bulk_upsert(SearchIndex::Movies, &[doc(id)]).await.unwrap();
    client.bulk_upsert(SearchIndex::Movies, &[doc(id)]).await.unwrap();

    bulk.assert_async().await;
}

#[tokio::test]
async fn test_partial_bulk_rejection_counts_failures() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/_bulk")
        .with_status(200)
        .with_body(
            r#"{"took": 5, "errors": true, "items": [
                {"index": {"status": 200}},
                {"index": {"status": 429}}
            ]}"#,
        )
        .create_async()
        .await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    let err = client
        .bulk_upsert(SearchIndex::Movies, &[doc(Uuid::new_v4()), doc(Uuid::new_v4())])
        .await
        .unwrap_err();

    let CinesyncError::Search(SearchError::BulkRejected { failed, total }) = err else {
        panic!("expected BulkRejected, got {err}");
    };
    assert_eq!(failed, 1);
    assert_eq!(total, 2);
    // Safe to re-send the whole batch thanks to idempotent upserts
    assert!(CinesyncError::Search(SearchError::BulkRejected { failed, total }).is_transient());
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/_bulk")
        .with_status(503)
        .with_body("cluster unavailable")
        .create_async()
        .await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    let err = client
        .bulk_upsert(SearchIndex::Movies, &[doc(Uuid::new_v4())])
        .await
        .unwrap_err();

    let CinesyncError::Search(SearchError::ServerError { status, .. }) = err else {
        panic!("expected ServerError, got {err}");
    };
    assert_eq!(status, 503);
}

#[tokio::test]
async fn test_loader_skips_empty_batches() {
    let mut server = Server::new_async().await;

    let bulk = server.mock("POST", "/_bulk").expect(0).create_async().await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    let loader = SearchLoader::new(client, vec![SearchIndex::Movies], fast_retry());
    loader.load(SearchIndex::Movies, &[]).await.unwrap();

    bulk.assert_async().await;
}

#[tokio::test]
async fn test_loader_refuses_unconfigured_index() {
    let mut server = Server::new_async().await;

    let bulk = server.mock("POST", "/_bulk").expect(0).create_async().await;

    let client = SearchClient::new(&es_config(&server.url())).unwrap();
    let loader = SearchLoader::new(client, vec![SearchIndex::Movies], fast_retry());

    // A logged no-op, not an error
    loader
        .load(SearchIndex::Genres, &[doc(Uuid::new_v4())])
        .await
        .unwrap();

    bulk.assert_async().await;
}

#[tokio::test]
async fn test_basic_auth_header_sent() {
    let mut server = Server::new_async().await;

    let head = server
        .mock("HEAD", "/movies")
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .with_status(200)
        .create_async()
        .await;

    let mut config = es_config(&server.url());
    config.username = Some("elastic".to_string());
    config.password = Some(cinesync::config::secret_from("changeme"));

    let client = SearchClient::new(&config).unwrap();
    assert!(client.has_index(SearchIndex::Movies).await.unwrap());

    head.assert_async().await;
}
