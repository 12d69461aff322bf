//! Tests for the store module

use super::*;
use crate::config::{RateLimitSettings, StoreSettings};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: String) -> StoreSettings {
    StoreSettings {
        base_url,
        page_size: 2,
        http: crate::config::HttpSettings::default(),
        rate_limit: RateLimitSettings {
            enabled: false,
            ..RateLimitSettings::default()
        },
    }
}

// ============================================================================
// HttpStore
// ============================================================================

#[tokio::test]
async fn test_http_store_scan_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records/session"))
        .and(query_param("exported", "false"))
        .and(query_param("shard", "1"))
        .and(query_param("shard_count", "4"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "s-1"}, {"id": "s-2"}],
            "next_cursor": "s-2"
        })))
        .mount(&server)
        .await;

    let store = HttpStore::new(&settings(server.uri()));
    let page = store
        .scan_page(RecordKind::Session, Shard::new(1, 4), None)
        .await
        .unwrap();

    assert_eq!(page.records.len(), 2);
    assert_eq!(page.next_cursor.as_deref(), Some("s-2"));
}

#[tokio::test]
async fn test_http_store_scan_passes_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records/event"))
        .and(query_param("cursor", "e-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [],
            "next_cursor": null
        })))
        .mount(&server)
        .await;

    let store = HttpStore::new(&settings(server.uri()));
    let page = store
        .scan_page(RecordKind::Event, Shard::new(0, 1), Some("e-5".to_string()))
        .await
        .unwrap();

    assert!(page.records.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_http_store_scan_error_names_kind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records/scene"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad shard"))
        .mount(&server)
        .await;

    let store = HttpStore::new(&settings(server.uri()));
    let err = store
        .scan_page(RecordKind::Scene, Shard::new(0, 1), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("scene"));
    assert!(err.to_string().contains("bad shard"));
}

#[tokio::test]
async fn test_http_store_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/records/session/delete"))
        .and(body_json(json!({"keys": ["s-1", "s-2"]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpStore::new(&settings(server.uri()));
    store
        .delete(
            RecordKind::Session,
            &["s-1".to_string(), "s-2".to_string()],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_http_store_delete_empty_keys_skips_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = HttpStore::new(&settings(server.uri()));
    store.delete(RecordKind::Scene, &[]).await.unwrap();
}

// ============================================================================
// MemoryStore
// ============================================================================

#[tokio::test]
async fn test_memory_store_insert_and_scan() {
    let store = MemoryStore::new();
    store
        .insert(RecordKind::Session, json!({"id": "s-1", "platform": "a"}))
        .await
        .unwrap();
    store
        .insert(RecordKind::Session, json!({"id": "s-2", "platform": "b"}))
        .await
        .unwrap();

    let page = store
        .scan_page(RecordKind::Session, Shard::new(0, 1), None)
        .await
        .unwrap();
    assert_eq!(page.records.len(), 2);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_memory_store_insert_requires_id() {
    let store = MemoryStore::new();
    let err = store
        .insert(RecordKind::Event, json!({"name": "no-id"}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("without id"));
}

#[tokio::test]
async fn test_memory_store_shard_union_is_complete() {
    let store = MemoryStore::new();
    for i in 0..50 {
        store
            .insert(RecordKind::Event, json!({"id": format!("e-{i:03}")}))
            .await
            .unwrap();
    }

    let shard_count = 4;
    let mut seen = Vec::new();
    for index in 0..shard_count {
        let mut cursor = None;
        loop {
            let page = store
                .scan_page(RecordKind::Event, Shard::new(index, shard_count), cursor)
                .await
                .unwrap();
            seen.extend(
                page.records
                    .iter()
                    .map(|r| r["id"].as_str().unwrap().to_string()),
            );
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 50, "shards must partition without overlap");
}

#[tokio::test]
async fn test_memory_store_pagination() {
    let store = MemoryStore::with_page_size(3);
    for i in 0..7 {
        store
            .insert(RecordKind::Scene, json!({"id": format!("sc-{i}"), "sessionId": "s"}))
            .await
            .unwrap();
    }

    let first = store
        .scan_page(RecordKind::Scene, Shard::new(0, 1), None)
        .await
        .unwrap();
    assert_eq!(first.records.len(), 3);
    assert!(first.next_cursor.is_some());

    let second = store
        .scan_page(RecordKind::Scene, Shard::new(0, 1), first.next_cursor)
        .await
        .unwrap();
    assert_eq!(second.records.len(), 3);

    let third = store
        .scan_page(RecordKind::Scene, Shard::new(0, 1), second.next_cursor)
        .await
        .unwrap();
    assert_eq!(third.records.len(), 1);
    assert!(third.next_cursor.is_none());
}

#[tokio::test]
async fn test_memory_store_delete_accounting() {
    let store = MemoryStore::new();
    store
        .insert(RecordKind::Session, json!({"id": "s-1"}))
        .await
        .unwrap();
    assert_eq!(store.delete_calls(), 0);

    store
        .delete(RecordKind::Session, &["s-1".to_string()])
        .await
        .unwrap();
    assert_eq!(store.delete_calls(), 1);
    assert!(!store.contains(RecordKind::Session, "s-1").await);
    assert_eq!(store.len(RecordKind::Session).await, 0);
}
