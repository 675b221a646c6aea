//! Tests for the in-process record store

use super::*;
use crate::core::models::{CanonicalLogRecord, Payload};
use chrono::Utc;
use serde_json::{Map, json};

fn item(tenant: &str, id: &str, text: &str) -> StoredItem {
    let record = CanonicalLogRecord::new(
        TenantId::parse(tenant).unwrap(),
        RecordId::parse(id).unwrap(),
        Payload::Structured(json!({ "text": text }).as_object().unwrap().clone()),
        Utc::now(),
    );
    StoredItem::from_record(&record, Map::new())
}

fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).unwrap()
}

#[tokio::test]
async fn test_put_and_get() {
    let store = MemoryStore::new();
    store.put(&item("acme", "101", "User login event")).await.unwrap();

    let stored = store
        .get(&tenant("acme"), &RecordId::parse("101").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.attribute("text"), Some(json!("User login event")));
    assert!(
        store
            .get(&tenant("acme"), &RecordId::parse("102").unwrap())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_put_is_idempotent() {
    let store = MemoryStore::new();
    let item = item("acme", "1", "hello");

    store.put(&item).await.unwrap();
    let once = store.query_tenant(&tenant("acme")).await.unwrap();
    store.put(&item).await.unwrap();
    let twice = store.query_tenant(&tenant("acme")).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(store.len(), 1);
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn test_same_record_id_in_different_tenants() {
    let store = MemoryStore::new();
    store.put(&item("acme", "1", "acme event")).await.unwrap();
    store.put(&item("globex", "1", "globex event")).await.unwrap();

    assert_eq!(store.len(), 2);
    let acme = store.query_tenant(&tenant("acme")).await.unwrap();
    assert_eq!(acme.len(), 1);
    assert_eq!(acme[0].original_text, "acme event");
    assert_eq!(store.tenants(), vec![tenant("acme"), tenant("globex")]);
}

#[tokio::test]
async fn test_query_tenant_is_sorted_and_isolated() {
    let store = MemoryStore::new();
    for id in ["c", "a", "b"] {
        store.put(&item("acme", id, id)).await.unwrap();
    }
    store.put(&item("initech", "z", "z")).await.unwrap();

    let ids: Vec<String> = store
        .query_tenant(&tenant("acme"))
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.record_id.to_string())
        .collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert!(store.query_tenant(&tenant("unknown")).await.unwrap().is_empty());
}
