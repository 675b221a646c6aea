//! Redelivered records converge to the same stored item

use crate::common::{FlakyStore, TestPipeline, record, tenant, test_config};
use logflow::RecordErrorKind;
use logflow::core::models::RecordId;
use logflow::storage::{Buffer, MemoryStore, RecordStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_duplicate_delivery_overwrites_with_identical_item() {
    let fixture = TestPipeline::new(test_config());
    let event = record("acme", "101", "User login event");
    fixture.buffer.send(&event).await.unwrap();
    fixture.buffer.send(&event).await.unwrap();

    let outcome = fixture.workers().run_once().await.unwrap().unwrap();
    assert_eq!(outcome.succeeded(), 2);

    assert_eq!(fixture.store.len(), 1);
    assert_eq!(fixture.store.write_count(), 2);
    let stored = fixture
        .store
        .get(&tenant("acme"), &RecordId::parse("101").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.received_at, event.received_at());
}

#[tokio::test(start_paused = true)]
async fn test_store_failures_retried_until_written() {
    let store = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyStore::new(store.clone(), 2));
    let fixture = TestPipeline::build(test_config(), store, flaky);
    fixture
        .buffer
        .send(&record("acme", "9", "throttled write"))
        .await
        .unwrap();
    let workers = fixture.workers();

    for _ in 0..2 {
        let outcome = workers.run_once().await.unwrap().unwrap();
        assert_eq!(outcome.items[0].error_kind(), Some(RecordErrorKind::Store));
        tokio::time::advance(Duration::from_secs(31)).await;
    }

    let outcome = workers.run_once().await.unwrap().unwrap();
    assert!(outcome.items[0].is_success());
    assert_eq!(outcome.items[0].message.receive_count, 3);
    assert!(fixture.buffer.is_empty());
    assert!(fixture.buffer.dead_letters().is_empty());

    let stored = fixture
        .store
        .get(&tenant("acme"), &RecordId::parse("9").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.original_text, "throttled write");
}

#[tokio::test(start_paused = true)]
async fn test_reprocessing_produces_identical_item() {
    let fixture = TestPipeline::new(test_config());
    let event = record("acme", "5", "disk usage at 91 percent");
    fixture.buffer.send(&event).await.unwrap();

    let processor = fixture.pipeline.processor();
    let messages = fixture.buffer.receive(1).await.unwrap();

    processor.process_batch(messages.clone()).await;
    let key = (tenant("acme"), RecordId::parse("5").unwrap());
    let first = fixture.store.get(&key.0, &key.1).await.unwrap().unwrap();

    processor.process_batch(messages).await;
    let second = fixture.store.get(&key.0, &key.1).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(fixture.store.write_count(), 2);
}
