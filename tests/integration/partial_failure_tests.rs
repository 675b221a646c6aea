//! One bad record never sinks its batch

use crate::common::{ScriptedStep, TestPipeline, record, tenant, test_config};
use logflow::RecordErrorKind;
use logflow::core::models::RecordId;
use logflow::storage::{Buffer, RecordStore};
use std::sync::Arc;
use std::time::Duration;

async fn enqueue(fixture: &TestPipeline, texts: &[&str]) -> Vec<String> {
    let mut ids = Vec::new();
    for (i, text) in texts.iter().enumerate() {
        let message_id = fixture
            .buffer
            .send(&record("acme", &(i + 1).to_string(), text))
            .await
            .unwrap();
        ids.push(message_id);
    }
    ids
}

#[tokio::test(start_paused = true)]
async fn test_slow_record_times_out_alone() {
    let fixture = TestPipeline::new(test_config()).with_step(Arc::new(ScriptedStep));
    let ids = enqueue(&fixture, &["one", "two", "slow", "four", "five"]).await;

    let outcome = fixture.workers().run_once().await.unwrap().unwrap();

    assert_eq!(outcome.total(), 5);
    assert_eq!(outcome.succeeded(), 4);
    assert_eq!(outcome.batch_item_failures(), vec![ids[2].clone()]);
    assert_eq!(outcome.items[2].error_kind(), Some(RecordErrorKind::Timeout));

    for id in ["1", "2", "4", "5"] {
        let stored = fixture
            .store
            .get(&tenant("acme"), &RecordId::parse(id).unwrap())
            .await
            .unwrap();
        assert!(stored.is_some(), "record {} should be stored", id);
    }
    assert!(
        fixture
            .store
            .get(&tenant("acme"), &RecordId::parse("3").unwrap())
            .await
            .unwrap()
            .is_none()
    );

    // only the failed message is still held by the buffer
    assert_eq!(fixture.buffer.len(), 1);
    assert_eq!(fixture.buffer.in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_record_redelivered_after_visibility_timeout() {
    let fixture = TestPipeline::new(test_config()).with_step(Arc::new(ScriptedStep));
    let ids = enqueue(&fixture, &["one", "two", "slow", "four", "five"]).await;

    fixture.workers().run_once().await.unwrap();

    // hidden until the visibility timeout runs out
    assert!(fixture.buffer.receive(10).await.unwrap().is_empty());

    tokio::time::advance(Duration::from_secs(31)).await;
    let redelivered = fixture.buffer.receive(10).await.unwrap();
    assert_eq!(redelivered.len(), 1);
    assert_eq!(redelivered[0].message_id, ids[2]);
    assert_eq!(redelivered[0].receive_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_mixed_failure_kinds_in_one_batch() {
    let fixture = TestPipeline::new(test_config()).with_step(Arc::new(ScriptedStep));
    enqueue(&fixture, &["fail", "ok", "panic"]).await;
    fixture.buffer.send_raw("{not a record").unwrap();

    let outcome = fixture.workers().run_once().await.unwrap().unwrap();

    let kinds: Vec<_> = outcome.items.iter().map(|item| item.error_kind()).collect();
    assert_eq!(
        kinds,
        vec![
            Some(RecordErrorKind::Processing),
            None,
            Some(RecordErrorKind::Panic),
            Some(RecordErrorKind::Decode),
        ]
    );
    assert_eq!(fixture.store.len(), 1);
    assert_eq!(fixture.pipeline.stats().snapshot().records_failed, 3);
}

#[tokio::test(start_paused = true)]
async fn test_batch_deadline_fails_unfinished_records() {
    let mut config = test_config();
    config.pipeline.worker.record_timeout_ms = 10_000;
    config.pipeline.worker.batch_timeout_ms = 2_000;
    let fixture = TestPipeline::new(config).with_step(Arc::new(ScriptedStep));
    enqueue(&fixture, &["slow", "fast"]).await;

    let outcome = fixture.workers().run_once().await.unwrap().unwrap();

    assert_eq!(outcome.succeeded(), 1);
    assert_eq!(
        outcome.items[0].error_kind(),
        Some(RecordErrorKind::DeadlineExceeded)
    );
    assert!(outcome.items[1].is_success());
}
