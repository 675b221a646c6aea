//! Poison messages end up in the dead-letter queue

use crate::common::{ScriptedStep, TestPipeline, record, test_config};
use logflow::storage::Buffer;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_poison_record_dead_lettered_after_max_receives() {
    let fixture = TestPipeline::new(test_config()).with_step(Arc::new(ScriptedStep));
    let poison = fixture
        .buffer
        .send(&record("acme", "13", "fail"))
        .await
        .unwrap();
    let workers = fixture.workers();

    for attempt in 1..=3 {
        let outcome = workers.run_once().await.unwrap().unwrap();
        assert_eq!(outcome.batch_item_failures(), vec![poison.clone()]);
        assert_eq!(outcome.items[0].message.receive_count, attempt);
        tokio::time::advance(Duration::from_secs(31)).await;
    }

    // the next receive moves it aside instead of delivering it
    assert!(workers.run_once().await.unwrap().is_none());
    let dead = fixture.buffer.dead_letters();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].message_id, poison);
    assert_eq!(dead[0].receive_count, 3);
    assert!(fixture.buffer.is_empty());
    assert!(fixture.store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_healthy_records_unaffected_by_poison_neighbour() {
    let fixture = TestPipeline::new(test_config()).with_step(Arc::new(ScriptedStep));
    fixture.buffer.send_raw("garbage").unwrap();
    for id in ["1", "2"] {
        fixture
            .buffer
            .send(&record("acme", id, "fine"))
            .await
            .unwrap();
    }
    let workers = fixture.workers();

    let first = workers.run_once().await.unwrap().unwrap();
    assert_eq!(first.succeeded(), 2);

    for _ in 0..3 {
        tokio::time::advance(Duration::from_secs(31)).await;
        workers.run_once().await.unwrap();
    }

    assert_eq!(fixture.buffer.dead_letters().len(), 1);
    assert_eq!(fixture.buffer.dead_letters()[0].body, "garbage");
    assert_eq!(fixture.store.len(), 2);
    // stored items were written exactly once
    assert_eq!(fixture.store.write_count(), 2);
}
