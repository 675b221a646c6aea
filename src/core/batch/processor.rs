//! Batch processor: decode, process and store each message independently

use super::async_batch::{AsyncBatchConfig, AsyncBatchExecutor};
use super::types::{BatchOutcome, ItemOutcome, RecordError};
use crate::config::WorkerConfig;
use crate::core::models::{BufferMessage, CanonicalLogRecord, RecordKey, StoredItem};
use crate::core::processing::ProcessingStep;
use crate::storage::RecordStore;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

/// Runs one batch of buffered messages to completion
#[derive(Clone)]
pub struct BatchProcessor {
    store: Arc<dyn RecordStore>,
    step: Arc<dyn ProcessingStep>,
    executor: AsyncBatchExecutor,
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("store", &self.store.name())
            .field("step", &self.step.name())
            .field("executor", &self.executor)
            .finish()
    }
}

impl BatchProcessor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        step: Arc<dyn ProcessingStep>,
        config: &WorkerConfig,
    ) -> Self {
        let executor_config = AsyncBatchConfig::new()
            .with_concurrency(config.record_concurrency)
            .with_timeout(config.record_timeout())
            .with_batch_timeout(config.batch_timeout());
        Self::with_executor_config(store, step, executor_config)
    }

    pub fn with_executor_config(
        store: Arc<dyn RecordStore>,
        step: Arc<dyn ProcessingStep>,
        config: AsyncBatchConfig,
    ) -> Self {
        Self {
            store,
            step,
            executor: AsyncBatchExecutor::new(config),
        }
    }

    /// Process every message and report each one's outcome.
    ///
    /// Never fails as a whole: undecodable bodies, step errors, store errors,
    /// timeouts and panics all become failures of the message concerned.
    pub async fn process_batch(&self, messages: Vec<BufferMessage>) -> BatchOutcome {
        let start = Instant::now();
        if messages.is_empty() {
            return BatchOutcome::default();
        }

        let decoded: Vec<Result<CanonicalLogRecord, RecordError>> = messages
            .iter()
            .map(|message| {
                CanonicalLogRecord::from_message_body(&message.body)
                    .map_err(|e| RecordError::decode(e.to_string()))
            })
            .collect();
        let keys: Vec<Option<RecordKey>> = decoded
            .iter()
            .map(|record| record.as_ref().ok().map(CanonicalLogRecord::key))
            .collect();

        let items = messages.iter().cloned().zip(decoded);
        let store = self.store.clone();
        let step = self.step.clone();

        let results = self
            .executor
            .execute(items, move |(message, record)| {
                let store = store.clone();
                let step = step.clone();
                async move {
                    let record = record?;
                    let span = info_span!(
                        "record",
                        message_id = %message.message_id,
                        receive_count = message.receive_count,
                        tenant_id = %record.tenant_id(),
                        record_id = %record.record_id(),
                    );
                    process_record(store, step, record).instrument(span).await
                }
            })
            .await;

        let items: Vec<ItemOutcome> = messages
            .into_iter()
            .zip(keys)
            .zip(results)
            .map(|((message, key), result)| {
                if let Err(e) = &result.result {
                    warn!(
                        message_id = %message.message_id,
                        receive_count = message.receive_count,
                        error_kind = %e.kind,
                        "Record failed: {}",
                        e.message
                    );
                }
                ItemOutcome {
                    message,
                    key,
                    result: result.result,
                    duration: result.duration,
                }
            })
            .collect();

        let outcome = BatchOutcome {
            items,
            duration: start.elapsed(),
        };
        info!(
            total = outcome.total(),
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            duration_ms = outcome.duration.as_millis() as u64,
            "Batch processed"
        );
        outcome
    }
}

async fn process_record(
    store: Arc<dyn RecordStore>,
    step: Arc<dyn ProcessingStep>,
    record: CanonicalLogRecord,
) -> Result<(), RecordError> {
    let start = Instant::now();

    let derived = step
        .process(&record)
        .await
        .map_err(|e| RecordError::processing(e.to_string()))?;
    let item = StoredItem::from_record(&record, derived);

    store
        .put(&item)
        .await
        .map_err(|e| RecordError::store(e.to_string()))?;

    debug!(
        duration_ms = start.elapsed().as_millis() as u64,
        "Record stored"
    );
    Ok(())
}
