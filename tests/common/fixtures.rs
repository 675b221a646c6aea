//! Test fixtures and data factories
//!
//! Every fixture builds real components over the in-memory backends.

use chrono::Utc;
use logflow::config::Config;
use logflow::core::models::{CanonicalLogRecord, Payload, RecordId, TenantId};
use logflow::core::processing::ProcessingStep;
use logflow::storage::{MemoryBuffer, MemoryStore, RecordStore, StorageLayer};
use logflow::{Pipeline, WorkerPool};
use std::sync::Arc;

/// Configuration with instant processing and short, test-sized budgets
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.pipeline.processing.per_char_delay_ms = 0;
    config.pipeline.buffer.visibility_timeout_secs = 30;
    config.pipeline.buffer.max_receive_count = 3;
    config.pipeline.worker.record_timeout_ms = 1_000;
    config.pipeline.worker.batch_timeout_ms = 5_000;
    config
}

pub fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).unwrap()
}

/// Unstructured record with an explicit id
pub fn record(tenant_id: &str, record_id: &str, text: &str) -> CanonicalLogRecord {
    CanonicalLogRecord::new(
        tenant(tenant_id),
        RecordId::parse(record_id).unwrap(),
        Payload::Text(text.to_string()),
        Utc::now(),
    )
}

/// Pipeline plus typed handles on its in-memory backends
pub struct TestPipeline {
    pub pipeline: Pipeline,
    pub buffer: Arc<MemoryBuffer>,
    pub store: Arc<MemoryStore>,
}

impl TestPipeline {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: Config, store: Arc<MemoryStore>) -> Self {
        Self::build(config, store.clone(), store)
    }

    /// Pipeline writing through `store_override`, with `store` kept for
    /// inspection
    pub fn build(
        config: Config,
        store: Arc<MemoryStore>,
        store_override: Arc<dyn RecordStore>,
    ) -> Self {
        let buffer = Arc::new(MemoryBuffer::new(config.buffer()));
        let storage = StorageLayer::from_parts(buffer.clone(), store_override);
        Self {
            pipeline: Pipeline::with_storage(config, storage),
            buffer,
            store,
        }
    }

    pub fn with_step(mut self, step: Arc<dyn ProcessingStep>) -> Self {
        self.pipeline = self.pipeline.with_step(step);
        self
    }

    pub fn workers(&self) -> WorkerPool {
        self.pipeline.worker_pool()
    }
}
