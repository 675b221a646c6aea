//! Processing steps and stores with scripted behaviour

use async_trait::async_trait;
use logflow::core::models::{CanonicalLogRecord, RecordId, StoredItem, TenantId};
use logflow::core::processing::ProcessingStep;
use logflow::storage::{MemoryStore, RecordStore};
use logflow::{PipelineError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Step driven by the record text:
/// `slow` sleeps for an hour, `fail` errors, `panic` panics, anything else
/// succeeds at once
#[derive(Debug, Default)]
pub struct ScriptedStep;

#[async_trait]
impl ProcessingStep for ScriptedStep {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn process(&self, record: &CanonicalLogRecord) -> Result<Map<String, Value>> {
        match record.original_text() {
            "slow" => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Map::new())
            }
            "fail" => Err(PipelineError::processing("scripted failure")),
            "panic" => panic!("scripted panic"),
            text => {
                let mut derived = Map::new();
                derived.insert("length".to_string(), Value::from(text.len()));
                Ok(derived)
            }
        }
    }
}

/// Store that fails the first `failures` writes, then delegates
#[derive(Debug)]
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn put(&self, item: &StoredItem) -> Result<()> {
        let remaining = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if remaining.is_ok() {
            return Err(PipelineError::store("throttled"));
        }
        self.inner.put(item).await
    }

    async fn get(&self, tenant_id: &TenantId, record_id: &RecordId) -> Result<Option<StoredItem>> {
        self.inner.get(tenant_id, record_id).await
    }

    async fn query_tenant(&self, tenant_id: &TenantId) -> Result<Vec<StoredItem>> {
        self.inner.query_tenant(tenant_id).await
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
