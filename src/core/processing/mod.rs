//! Per-record processing step
//!
//! A step derives extra fields from a record. It must be a pure function of
//! the record apart from time spent, so redelivered records converge to the
//! same stored item.

use crate::config::ProcessingConfig;
use crate::core::models::CanonicalLogRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

/// Marker appended to the redacted prefix
pub const REDACTION_MARKER: &str = "... [REDACTED]";

/// Work applied to every record before it is stored
#[async_trait]
pub trait ProcessingStep: Send + Sync {
    /// Step name for logs
    fn name(&self) -> &'static str;

    /// Produce the derived fields of `record`
    async fn process(&self, record: &CanonicalLogRecord) -> Result<Map<String, Value>>;
}

/// Simulated workload: sleeps in proportion to the text length, then emits a
/// redacted copy of the text as `modified_data`
#[derive(Debug, Clone, Default)]
pub struct SimulatedWorkStep {
    config: ProcessingConfig,
}

impl SimulatedWorkStep {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Keep the leading characters of `text` and mark the rest as redacted
    pub fn redact(&self, text: &str) -> String {
        let prefix: String = text.chars().take(self.config.redaction_prefix_chars).collect();
        format!("{}{}", prefix, REDACTION_MARKER)
    }
}

#[async_trait]
impl ProcessingStep for SimulatedWorkStep {
    fn name(&self) -> &'static str {
        "simulated_work"
    }

    async fn process(&self, record: &CanonicalLogRecord) -> Result<Map<String, Value>> {
        let text = record.original_text();
        let delay = self.config.delay_for(text.chars().count());
        debug!(
            tenant_id = %record.tenant_id(),
            record_id = %record.record_id(),
            delay_ms = delay.as_millis() as u64,
            "Simulating work"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut derived = Map::new();
        derived.insert("modified_data".to_string(), Value::String(self.redact(text)));
        Ok(derived)
    }
}
