//! Item persisted in the record store

use super::record::{CanonicalLogRecord, ContentType, Payload, RecordId, RecordKey, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store item keyed by `(tenant_id, record_id)`.
///
/// Built only from the record and the processing step's derived fields, so
/// processing the same record again produces an identical item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub tenant_id: TenantId,
    pub record_id: RecordId,
    pub source: String,
    pub content_type: ContentType,
    pub received_at: DateTime<Utc>,
    pub payload: Payload,
    pub original_text: String,
    #[serde(default)]
    pub derived: Map<String, Value>,
}

impl StoredItem {
    pub fn from_record(record: &CanonicalLogRecord, derived: Map<String, Value>) -> Self {
        Self {
            tenant_id: record.tenant_id().clone(),
            record_id: record.record_id().clone(),
            source: record.source().to_string(),
            content_type: record.content_type(),
            received_at: record.received_at(),
            payload: record.payload().clone(),
            original_text: record.original_text().to_string(),
            derived,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            tenant_id: self.tenant_id.clone(),
            record_id: self.record_id.clone(),
        }
    }

    /// Flat attribute view of the item, the way a keyed table exposes it.
    ///
    /// Structured payload fields come first, derived fields override them and
    /// the identifying attributes override both.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();

        match &self.payload {
            Payload::Structured(fields) => {
                attributes.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Payload::Text(text) => {
                attributes.insert("payload".to_string(), Value::String(text.clone()));
            }
        }
        attributes.extend(self.derived.iter().map(|(k, v)| (k.clone(), v.clone())));

        attributes.insert("tenant_id".to_string(), self.tenant_id.as_str().into());
        attributes.insert("record_id".to_string(), self.record_id.as_str().into());
        attributes.insert("source".to_string(), self.source.clone().into());
        attributes.insert(
            "received_at".to_string(),
            self.received_at.to_rfc3339().into(),
        );
        attributes.insert(
            "original_text".to_string(),
            self.original_text.clone().into(),
        );
        attributes
    }

    /// Look up a single attribute of the flat view
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes().remove(name)
    }
}
