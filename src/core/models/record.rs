//! Canonical log record and its identifiers

use crate::core::normalizer::NormalizationError;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Longest tenant identifier accepted, in bytes
pub const MAX_TENANT_ID_LEN: usize = 128;
/// Longest record identifier accepted, in bytes
pub const MAX_RECORD_ID_LEN: usize = 1024;

/// Tenant identifier, the isolation boundary and partition key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Parse a tenant identifier, trimming surrounding whitespace
    pub fn parse(value: &str) -> std::result::Result<Self, NormalizationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(NormalizationError::MissingTenant);
        }
        if trimmed.len() > MAX_TENANT_ID_LEN {
            return Err(NormalizationError::InvalidTenant(format!(
                "tenant id exceeds {} bytes",
                MAX_TENANT_ID_LEN
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(NormalizationError::InvalidTenant(
                "tenant id contains control characters".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = NormalizationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record identifier, unique per tenant and the store's sort key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Parse a client-supplied identifier. The value is kept verbatim.
    pub fn parse(value: &str) -> std::result::Result<Self, NormalizationError> {
        if value.is_empty() {
            return Err(NormalizationError::InvalidRecordId(
                "record id must not be empty".to_string(),
            ));
        }
        if value.len() > MAX_RECORD_ID_LEN {
            return Err(NormalizationError::InvalidRecordId(format!(
                "record id exceeds {} bytes",
                MAX_RECORD_ID_LEN
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Generate a fresh random identifier (UUIDv4).
    ///
    /// Not deterministic: a request redelivered by the client without its own
    /// id becomes a new record.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = NormalizationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store uniqueness key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub tenant_id: TenantId,
    pub record_id: RecordId,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.record_id)
    }
}

/// How the payload was submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// JSON key-value mapping
    Structured,
    /// Raw text
    Unstructured,
}

impl ContentType {
    /// Provenance label stored alongside each item
    pub fn source_label(&self) -> &'static str {
        match self {
            ContentType::Structured => "json_upload",
            ContentType::Unstructured => "text_upload",
        }
    }
}

/// Original request content, kept without destructive transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Structured(serde_json::Map<String, serde_json::Value>),
    Text(String),
}

impl Payload {
    pub fn content_type(&self) -> ContentType {
        match self {
            Payload::Structured(_) => ContentType::Structured,
            Payload::Text(_) => ContentType::Unstructured,
        }
    }

    /// The human-readable text of the payload: the `text` field of a
    /// structured payload, or the whole body of an unstructured one.
    pub fn text(&self) -> &str {
        match self {
            Payload::Structured(fields) => fields
                .get("text")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default(),
            Payload::Text(text) => text,
        }
    }

    /// Look up a field of a structured payload
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        match self {
            Payload::Structured(fields) => fields.get(name),
            Payload::Text(_) => None,
        }
    }
}

/// The unit flowing through the whole pipeline.
///
/// Fields are private: once a record has been normalized it is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLogRecord {
    tenant_id: TenantId,
    record_id: RecordId,
    payload: Payload,
    received_at: DateTime<Utc>,
    content_type: ContentType,
}

impl CanonicalLogRecord {
    pub fn new(
        tenant_id: TenantId,
        record_id: RecordId,
        payload: Payload,
        received_at: DateTime<Utc>,
    ) -> Self {
        let content_type = payload.content_type();
        Self {
            tenant_id,
            record_id,
            payload,
            received_at,
            content_type,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn source(&self) -> &'static str {
        self.content_type.source_label()
    }

    pub fn original_text(&self) -> &str {
        self.payload.text()
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            tenant_id: self.tenant_id.clone(),
            record_id: self.record_id.clone(),
        }
    }

    /// Encode the record as a buffer message body
    pub fn to_message_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a buffer message body
    pub fn from_message_body(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}
