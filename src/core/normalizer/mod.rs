//! Request normalization
//!
//! Converts an inbound request into a [`CanonicalLogRecord`]. Pure and
//! synchronous: given the same input it yields the same record, apart from
//! generated record ids and the `received_at` timestamp.

mod error;
mod request;

pub use error::NormalizationError;
pub use request::RawRequest;

use crate::core::models::{CanonicalLogRecord, ContentType, Payload, RecordId, TenantId};
use chrono::Utc;
use serde_json::{Map, Value};

/// Default header carrying the tenant for unstructured payloads
pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";
/// Body field carrying the tenant for structured payloads
pub const TENANT_FIELD: &str = "tenant_id";
/// Body fields resolving to the record id, in order of preference
pub const RECORD_ID_FIELDS: [&str; 2] = ["log_id", "record_id"];

type NormalizeResult<T> = std::result::Result<T, NormalizationError>;

/// Request normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    tenant_header: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TENANT_HEADER)
    }
}

impl Normalizer {
    pub fn new(tenant_header: impl Into<String>) -> Self {
        Self {
            tenant_header: tenant_header.into(),
        }
    }

    pub fn tenant_header(&self) -> &str {
        &self.tenant_header
    }

    /// Normalize an inbound request into a canonical record
    pub fn normalize(&self, raw: &RawRequest) -> NormalizeResult<CanonicalLogRecord> {
        let content_type = classify_content_type(raw.content_type())?;
        let header_tenant = raw.header(&self.tenant_header);

        let (tenant_id, record_id, payload) = match content_type {
            ContentType::Structured => normalize_structured(raw.body(), header_tenant)?,
            ContentType::Unstructured => normalize_text(raw.body(), header_tenant)?,
        };

        Ok(CanonicalLogRecord::new(
            tenant_id,
            record_id,
            payload,
            Utc::now(),
        ))
    }
}

/// Normalize with the default tenant header
pub fn normalize(raw: &RawRequest) -> NormalizeResult<CanonicalLogRecord> {
    Normalizer::default().normalize(raw)
}

/// Map a Content-Type header value onto a content type, ignoring parameters
pub fn classify_content_type(value: Option<&str>) -> NormalizeResult<ContentType> {
    let value = value.ok_or(NormalizationError::MissingContentType)?;
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "" => Err(NormalizationError::MissingContentType),
        "application/json" => Ok(ContentType::Structured),
        "text/plain" => Ok(ContentType::Unstructured),
        _ => Err(NormalizationError::UnsupportedContentType(essence)),
    }
}

fn normalize_structured(
    body: &[u8],
    header_tenant: Option<&str>,
) -> NormalizeResult<(TenantId, RecordId, Payload)> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| NormalizationError::InvalidJson(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(NormalizationError::NotAnObject);
    };

    let body_tenant = match fields.remove(TENANT_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(tenant)) => Some(tenant),
        Some(_) => {
            return Err(NormalizationError::InvalidTenant(
                "tenant_id must be a string".to_string(),
            ));
        }
    };

    let tenant_id = resolve_tenant(body_tenant.as_deref(), header_tenant)?;
    let record_id = take_record_id(&mut fields)?;

    Ok((tenant_id, record_id, Payload::Structured(fields)))
}

fn normalize_text(
    body: &[u8],
    header_tenant: Option<&str>,
) -> NormalizeResult<(TenantId, RecordId, Payload)> {
    let text = std::str::from_utf8(body)
        .map_err(|e| NormalizationError::InvalidEncoding(e.to_string()))?;
    let tenant_id = resolve_tenant(None, header_tenant)?;

    Ok((
        tenant_id,
        RecordId::generate(),
        Payload::Text(text.to_string()),
    ))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Body field first, header as fallback; both present must agree
fn resolve_tenant(body: Option<&str>, header: Option<&str>) -> NormalizeResult<TenantId> {
    let body = non_blank(body).map(TenantId::parse).transpose()?;
    let header = non_blank(header).map(TenantId::parse).transpose()?;

    match (body, header) {
        (Some(body), Some(header)) if body != header => {
            Err(NormalizationError::ConflictingTenant {
                body: body.into(),
                header: header.into(),
            })
        }
        (Some(tenant), _) | (None, Some(tenant)) => Ok(tenant),
        (None, None) => Err(NormalizationError::MissingTenant),
    }
}

fn take_record_id(fields: &mut Map<String, Value>) -> NormalizeResult<RecordId> {
    // A null identifier field counts as absent
    fields.retain(|name, value| !(value.is_null() && RECORD_ID_FIELDS.contains(&name.as_str())));

    let Some(field) = RECORD_ID_FIELDS
        .iter()
        .find(|name| fields.contains_key(**name))
    else {
        return Ok(RecordId::generate());
    };

    match fields.remove(*field) {
        None | Some(Value::Null) => Ok(RecordId::generate()),
        Some(Value::String(id)) => RecordId::parse(&id),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => RecordId::parse(&n.to_string()),
        Some(other) => Err(NormalizationError::InvalidRecordId(format!(
            "{} must be a string or an integer, got {}",
            field, other
        ))),
    }
}
