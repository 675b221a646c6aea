//! Normalization errors

use thiserror::Error;

/// Why an inbound request could not become a canonical record.
///
/// Always client-visible; a request that fails normalization never reaches
/// the buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Content-Type header is required")]
    MissingContentType,

    #[error("unsupported content type '{0}', expected application/json or text/plain")]
    UnsupportedContentType(String),

    #[error("tenant id is required in the body field 'tenant_id' or the tenant header")]
    MissingTenant,

    #[error("invalid tenant id: {0}")]
    InvalidTenant(String),

    #[error("tenant id '{body}' in the body conflicts with '{header}' in the header")]
    ConflictingTenant { body: String, header: String },

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("JSON body must be an object")]
    NotAnObject,

    #[error("body is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("invalid record id: {0}")]
    InvalidRecordId(String),
}

impl NormalizationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            NormalizationError::MissingContentType => "MISSING_CONTENT_TYPE",
            NormalizationError::UnsupportedContentType(_) => "UNSUPPORTED_CONTENT_TYPE",
            NormalizationError::MissingTenant => "MISSING_TENANT",
            NormalizationError::InvalidTenant(_) => "INVALID_TENANT",
            NormalizationError::ConflictingTenant { .. } => "CONFLICTING_TENANT",
            NormalizationError::InvalidJson(_) => "INVALID_JSON",
            NormalizationError::NotAnObject => "INVALID_JSON",
            NormalizationError::InvalidEncoding(_) => "INVALID_ENCODING",
            NormalizationError::InvalidRecordId(_) => "INVALID_RECORD_ID",
        }
    }
}
