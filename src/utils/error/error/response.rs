//! HTTP response handling for errors

use super::types::PipelineError;
use crate::core::normalizer::NormalizationError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Seconds a client is asked to wait before retrying a transient failure
const RETRY_AFTER_SECS: u64 = 1;

impl PipelineError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            PipelineError::Normalization(err) => match err {
                NormalizationError::MissingContentType
                | NormalizationError::UnsupportedContentType(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, err.code())
                }
                _ => (StatusCode::BAD_REQUEST, err.code()),
            },
            PipelineError::Buffer(_) => (StatusCode::SERVICE_UNAVAILABLE, "BUFFER_UNAVAILABLE"),
            PipelineError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            PipelineError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT"),
            PipelineError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PipelineError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            PipelineError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
            }
            PipelineError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        self.error_response_for(None)
    }
}

impl PipelineError {
    /// Build the JSON error response, tagged with the request it answers
    pub fn error_response_for(&self, request_id: Option<String>) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();

        // Internal details stay in the logs
        let message = if status_code.is_server_error() && !self.is_retryable() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
                request_id,
            },
        };

        let mut builder = HttpResponse::build(status_code);
        if self.is_retryable() {
            builder.insert_header(("Retry-After", RETRY_AFTER_SECS.to_string()));
        }
        builder.json(error_response)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
}
