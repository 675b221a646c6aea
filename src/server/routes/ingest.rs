//! Log ingestion endpoint

use crate::core::models::CanonicalLogRecord;
use crate::core::normalizer::RawRequest;
use crate::server::middleware::RequestId;
use crate::server::state::AppState;
use crate::utils::error::{PipelineError, Result};
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::{HttpRequest, HttpResponse, web};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Configure ingestion routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ingest", web::post().to(ingest));
}

/// Body of a `202 Accepted` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAccepted {
    pub status: String,
    pub id: String,
}

/// Accept one log event.
///
/// Replies as soon as the record is buffered; processing happens later.
pub async fn ingest(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let request_id = RequestId::of(&req);

    match accept(&req, payload, &state).await {
        Ok(record) => HttpResponse::Accepted().json(IngestAccepted {
            status: "accepted".to_string(),
            id: record.record_id().to_string(),
        }),
        Err(e) => e.error_response_for(request_id),
    }
}

async fn accept(
    req: &HttpRequest,
    payload: web::Payload,
    state: &AppState,
) -> Result<CanonicalLogRecord> {
    let body = read_body(req, payload, state.config.server().max_body_size).await?;

    let mut raw = RawRequest::new(body);
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            raw.insert_header(name.as_str(), value);
        }
    }

    let record = state.normalizer.normalize(&raw).map_err(|e| {
        state.stats.record_rejected();
        info!(code = e.code(), "Rejected request: {}", e);
        e
    })?;

    let message_id = state.buffer.send(&record).await.map_err(|e| match e {
        // Retrying cannot shrink the record
        PipelineError::PayloadTooLarge(_) => {
            state.stats.record_rejected();
            info!(
                tenant_id = %record.tenant_id(),
                record_id = %record.record_id(),
                "Rejected record: {}",
                e
            );
            e
        }
        e => {
            state.stats.record_enqueue_failure();
            error!(
                tenant_id = %record.tenant_id(),
                record_id = %record.record_id(),
                "Failed to buffer record: {}",
                e
            );
            match e {
                PipelineError::Buffer(_) => e,
                other => PipelineError::buffer(other.to_string()),
            }
        }
    })?;

    state.stats.record_accepted();
    info!(
        tenant_id = %record.tenant_id(),
        record_id = %record.record_id(),
        message_id = %message_id,
        content_type = ?record.content_type(),
        "Accepted record"
    );
    Ok(record)
}

/// Collect the request body, refusing anything over `limit` bytes
async fn read_body(req: &HttpRequest, mut payload: web::Payload, limit: usize) -> Result<Vec<u8>> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(too_large(limit));
    }

    let mut body = Vec::with_capacity(declared.unwrap_or(0));
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            warn!("Failed to read request body: {}", e);
            PipelineError::bad_request(format!("Failed to read request body: {}", e))
        })?;
        if body.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn too_large(limit: usize) -> PipelineError {
    PipelineError::PayloadTooLarge(format!("Request body exceeds {} bytes", limit))
}
