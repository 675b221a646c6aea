//! Health check endpoint

use crate::monitoring::StatsSnapshot;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Liveness, buffer reachability and pipeline counters.
///
/// Always answers 200 while the process is up; a degraded buffer is reported
/// in the body.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    debug!("Health check requested");

    let healthy = match state.buffer.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Buffer health check failed: {}", e);
            false
        }
    };
    let approximate_depth = if healthy {
        state.buffer.approximate_depth().await.ok()
    } else {
        None
    };

    let status = HealthStatus {
        status: Cow::Borrowed(if healthy { "healthy" } else { "degraded" }),
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(crate::VERSION),
        buffer: BufferHealth {
            backend: Cow::Borrowed(state.buffer.name()),
            healthy,
            approximate_depth,
        },
        stats: state.stats.snapshot(),
    };

    HttpResponse::Ok().json(ApiResponse::success(status))
}

/// Health status body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: Cow<'static, str>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: Cow<'static, str>,
    pub buffer: BufferHealth,
    pub stats: StatsSnapshot,
}

/// Buffer part of the health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferHealth {
    pub backend: Cow<'static, str>,
    pub healthy: bool,
    pub approximate_depth: Option<usize>,
}
