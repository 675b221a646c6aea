//! Environment variable overrides
//!
//! Only this module reads the process environment; everything else receives an
//! explicit [`Config`](super::Config).

use super::models::*;
use crate::utils::error::{PipelineError, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

impl PipelineConfig {
    /// Load configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment variables");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server configuration
        if let Some(host) = lookup("LOGFLOW_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LOGFLOW_PORT") {
            self.server.port = parse_var("LOGFLOW_PORT", &port)?;
        }
        if let Some(workers) = lookup("LOGFLOW_HTTP_WORKERS") {
            self.server.workers = Some(parse_var("LOGFLOW_HTTP_WORKERS", &workers)?);
        }
        if let Some(size) = lookup("LOGFLOW_MAX_BODY_SIZE") {
            self.server.max_body_size = parse_var("LOGFLOW_MAX_BODY_SIZE", &size)?;
        }
        if let Some(header) = lookup("LOGFLOW_TENANT_HEADER") {
            self.ingest.tenant_header = header;
        }

        // Buffer configuration
        if let Some(backend) = lookup("LOGFLOW_BUFFER_BACKEND") {
            self.buffer.backend = parse_var("LOGFLOW_BUFFER_BACKEND", &backend)?;
        }
        if let Some(queue_url) = lookup("QUEUE_URL") {
            self.buffer.queue_url = Some(queue_url);
            // A queue URL alone implies the managed queue
            if lookup("LOGFLOW_BUFFER_BACKEND").is_none() {
                self.buffer.backend = BufferBackend::Sqs;
            }
        }
        if let Some(secs) = lookup("LOGFLOW_VISIBILITY_TIMEOUT_SECS") {
            self.buffer.visibility_timeout_secs =
                parse_var("LOGFLOW_VISIBILITY_TIMEOUT_SECS", &secs)?;
        }
        if let Some(count) = lookup("LOGFLOW_MAX_RECEIVE_COUNT") {
            self.buffer.max_receive_count = parse_var("LOGFLOW_MAX_RECEIVE_COUNT", &count)?;
        }

        // Store configuration
        if let Some(backend) = lookup("LOGFLOW_STORE_BACKEND") {
            self.store.backend = parse_var("LOGFLOW_STORE_BACKEND", &backend)?;
        }
        if let Some(table) = lookup("TABLE_NAME") {
            self.store.table_name = Some(table);
            if lookup("LOGFLOW_STORE_BACKEND").is_none() {
                self.store.backend = StoreBackend::Dynamodb;
            }
        }

        if let Some(region) = lookup("LOGFLOW_AWS_REGION") {
            self.buffer.region = Some(region.clone());
            self.store.region = Some(region);
        }
        if let Some(endpoint) = lookup("LOGFLOW_AWS_ENDPOINT_URL") {
            self.buffer.endpoint_url = Some(endpoint.clone());
            self.store.endpoint_url = Some(endpoint);
        }

        // Worker configuration
        if let Some(enabled) = lookup("LOGFLOW_WORKER_ENABLED") {
            self.worker.enabled = parse_var("LOGFLOW_WORKER_ENABLED", &enabled)?;
        }
        if let Some(concurrency) = lookup("LOGFLOW_WORKER_CONCURRENCY") {
            self.worker.concurrency = Some(parse_var("LOGFLOW_WORKER_CONCURRENCY", &concurrency)?);
        }
        if let Some(size) = lookup("LOGFLOW_BATCH_SIZE") {
            self.worker.batch_size = parse_var("LOGFLOW_BATCH_SIZE", &size)?;
        }
        if let Some(ms) = lookup("LOGFLOW_BATCH_TIMEOUT_MS") {
            self.worker.batch_timeout_ms = parse_var("LOGFLOW_BATCH_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("LOGFLOW_RECORD_TIMEOUT_MS") {
            self.worker.record_timeout_ms = parse_var("LOGFLOW_RECORD_TIMEOUT_MS", &ms)?;
        }

        // Logging configuration
        if let Some(level) = lookup("LOGFLOW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOGFLOW_LOG_JSON") {
            self.logging.json = parse_var("LOGFLOW_LOG_JSON", &json)?;
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PipelineError::Config(format!("Invalid {}: {}", key, e)))
}
