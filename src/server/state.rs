//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::normalizer::Normalizer;
use crate::monitoring::PipelineStats;
use crate::storage::Buffer;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for cheap cloning into every worker thread.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline configuration (shared read-only)
    pub config: Arc<Config>,
    /// Request normalizer
    pub normalizer: Arc<Normalizer>,
    /// Buffer records are handed to
    pub buffer: Arc<dyn Buffer>,
    /// Pipeline counters
    pub stats: Arc<PipelineStats>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config, buffer: Arc<dyn Buffer>, stats: Arc<PipelineStats>) -> Self {
        let normalizer = Normalizer::new(config.ingest().tenant_header.clone());
        Self {
            config: Arc::new(config),
            normalizer: Arc::new(normalizer),
            buffer,
            stats,
        }
    }

    /// Get pipeline configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
