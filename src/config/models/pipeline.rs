//! Top-level pipeline configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Configuration of every pipeline component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Request normalization
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Buffer backend
    #[serde(default)]
    pub buffer: BufferConfig,
    /// Record store backend
    #[serde(default)]
    pub store: StoreConfig,
    /// Batch workers
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Processing step
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Merge with another pipeline configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.server = self.server.merge(other.server);
        self.ingest = self.ingest.merge(other.ingest);
        self.buffer = self.buffer.merge(other.buffer);
        self.store = self.store.merge(other.store);
        self.worker = self.worker.merge(other.worker);
        self.processing = self.processing.merge(other.processing);
        self.logging = self.logging.merge(other.logging);
        self
    }
}
