//! Wiring of the whole pipeline
//!
//! Builds the buffer and store from configuration and shares them between
//! the ingress gateway and the worker pool.

use crate::config::Config;
use crate::core::batch::BatchProcessor;
use crate::core::processing::{ProcessingStep, SimulatedWorkStep};
use crate::core::worker::WorkerPool;
use crate::monitoring::PipelineStats;
use crate::server::{AppState, HttpServer};
use crate::storage::StorageLayer;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Gateway plus workers over one buffer and one store
#[derive(Clone)]
pub struct Pipeline {
    config: Config,
    storage: StorageLayer,
    step: Arc<dyn ProcessingStep>,
    stats: Arc<PipelineStats>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("storage", &self.storage)
            .field("step", &self.step.name())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline with the backends named in `config`
    pub async fn new(config: Config) -> Result<Self> {
        let storage = StorageLayer::new(&config).await?;
        Ok(Self::with_storage(config, storage))
    }

    /// Create a pipeline over existing backends
    pub fn with_storage(config: Config, storage: StorageLayer) -> Self {
        let step = Arc::new(SimulatedWorkStep::new(config.processing().clone()));
        Self {
            config,
            storage,
            step,
            stats: Arc::new(PipelineStats::new()),
        }
    }

    /// Replace the processing step
    pub fn with_step(mut self, step: Arc<dyn ProcessingStep>) -> Self {
        self.step = step;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &StorageLayer {
        &self.storage
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        self.stats.clone()
    }

    pub fn processor(&self) -> BatchProcessor {
        BatchProcessor::new(
            self.storage.store.clone(),
            self.step.clone(),
            self.config.worker(),
        )
    }

    pub fn worker_pool(&self) -> WorkerPool {
        WorkerPool::new(
            self.storage.buffer.clone(),
            self.processor(),
            self.config.worker().clone(),
            self.stats.clone(),
        )
    }

    /// State for the HTTP handlers; it carries the buffer but not the store
    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.config.clone(),
            self.storage.buffer.clone(),
            self.stats.clone(),
        )
    }

    /// Run the HTTP server, and the worker pool when enabled, until the
    /// server stops
    pub async fn run(self) -> Result<()> {
        info!(
            buffer = self.storage.buffer.name(),
            store = self.storage.store.name(),
            step = self.step.name(),
            "Starting pipeline"
        );

        let health = self.storage.health_check().await;
        if !health.overall {
            // Keep serving: buffered records wait until the backends recover
            warn!(
                buffer = health.buffer,
                store = health.store,
                "Storage backends unhealthy at startup"
            );
        }

        let workers = if self.config.worker().enabled {
            Some(self.worker_pool().spawn())
        } else {
            info!("Worker pool disabled; running ingress only");
            None
        };

        let served = HttpServer::new(self.app_state()).start().await;

        if let Some(workers) = workers {
            workers.shutdown().await;
        }
        served
    }
}
