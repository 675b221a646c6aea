//! Configuration management for the pipeline
//!
//! This module handles loading, validation, and management of all pipeline configuration.

mod loader;
pub mod models;

pub use models::*;

use crate::utils::error::{PipelineError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Main configuration struct for the pipeline
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Pipeline configuration
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self {
            pipeline: read_file(path.as_ref()).await?,
        };

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let pipeline = PipelineConfig::from_env()?;
        let config = Self { pipeline };

        config.validate()?;
        Ok(config)
    }

    /// Load an optional file, then apply environment overrides, then validate
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut pipeline = match path {
            Some(path) => read_file(path).await?,
            None => PipelineConfig::default(),
        };
        pipeline.apply_env_overrides()?;

        let config = Self { pipeline };
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.pipeline.server
    }

    /// Get ingest configuration
    pub fn ingest(&self) -> &IngestConfig {
        &self.pipeline.ingest
    }

    /// Get buffer configuration
    pub fn buffer(&self) -> &BufferConfig {
        &self.pipeline.buffer
    }

    /// Get store configuration
    pub fn store(&self) -> &StoreConfig {
        &self.pipeline.store
    }

    /// Get worker configuration
    pub fn worker(&self) -> &WorkerConfig {
        &self.pipeline.worker
    }

    /// Get processing configuration
    pub fn processing(&self) -> &ProcessingConfig {
        &self.pipeline.processing
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.pipeline.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.pipeline
            .server
            .validate()
            .map_err(|e| PipelineError::Config(format!("Server config error: {}", e)))?;

        self.pipeline
            .ingest
            .validate()
            .map_err(|e| PipelineError::Config(format!("Ingest config error: {}", e)))?;

        self.pipeline
            .buffer
            .validate()
            .map_err(|e| PipelineError::Config(format!("Buffer config error: {}", e)))?;

        self.pipeline
            .store
            .validate()
            .map_err(|e| PipelineError::Config(format!("Store config error: {}", e)))?;

        self.pipeline
            .worker
            .validate()
            .map_err(|e| PipelineError::Config(format!("Worker config error: {}", e)))?;

        self.pipeline
            .processing
            .validate()
            .map_err(|e| PipelineError::Config(format!("Processing config error: {}", e)))?;

        self.pipeline
            .logging
            .validate()
            .map_err(|e| PipelineError::Config(format!("Logging config error: {}", e)))?;

        // A message must stay hidden for the whole batch budget, otherwise it
        // is redelivered while still being processed
        let visibility_ms = self
            .pipeline
            .buffer
            .visibility_timeout_secs
            .saturating_mul(1000);
        if visibility_ms <= self.pipeline.worker.batch_timeout_ms {
            return Err(PipelineError::Config(format!(
                "Buffer visibility timeout ({}s) must exceed the worker batch timeout ({}ms)",
                self.pipeline.buffer.visibility_timeout_secs, self.pipeline.worker.batch_timeout_ms
            )));
        }

        #[cfg(not(feature = "aws"))]
        {
            if self.pipeline.buffer.backend == BufferBackend::Sqs {
                return Err(PipelineError::Config(
                    "The sqs buffer backend requires the `aws` feature".to_string(),
                ));
            }
            if self.pipeline.store.backend == StoreBackend::Dynamodb {
                return Err(PipelineError::Config(
                    "The dynamodb store backend requires the `aws` feature".to_string(),
                ));
            }
        }

        if self.pipeline.processing.max_delay_ms >= self.pipeline.worker.record_timeout_ms {
            warn!(
                max_delay_ms = self.pipeline.processing.max_delay_ms,
                record_timeout_ms = self.pipeline.worker.record_timeout_ms,
                "Longest simulated delay reaches the record timeout; long records will always time out"
            );
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.pipeline = self.pipeline.merge(other.pipeline);
        self
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.pipeline).map_err(|e| {
            PipelineError::Config(format!("Failed to serialize config to YAML: {}", e))
        })
    }
}

async fn read_file(path: &Path) -> Result<PipelineConfig> {
    info!("Loading configuration from: {:?}", path);

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::Config(format!("Failed to read config file: {}", e)))?;

    serde_yaml::from_str(&content)
        .map_err(|e| PipelineError::Config(format!("Failed to parse config: {}", e)))
}
