//! Storage layer for the pipeline
//!
//! This module wires the buffer and the record store backends selected by
//! configuration.

/// Buffer backends
pub mod buffer;
/// Record store backends
pub mod records;

pub use buffer::{Buffer, MemoryBuffer};
pub use records::{MemoryStore, RecordStore};

use crate::config::{BufferBackend, Config, StoreBackend};
#[cfg(not(feature = "aws"))]
use crate::utils::error::PipelineError;
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Buffer and store handles shared by the gateway and the workers
#[derive(Clone)]
pub struct StorageLayer {
    /// Buffer between ingress and workers
    pub buffer: Arc<dyn Buffer>,
    /// Tenant-partitioned record store
    pub store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for StorageLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLayer")
            .field("buffer", &self.buffer.name())
            .field("store", &self.store.name())
            .finish()
    }
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing storage layer");

        let buffer: Arc<dyn Buffer> = match config.buffer().backend {
            BufferBackend::Memory => Arc::new(MemoryBuffer::new(config.buffer())),
            #[cfg(feature = "aws")]
            BufferBackend::Sqs => Arc::new(buffer::SqsBuffer::new(config.buffer()).await?),
            #[cfg(not(feature = "aws"))]
            BufferBackend::Sqs => {
                return Err(PipelineError::config(
                    "The sqs buffer backend requires the `aws` feature",
                ));
            }
        };

        let store: Arc<dyn RecordStore> = match config.store().backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            #[cfg(feature = "aws")]
            StoreBackend::Dynamodb => Arc::new(records::DynamoDbStore::new(config.store()).await?),
            #[cfg(not(feature = "aws"))]
            StoreBackend::Dynamodb => {
                return Err(PipelineError::config(
                    "The dynamodb store backend requires the `aws` feature",
                ));
            }
        };

        info!(
            buffer = buffer.name(),
            store = store.name(),
            "Storage layer initialized successfully"
        );
        Ok(Self { buffer, store })
    }

    /// Assemble a storage layer from existing handles
    pub fn from_parts(buffer: Arc<dyn Buffer>, store: Arc<dyn RecordStore>) -> Self {
        Self { buffer, store }
    }

    /// Health check for both backends
    pub async fn health_check(&self) -> StorageHealthStatus {
        let buffer = match self.buffer.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Buffer health check failed: {}", e);
                false
            }
        };
        let store = match self.store.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Store health check failed: {}", e);
                false
            }
        };

        StorageHealthStatus {
            buffer,
            store,
            overall: buffer && store,
        }
    }
}

/// Storage health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageHealthStatus {
    pub buffer: bool,
    pub store: bool,
    pub overall: bool,
}
