//! # logflow
//!
//! Asynchronous multi-tenant log ingestion pipeline.
//!
//! Log events arrive over HTTP, are normalized into canonical records and
//! buffered durably. A pool of workers drains the buffer in batches,
//! processes every record independently and writes it to a store
//! partitioned by tenant. Ingestion never waits on processing, one bad
//! record never blocks its batch, and no record crosses a tenant boundary.
//!
//! ## Running the pipeline
//!
//! ```rust,no_run
//! use logflow::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/logflow.yaml").await?;
//!     let pipeline = Pipeline::new(config).await?;
//!     pipeline.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod monitoring;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::batch::{BatchOutcome, BatchProcessor, RecordErrorKind};
pub use core::models::{BufferMessage, CanonicalLogRecord, RecordId, StoredItem, TenantId};
pub use core::normalizer::{NormalizationError, Normalizer, RawRequest, normalize};
pub use core::processing::{ProcessingStep, SimulatedWorkStep};
pub use core::worker::{WorkerPool, WorkerPoolHandle};
pub use pipeline::Pipeline;
pub use storage::{Buffer, MemoryBuffer, MemoryStore, RecordStore, StorageLayer};
pub use utils::error::{PipelineError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build information of this binary
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
