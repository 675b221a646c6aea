//! Worker pool configuration

use super::default_true;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest batch the managed queue hands out per receive
pub const MAX_BATCH_SIZE: usize = 10;

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Run the worker pool in this process
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent batch workers (defaults to CPU count)
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Messages requested per receive
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Records processed concurrently inside one batch
    #[serde(default = "default_record_concurrency")]
    pub record_concurrency: usize,
    /// Budget for a single record in milliseconds
    #[serde(default = "default_record_timeout_ms")]
    pub record_timeout_ms: u64,
    /// Hard wall-clock budget for a whole batch in milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
    /// Idle sleep after an empty receive in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: None,
            batch_size: default_batch_size(),
            record_concurrency: default_record_concurrency(),
            record_timeout_ms: default_record_timeout_ms(),
            batch_timeout_ms: default_batch_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WorkerConfig {
    /// Number of batch workers to spawn
    pub fn worker_count(&self) -> usize {
        self.concurrency.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn record_timeout(&self) -> Duration {
        Duration::from_millis(self.record_timeout_ms)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Merge with another worker configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if !other.enabled {
            self.enabled = false;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.batch_size != default_batch_size() {
            self.batch_size = other.batch_size;
        }
        if other.record_concurrency != default_record_concurrency() {
            self.record_concurrency = other.record_concurrency;
        }
        if other.record_timeout_ms != default_record_timeout_ms() {
            self.record_timeout_ms = other.record_timeout_ms;
        }
        if other.batch_timeout_ms != default_batch_timeout_ms() {
            self.batch_timeout_ms = other.batch_timeout_ms;
        }
        if other.poll_interval_ms != default_poll_interval_ms() {
            self.poll_interval_ms = other.poll_interval_ms;
        }
        self
    }

    /// Validate worker configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(format!(
                "Batch size must be between 1 and {}",
                MAX_BATCH_SIZE
            ));
        }

        if self.concurrency == Some(0) {
            return Err("Worker concurrency cannot be 0".to_string());
        }

        if self.record_concurrency == 0 {
            return Err("Record concurrency cannot be 0".to_string());
        }

        if self.record_timeout_ms == 0 {
            return Err("Record timeout cannot be 0".to_string());
        }

        if self.batch_timeout_ms == 0 {
            return Err("Batch timeout cannot be 0".to_string());
        }

        if self.poll_interval_ms == 0 {
            return Err("Poll interval cannot be 0".to_string());
        }

        Ok(())
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_record_concurrency() -> usize {
    5
}

fn default_record_timeout_ms() -> u64 {
    840_000
}

fn default_batch_timeout_ms() -> u64 {
    900_000
}

fn default_poll_interval_ms() -> u64 {
    200
}
