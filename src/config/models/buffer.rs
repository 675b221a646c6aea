//! Buffer configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Longest long-poll wait the managed queue accepts
pub const MAX_RECEIVE_WAIT_SECS: u64 = 20;
/// Longest visibility timeout the managed queue accepts (12 hours)
pub const MAX_VISIBILITY_TIMEOUT_SECS: u64 = 43_200;
/// Longest retention period the managed queue accepts (14 days)
pub const MAX_RETENTION_SECS: u64 = 1_209_600;

/// Buffer backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferBackend {
    /// In-process queue
    #[default]
    Memory,
    /// Amazon SQS (requires the `aws` feature)
    Sqs,
}

impl FromStr for BufferBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BufferBackend::Memory),
            "sqs" => Ok(BufferBackend::Sqs),
            other => Err(format!("unknown buffer backend '{}'", other)),
        }
    }
}

/// Buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default)]
    pub backend: BufferBackend,
    /// Queue URL (sqs backend)
    #[serde(default)]
    pub queue_url: Option<String>,
    /// AWS region override (sqs backend)
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override, e.g. a local emulator (sqs backend)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// How long a received message stays hidden unless acknowledged
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,
    /// Receives after which a message is moved to the dead-letter queue
    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,
    /// How long an unprocessed message is retained
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// Reject sends once this many messages are buffered (memory backend)
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Long-poll wait per receive (sqs backend)
    #[serde(default = "default_receive_wait_secs")]
    pub receive_wait_secs: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            backend: BufferBackend::default(),
            queue_url: None,
            region: None,
            endpoint_url: None,
            visibility_timeout_secs: default_visibility_timeout_secs(),
            max_receive_count: default_max_receive_count(),
            retention_secs: default_retention_secs(),
            max_depth: None,
            receive_wait_secs: default_receive_wait_secs(),
        }
    }
}

impl BufferConfig {
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Merge with another buffer configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if other.backend != BufferBackend::default() {
            self.backend = other.backend;
        }
        if other.queue_url.is_some() {
            self.queue_url = other.queue_url;
        }
        if other.region.is_some() {
            self.region = other.region;
        }
        if other.endpoint_url.is_some() {
            self.endpoint_url = other.endpoint_url;
        }
        if other.visibility_timeout_secs != default_visibility_timeout_secs() {
            self.visibility_timeout_secs = other.visibility_timeout_secs;
        }
        if other.max_receive_count != default_max_receive_count() {
            self.max_receive_count = other.max_receive_count;
        }
        if other.retention_secs != default_retention_secs() {
            self.retention_secs = other.retention_secs;
        }
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if other.receive_wait_secs != default_receive_wait_secs() {
            self.receive_wait_secs = other.receive_wait_secs;
        }
        self
    }

    /// Validate buffer configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.visibility_timeout_secs == 0 {
            return Err("Visibility timeout cannot be 0".to_string());
        }

        if self.visibility_timeout_secs > MAX_VISIBILITY_TIMEOUT_SECS {
            return Err(format!(
                "Visibility timeout cannot exceed {} seconds",
                MAX_VISIBILITY_TIMEOUT_SECS
            ));
        }

        if self.max_receive_count == 0 {
            return Err("Max receive count must be at least 1".to_string());
        }

        if self.retention_secs == 0 {
            return Err("Retention cannot be 0".to_string());
        }

        if self.retention_secs > MAX_RETENTION_SECS {
            return Err(format!(
                "Retention cannot exceed {} seconds",
                MAX_RETENTION_SECS
            ));
        }

        if self.receive_wait_secs > MAX_RECEIVE_WAIT_SECS {
            return Err(format!(
                "Receive wait cannot exceed {} seconds",
                MAX_RECEIVE_WAIT_SECS
            ));
        }

        if self.max_depth == Some(0) {
            return Err("Max depth cannot be 0".to_string());
        }

        if self.backend == BufferBackend::Sqs
            && self.queue_url.as_deref().is_none_or(str::is_empty)
        {
            return Err("Queue URL is required for the sqs backend".to_string());
        }

        Ok(())
    }
}

fn default_visibility_timeout_secs() -> u64 {
    960
}

fn default_max_receive_count() -> u32 {
    3
}

fn default_retention_secs() -> u64 {
    4 * 24 * 60 * 60
}

fn default_receive_wait_secs() -> u64 {
    5
}
