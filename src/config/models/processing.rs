//! Processing step configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of the simulated per-record work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Delay per character of the original text in milliseconds
    #[serde(default = "default_per_char_delay_ms")]
    pub per_char_delay_ms: u64,
    /// Upper bound of the simulated delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Characters kept in front of the redaction marker
    #[serde(default = "default_redaction_prefix_chars")]
    pub redaction_prefix_chars: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            per_char_delay_ms: default_per_char_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            redaction_prefix_chars: default_redaction_prefix_chars(),
        }
    }
}

impl ProcessingConfig {
    /// Simulated delay for a text of `chars` characters
    pub fn delay_for(&self, chars: usize) -> Duration {
        let millis = (chars as u64)
            .saturating_mul(self.per_char_delay_ms)
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }

    pub fn merge(mut self, other: Self) -> Self {
        if other.per_char_delay_ms != default_per_char_delay_ms() {
            self.per_char_delay_ms = other.per_char_delay_ms;
        }
        if other.max_delay_ms != default_max_delay_ms() {
            self.max_delay_ms = other.max_delay_ms;
        }
        if other.redaction_prefix_chars != default_redaction_prefix_chars() {
            self.redaction_prefix_chars = other.redaction_prefix_chars;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.per_char_delay_ms > self.max_delay_ms && self.max_delay_ms > 0 {
            return Err("Per-character delay cannot exceed the max delay".to_string());
        }
        Ok(())
    }
}

fn default_per_char_delay_ms() -> u64 {
    50
}

fn default_max_delay_ms() -> u64 {
    800_000
}

fn default_redaction_prefix_chars() -> usize {
    10
}
