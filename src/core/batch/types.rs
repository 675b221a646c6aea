//! Batch processing types and data structures

use crate::core::models::{BufferMessage, RecordKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a single record failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorKind {
    /// Message body is not a valid record
    Decode,
    /// Processing step failed
    Processing,
    /// Store write failed
    Store,
    /// Record ran past its own timeout
    Timeout,
    /// Batch budget ran out before the record finished
    DeadlineExceeded,
    /// Record panicked
    Panic,
}

impl RecordErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordErrorKind::Decode => "decode",
            RecordErrorKind::Processing => "processing",
            RecordErrorKind::Store => "store",
            RecordErrorKind::Timeout => "timeout",
            RecordErrorKind::DeadlineExceeded => "deadline_exceeded",
            RecordErrorKind::Panic => "panic",
        }
    }
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one record in a batch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RecordError {
    pub kind: RecordErrorKind,
    pub message: String,
}

impl RecordError {
    pub fn new<S: Into<String>>(kind: RecordErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::new(RecordErrorKind::Decode, message)
    }

    pub fn processing<S: Into<String>>(message: S) -> Self {
        Self::new(RecordErrorKind::Processing, message)
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::new(RecordErrorKind::Store, message)
    }
}

/// Outcome of one message of a batch
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// The delivery this outcome settles
    pub message: BufferMessage,
    /// Store key, when the body could be decoded
    pub key: Option<RecordKey>,
    pub result: std::result::Result<(), RecordError>,
    pub duration: Duration,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error_kind(&self) -> Option<RecordErrorKind> {
        self.result.as_ref().err().map(|e| e.kind)
    }
}

/// Per-message report of one batch invocation
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One entry per received message, in receive order
    pub items: Vec<ItemOutcome>,
    pub duration: Duration,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| !item.is_success())
    }

    /// Message ids that must be delivered again
    pub fn batch_item_failures(&self) -> Vec<String> {
        self.failures()
            .map(|item| item.message.message_id.clone())
            .collect()
    }

    /// Partial batch response in the shape SQS event sources expect
    pub fn to_partial_batch_response(&self) -> PartialBatchResponse {
        PartialBatchResponse {
            batch_item_failures: self
                .batch_item_failures()
                .into_iter()
                .map(|item_identifier| BatchItemFailure { item_identifier })
                .collect(),
        }
    }
}

/// Partial batch response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialBatchResponse {
    #[serde(rename = "batchItemFailures")]
    pub batch_item_failures: Vec<BatchItemFailure>,
}

/// One failed message of a partial batch response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemFailure {
    #[serde(rename = "itemIdentifier")]
    pub item_identifier: String,
}
