//! Durable at-least-once buffer between ingress and workers
//!
//! Messages stay in the buffer until acknowledged. A received message is
//! hidden for the visibility timeout; if it is not acknowledged in time it is
//! delivered again, and once its receive count is exhausted it is moved to
//! the dead-letter queue instead.

mod memory;
#[cfg(feature = "aws")]
mod sqs;

pub use memory::MemoryBuffer;
#[cfg(feature = "aws")]
pub use sqs::SqsBuffer;

use crate::core::models::{BufferMessage, CanonicalLogRecord};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;

/// Largest message body the managed queue accepts, in bytes
pub const MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// Serialize a record into a message body that fits [`MAX_MESSAGE_BYTES`].
///
/// The encoded body is larger than the request that produced it (envelope
/// fields, JSON escaping), so an accepted request can still be too large
/// here. That is a permanent failure, never a retryable buffer error.
pub fn encode_message(record: &CanonicalLogRecord) -> Result<String> {
    let body = record.to_message_body()?;
    if body.len() > MAX_MESSAGE_BYTES {
        return Err(PipelineError::PayloadTooLarge(format!(
            "Encoded record is {} bytes, the buffer accepts at most {}",
            body.len(),
            MAX_MESSAGE_BYTES
        )));
    }
    Ok(body)
}

/// Buffer contract shared by every backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Buffer: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Enqueue a record, returning the message id
    async fn send(&self, record: &CanonicalLogRecord) -> Result<String>;

    /// Receive up to `max` visible messages
    async fn receive(&self, max: usize) -> Result<Vec<BufferMessage>>;

    /// Delete a successfully processed message
    async fn ack(&self, message: &BufferMessage) -> Result<()>;

    /// Give a message back; it becomes visible again once its visibility
    /// timeout elapses
    async fn report_failure(&self, message: &BufferMessage) -> Result<()>;

    /// Approximate number of messages waiting or in flight
    async fn approximate_depth(&self) -> Result<usize>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;
}
