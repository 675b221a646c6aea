//! In-process buffer

use super::{Buffer, encode_message};
use crate::config::{BufferConfig, MAX_VISIBILITY_TIMEOUT_SECS};
use crate::core::models::{BufferMessage, CanonicalLogRecord};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(MAX_VISIBILITY_TIMEOUT_SECS);

#[derive(Debug)]
struct Entry {
    message_id: String,
    body: String,
    sent_at: DateTime<Utc>,
    enqueued_at: Instant,
    receive_count: u32,
    visible_at: Instant,
    receipt_handle: Option<String>,
}

impl Entry {
    fn to_message(&self, receipt_handle: String) -> BufferMessage {
        BufferMessage {
            message_id: self.message_id.clone(),
            receipt_handle,
            body: self.body.clone(),
            receive_count: self.receive_count,
            sent_at: self.sent_at,
        }
    }
}

#[derive(Debug, Default)]
struct Queues {
    live: VecDeque<Entry>,
    dead: Vec<BufferMessage>,
}

/// Queue with SQS-style visibility, receive counting and dead-lettering,
/// driven by tokio's clock so tests can pause and advance time.
#[derive(Debug)]
pub struct MemoryBuffer {
    queues: Mutex<Queues>,
    visibility_timeout: Duration,
    max_receive_count: u32,
    retention: Duration,
    max_depth: Option<usize>,
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        Self::new(&BufferConfig::default())
    }
}

impl MemoryBuffer {
    pub fn new(config: &BufferConfig) -> Self {
        Self {
            queues: Mutex::new(Queues::default()),
            // Clamped so `now + visibility_timeout` stays inside the clock's range
            visibility_timeout: config.visibility_timeout().min(MAX_VISIBILITY_TIMEOUT),
            max_receive_count: config.max_receive_count.max(1),
            retention: config.retention(),
            max_depth: config.max_depth,
        }
    }

    /// Enqueue a raw body, bypassing record serialization
    pub fn send_raw(&self, body: impl Into<String>) -> Result<String> {
        let mut queues = self.queues.lock();
        if let Some(max_depth) = self.max_depth {
            if queues.live.len() >= max_depth {
                return Err(PipelineError::buffer(format!(
                    "buffer is full ({} messages)",
                    max_depth
                )));
            }
        }

        let now = Instant::now();
        let message_id = Uuid::new_v4().to_string();
        queues.live.push_back(Entry {
            message_id: message_id.clone(),
            body: body.into(),
            sent_at: Utc::now(),
            enqueued_at: now,
            receive_count: 0,
            visible_at: now,
            receipt_handle: None,
        });
        Ok(message_id)
    }

    /// Messages moved to the dead-letter queue, oldest first
    pub fn dead_letters(&self) -> Vec<BufferMessage> {
        self.queues.lock().dead.clone()
    }

    /// Messages currently received and not yet visible again
    pub fn in_flight(&self) -> usize {
        let now = Instant::now();
        self.queues
            .lock()
            .live
            .iter()
            .filter(|entry| entry.visible_at > now)
            .count()
    }

    /// Live messages, visible or in flight
    pub fn len(&self) -> usize {
        self.queues.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_expired(&self, queues: &mut Queues, now: Instant) {
        let before = queues.live.len();
        queues
            .live
            .retain(|entry| {
                // An expiry past the clock's range never comes
                entry
                    .enqueued_at
                    .checked_add(self.retention)
                    .is_none_or(|expires_at| expires_at > now)
            });
        let purged = before - queues.live.len();
        if purged > 0 {
            warn!(purged, "Dropped messages past the retention period");
        }
    }

    fn find(&self, queues: &Queues, message: &BufferMessage) -> Result<usize> {
        queues
            .live
            .iter()
            .position(|entry| {
                entry.message_id == message.message_id
                    && entry.receipt_handle.as_deref() == Some(message.receipt_handle.as_str())
            })
            .ok_or_else(|| {
                PipelineError::not_found(format!(
                    "no in-flight delivery of message {} with that receipt handle",
                    message.message_id
                ))
            })
    }
}

#[async_trait]
impl Buffer for MemoryBuffer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, record: &CanonicalLogRecord) -> Result<String> {
        let body = encode_message(record)?;
        let message_id = self.send_raw(body)?;
        debug!(
            tenant_id = %record.tenant_id(),
            record_id = %record.record_id(),
            message_id = %message_id,
            "Buffered record"
        );
        Ok(message_id)
    }

    async fn receive(&self, max: usize) -> Result<Vec<BufferMessage>> {
        let now = Instant::now();
        let mut queues = self.queues.lock();
        self.purge_expired(&mut queues, now);

        let mut delivered = Vec::new();
        let mut index = 0;
        while index < queues.live.len() && delivered.len() < max {
            if queues.live[index].visible_at > now {
                index += 1;
                continue;
            }

            if queues.live[index].receive_count >= self.max_receive_count {
                if let Some(entry) = queues.live.remove(index) {
                    warn!(
                        message_id = %entry.message_id,
                        receive_count = entry.receive_count,
                        "Moving message to the dead-letter queue"
                    );
                    let dead = entry.to_message(String::new());
                    queues.dead.push(dead);
                }
                continue;
            }

            let entry = &mut queues.live[index];
            let receipt_handle = Uuid::new_v4().to_string();
            entry.receive_count += 1;
            entry.visible_at = now + self.visibility_timeout;
            entry.receipt_handle = Some(receipt_handle.clone());
            delivered.push(entry.to_message(receipt_handle));
            index += 1;
        }

        Ok(delivered)
    }

    async fn ack(&self, message: &BufferMessage) -> Result<()> {
        let mut queues = self.queues.lock();
        let index = self.find(&queues, message)?;
        queues.live.remove(index);
        Ok(())
    }

    async fn report_failure(&self, message: &BufferMessage) -> Result<()> {
        let mut queues = self.queues.lock();
        let index = self.find(&queues, message)?;
        // Stays hidden until the visibility timeout runs out
        queues.live[index].receipt_handle = None;
        Ok(())
    }

    async fn approximate_depth(&self) -> Result<usize> {
        Ok(self.len())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
