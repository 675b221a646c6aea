//! Envelope the buffer delivers records in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One delivery of a buffered record.
///
/// `message_id` is stable across redeliveries; `receipt_handle` identifies
/// this particular delivery and is what acknowledgements consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    /// How many times the message has been received, this delivery included
    pub receive_count: u32,
    pub sent_at: DateTime<Utc>,
}
