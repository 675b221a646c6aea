//! Core data models for the pipeline
//!
//! This module defines the record that flows from ingress to storage, the
//! envelope the buffer delivers it in, and the item the store persists.

pub mod item;
pub mod message;
pub mod record;

pub use item::StoredItem;
pub use message::BufferMessage;
pub use record::{CanonicalLogRecord, ContentType, Payload, RecordId, RecordKey, TenantId};
