//! Worker-side batch processing
//!
//! A batch is a handful of buffered messages. Each message is decoded,
//! processed and stored on its own, and the outcome reports every message
//! separately so only the failed ones are delivered again.

mod async_batch;
mod processor;
mod types;


pub use async_batch::{AsyncBatchConfig, AsyncBatchExecutor, AsyncBatchItemResult};
pub use processor::BatchProcessor;
pub use types::{
    BatchItemFailure, BatchOutcome, ItemOutcome, PartialBatchResponse, RecordError,
    RecordErrorKind,
};
