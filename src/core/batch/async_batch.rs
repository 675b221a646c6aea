//! Concurrent execution of the records of one batch
//!
//! Every item runs under its own timeout and under the shared batch
//! deadline, and a panicking item is turned into that item's failure.

use super::types::{RecordError, RecordErrorKind};
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for async batch processing
#[derive(Debug, Clone)]
pub struct AsyncBatchConfig {
    /// Maximum concurrent items (default: 5)
    pub concurrency: usize,
    /// Timeout per individual item
    pub timeout: Duration,
    /// Budget for the whole batch
    pub batch_timeout: Duration,
}

impl Default for AsyncBatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout: Duration::from_secs(60),
            batch_timeout: Duration::from_secs(90),
        }
    }
}

impl AsyncBatchConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set timeout per item
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the budget of the whole batch
    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }
}

/// Result of an individual item in a batch
#[derive(Debug, Clone)]
pub struct AsyncBatchItemResult<R> {
    /// Index of the item in the original batch
    pub index: usize,
    /// The result (Ok or Err)
    pub result: std::result::Result<R, RecordError>,
    /// Time taken for this item
    pub duration: Duration,
}

/// Async batch executor for concurrent item processing
#[derive(Debug, Clone)]
pub struct AsyncBatchExecutor {
    config: AsyncBatchConfig,
}

impl AsyncBatchExecutor {
    /// Create a new batch executor
    pub fn new(config: AsyncBatchConfig) -> Self {
        Self { config }
    }

    /// Execute a batch of async operations concurrently
    ///
    /// Returns one result per item, in input order. An item that has not
    /// finished when the batch deadline passes, including one that never got
    /// to start, fails with [`RecordErrorKind::DeadlineExceeded`].
    pub async fn execute<T, R, F, Fut>(
        &self,
        items: impl IntoIterator<Item = T>,
        operation: F,
    ) -> Vec<AsyncBatchItemResult<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = std::result::Result<R, RecordError>> + Send,
    {
        let items_with_index: Vec<(usize, T)> = items.into_iter().enumerate().collect();
        let config = self.config.clone();
        let batch_deadline = Instant::now() + config.batch_timeout;

        let results: Vec<AsyncBatchItemResult<R>> = stream::iter(items_with_index)
            .map(|(index, item)| {
                let op = operation.clone();
                let cfg = config.clone();

                async move {
                    let start = Instant::now();
                    let item_deadline = start + cfg.timeout;
                    let (deadline, limited_by_batch) = if batch_deadline <= item_deadline {
                        (batch_deadline, true)
                    } else {
                        (item_deadline, false)
                    };

                    let guarded = AssertUnwindSafe(op(item)).catch_unwind();
                    let result = match tokio::time::timeout_at(deadline, guarded).await {
                        Ok(Ok(result)) => result,
                        Ok(Err(panic)) => Err(RecordError::new(
                            RecordErrorKind::Panic,
                            panic_message(panic.as_ref()),
                        )),
                        Err(_) if limited_by_batch => Err(RecordError::new(
                            RecordErrorKind::DeadlineExceeded,
                            format!(
                                "item {} unfinished when the batch budget of {:?} ran out",
                                index, cfg.batch_timeout
                            ),
                        )),
                        Err(_) => Err(RecordError::new(
                            RecordErrorKind::Timeout,
                            format!("item {} timed out after {:?}", index, cfg.timeout),
                        )),
                    };

                    AsyncBatchItemResult {
                        index,
                        result,
                        duration: start.elapsed(),
                    }
                }
            })
            .buffer_unordered(config.concurrency)
            .collect()
            .await;

        // Sort by index to maintain original order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|r| r.index);
        sorted_results
    }

    /// Get current configuration
    pub fn config(&self) -> &AsyncBatchConfig {
        &self.config
    }
}

impl Default for AsyncBatchExecutor {
    fn default() -> Self {
        Self::new(AsyncBatchConfig::default())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
