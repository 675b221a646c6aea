//! Worker pool
//!
//! A fixed number of tokio tasks, each receiving a batch from the buffer,
//! running the batch processor and settling the outcome: successes are
//! acknowledged, failures are handed back for redelivery.


use crate::config::WorkerConfig;
use crate::core::batch::{BatchOutcome, BatchProcessor};
use crate::monitoring::PipelineStats;
use crate::storage::Buffer;
use crate::utils::error::Result;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Pulls batches from the buffer and settles their outcomes
#[derive(Clone)]
pub struct WorkerPool {
    buffer: Arc<dyn Buffer>,
    processor: BatchProcessor,
    config: WorkerConfig,
    stats: Arc<PipelineStats>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("buffer", &self.buffer.name())
            .field("processor", &self.processor)
            .field("config", &self.config)
            .finish()
    }
}

impl WorkerPool {
    pub fn new(
        buffer: Arc<dyn Buffer>,
        processor: BatchProcessor,
        config: WorkerConfig,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            buffer,
            processor,
            config,
            stats,
        }
    }

    /// Receive one batch, process it and settle it.
    ///
    /// Returns `None` when the buffer had nothing to deliver.
    pub async fn run_once(&self) -> Result<Option<BatchOutcome>> {
        let messages = self.buffer.receive(self.config.batch_size).await?;
        if messages.is_empty() {
            return Ok(None);
        }

        debug!(count = messages.len(), "Received batch");
        let outcome = self.processor.process_batch(messages).await;
        self.settle(&outcome).await;
        self.stats.record_batch(&outcome);
        Ok(Some(outcome))
    }

    /// Acknowledge successes and report failures back to the buffer
    pub async fn settle(&self, outcome: &BatchOutcome) {
        for item in &outcome.items {
            let settled = if item.is_success() {
                self.buffer.ack(&item.message).await
            } else {
                self.buffer.report_failure(&item.message).await
            };

            // Unsettled messages come back after their visibility timeout
            if let Err(e) = settled {
                warn!(
                    message_id = %item.message.message_id,
                    success = item.is_success(),
                    "Failed to settle message: {}",
                    e
                );
            }
        }
    }

    /// Spawn `worker.concurrency` worker tasks
    pub fn spawn(self) -> WorkerPoolHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let workers = self.config.worker_count();
        info!(workers, batch_size = self.config.batch_size, "Starting worker pool");

        let tasks = (0..workers)
            .map(|worker_id| {
                let pool = self.clone();
                let shutdown = shutdown_rx.clone();
                tokio::spawn(async move { pool.worker_loop(worker_id, shutdown).await })
            })
            .collect();

        WorkerPoolHandle {
            shutdown: shutdown_tx,
            tasks,
        }
    }

    /// Poll interval plus up to half of it again, so idle workers spread out
    fn idle_delay(&self) -> Duration {
        let base = self.config.poll_interval();
        let jitter_ms = rand::thread_rng().gen_range(0..=self.config.poll_interval_ms / 2);
        base + Duration::from_millis(jitter_ms)
    }

    async fn worker_loop(self, worker_id: usize, mut shutdown: watch::Receiver<bool>) {
        debug!(worker_id, "Worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let idle = match self.run_once().await {
                Ok(Some(_)) => false,
                Ok(None) => true,
                Err(e) => {
                    error!(worker_id, "Failed to receive batch: {}", e);
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(self.idle_delay()) => {}
                    changed = shutdown.changed() => {
                        // Handle dropped
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        debug!(worker_id, "Worker stopped");
    }
}

/// Handle to a running worker pool
#[derive(Debug)]
pub struct WorkerPoolHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl WorkerPoolHandle {
    /// Number of worker tasks
    pub fn workers(&self) -> usize {
        self.tasks.len()
    }

    /// Stop taking new batches and wait for in-flight batches to settle
    pub async fn shutdown(self) {
        info!("Stopping worker pool");
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("Worker task failed: {}", e);
            }
        }
        info!("Worker pool stopped");
    }
}
