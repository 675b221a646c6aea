//! In-process pipeline counters

use crate::core::batch::BatchOutcome;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters shared by the gateway and the workers
#[derive(Debug)]
pub struct PipelineStats {
    start_time: Instant,
    accepted: AtomicU64,
    rejected: AtomicU64,
    enqueue_failures: AtomicU64,
    batches: AtomicU64,
    records_succeeded: AtomicU64,
    records_failed: AtomicU64,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            enqueue_failures: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            records_succeeded: AtomicU64::new(0),
            records_failed: AtomicU64::new(0),
        }
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request buffered
    #[inline]
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Request refused by normalization
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Request normalized but not buffered
    #[inline]
    pub fn record_enqueue_failure(&self) {
        self.enqueue_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Batch processed
    pub fn record_batch(&self, outcome: &BatchOutcome) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.records_succeeded
            .fetch_add(outcome.succeeded() as u64, Ordering::Relaxed);
        self.records_failed
            .fetch_add(outcome.failed() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            enqueue_failures: self.enqueue_failures.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            records_succeeded: self.records_succeeded.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub enqueue_failures: u64,
    pub batches: u64,
    pub records_succeeded: u64,
    pub records_failed: u64,
}
