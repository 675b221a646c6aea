//! In-process record store

use super::RecordStore;
use crate::core::models::{RecordId, StoredItem, TenantId};
use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Table held in memory, one sorted partition per tenant
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: DashMap<TenantId, BTreeMap<RecordId, StoredItem>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total items across all partitions
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `put` calls served, overwrites included
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Tenants with at least one item
    pub fn tenants(&self) -> Vec<TenantId> {
        let mut tenants: Vec<TenantId> = self
            .partitions
            .iter()
            .filter(|p| !p.value().is_empty())
            .map(|p| p.key().clone())
            .collect();
        tenants.sort();
        tenants
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, item: &StoredItem) -> Result<()> {
        let replaced = self
            .partitions
            .entry(item.tenant_id.clone())
            .or_default()
            .insert(item.record_id.clone(), item.clone())
            .is_some();
        self.writes.fetch_add(1, Ordering::Relaxed);

        debug!(
            tenant_id = %item.tenant_id,
            record_id = %item.record_id,
            replaced,
            "Stored item"
        );
        Ok(())
    }

    async fn get(&self, tenant_id: &TenantId, record_id: &RecordId) -> Result<Option<StoredItem>> {
        Ok(self
            .partitions
            .get(tenant_id)
            .and_then(|partition| partition.get(record_id).cloned()))
    }

    async fn query_tenant(&self, tenant_id: &TenantId) -> Result<Vec<StoredItem>> {
        Ok(self
            .partitions
            .get(tenant_id)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
