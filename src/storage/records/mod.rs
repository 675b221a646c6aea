//! Tenant-partitioned record store
//!
//! One logical table: partition key `tenant_id`, sort key `record_id`. Writes
//! are upserts, so repeating a write leaves the table unchanged.

#[cfg(feature = "aws")]
mod dynamodb;
mod memory;
#[cfg(test)]
mod tests;

#[cfg(feature = "aws")]
pub use dynamodb::DynamoDbStore;
pub use memory::MemoryStore;

use crate::core::models::{RecordId, StoredItem, TenantId};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Store contract shared by every backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Insert or overwrite the item at its `(tenant_id, record_id)` key
    async fn put(&self, item: &StoredItem) -> Result<()>;

    /// Point read
    async fn get(&self, tenant_id: &TenantId, record_id: &RecordId) -> Result<Option<StoredItem>>;

    /// Every item in one tenant's partition, ordered by record id
    async fn query_tenant(&self, tenant_id: &TenantId) -> Result<Vec<StoredItem>>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;
}
