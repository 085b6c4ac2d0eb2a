//! Catalog storage trait

use super::Item;
use crate::error::StorageError;
use async_trait::async_trait;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Read-only access to catalog items
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// List all items ordered by id
    async fn list_items(&self) -> StorageResult<Vec<Item>>;

    /// Get an item by id
    async fn get_item(&self, id: u32) -> StorageResult<Option<Item>>;

    /// First `limit` items, for the landing page
    async fn featured(&self, limit: usize) -> StorageResult<Vec<Item>> {
        let mut items = self.list_items().await?;
        items.truncate(limit);
        Ok(items)
    }
}
