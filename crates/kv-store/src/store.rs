use async_trait::async_trait;

use crate::{Filter, Item, Key, KeyCondition, Page, PageRequest, Result};

/// Page size used when a full scan is assembled from pages.
pub const SCAN_PAGE_SIZE: usize = 100;

/// Core trait for key-value store implementations.
///
/// Every operation addresses a named table whose key schema is known to the
/// store. Single-item operations are atomic per key; nothing spans keys.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one item. Returns `None` if no item exists under the key.
    async fn get(&self, table: &str, key: &Key) -> Result<Option<Item>>;

    /// Writes an item, replacing any item stored under the same key.
    ///
    /// The key is read from the item's key attributes.
    async fn put(&self, table: &str, item: Item) -> Result<()>;

    /// Writes an item only if no item exists under its key.
    ///
    /// Fails with `ConditionalCheckFailed` otherwise; the existing item is
    /// left untouched.
    async fn insert(&self, table: &str, item: Item) -> Result<()>;

    /// Merges `changes` into the item stored under `key`, creating it if it
    /// does not exist. Attributes absent from `changes` are left as they are.
    ///
    /// Attribute names are data, never part of a query text. Changing a key
    /// attribute is rejected. Returns the item after the update.
    async fn update(&self, table: &str, key: &Key, changes: Item) -> Result<Item>;

    /// Deletes the item under `key`. Deleting a missing item succeeds.
    async fn delete(&self, table: &str, key: &Key) -> Result<()>;

    /// Reads one page of the table in key order.
    async fn scan_page(&self, table: &str, page: PageRequest) -> Result<Page<Item>>;

    /// Reads all items matching the key condition, ordered by sort key, then
    /// drops the ones rejected by `filter`.
    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        filter: Option<&Filter>,
    ) -> Result<Vec<Item>>;
}

/// Extension trait providing convenience methods for key-value stores.
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Reads the whole table, following continuation keys page by page.
    ///
    /// Cost is linear in the table size.
    async fn scan(&self, table: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut request = PageRequest::first(SCAN_PAGE_SIZE);
        loop {
            let page = self.scan_page(table, request).await?;
            items.extend(page.items);
            match page.last_key {
                Some(key) => request = PageRequest::after(SCAN_PAGE_SIZE, key),
                None => return Ok(items),
            }
        }
    }

    /// Checks whether an item exists under the key.
    async fn exists(&self, table: &str, key: &Key) -> Result<bool> {
        Ok(self.get(table, key).await?.is_some())
    }
}

// Blanket implementation for all KeyValueStore implementations
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}
