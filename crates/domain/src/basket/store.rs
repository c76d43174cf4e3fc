//! Basket persistence service.

use common::{from_item, to_item};
use kv_store::{Key, KeySchema, KeyValueStore, KeyValueStoreExt};

use super::Basket;
use crate::error::{DomainError, Result};

/// Service for reading and replacing user baskets.
///
/// Writes always replace the whole basket: clients send the complete
/// desired contents, items are never merged.
pub struct BasketStore<S: KeyValueStore> {
    store: S,
    table: String,
}

impl<S: KeyValueStore> BasketStore<S> {
    /// Creates a basket store over the given store and table.
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Key schema of the basket table.
    pub fn key_schema() -> KeySchema {
        KeySchema::partition(Basket::KEY_ATTRIBUTE)
    }

    /// Reads a user's basket. A missing basket is `None`.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, user_name: &str) -> Result<Option<Basket>> {
        let item = self
            .store
            .get(&self.table, &Key::partition(user_name))
            .await?;
        Ok(item.map(from_item).transpose()?)
    }

    /// Lists every basket. Reads the whole table.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Basket>> {
        let items = self.store.scan(&self.table).await?;
        Ok(items
            .into_iter()
            .map(from_item)
            .collect::<std::result::Result<_, _>>()?)
    }

    /// Stores a basket, replacing any existing basket of the same user.
    #[tracing::instrument(skip(self, basket), fields(user_name = %basket.user_name))]
    pub async fn put(&self, basket: Basket) -> Result<Basket> {
        if basket.user_name.trim().is_empty() {
            return Err(DomainError::Validation("userName is required".to_string()));
        }
        self.store.put(&self.table, to_item(&basket)?).await?;
        Ok(basket)
    }

    /// Deletes a user's basket. Deleting a missing basket succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_name: &str) -> Result<()> {
        self.store
            .delete(&self.table, &Key::partition(user_name))
            .await?;
        Ok(())
    }
}
