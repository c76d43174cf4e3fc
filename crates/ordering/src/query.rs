//! Order queries.

use common::from_item;
use kv_store::{Item, KeyCondition, KeyValueStore, KeyValueStoreExt};

use crate::error::{OrderingError, Result};
use crate::order::Order;

/// Read access to stored orders.
pub struct OrderQuery<S: KeyValueStore> {
    store: S,
    table: String,
}

impl<S: KeyValueStore> OrderQuery<S> {
    /// Creates a query over the given order table.
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Lists every order. Reads the whole table.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Order>> {
        let items = self.store.scan(&self.table).await?;
        to_orders(items)
    }

    /// Lists a user's orders, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_user(&self, user_name: &str) -> Result<Vec<Order>> {
        let items = self
            .store
            .query(&self.table, &KeyCondition::partition(user_name), None)
            .await?;
        to_orders(items)
    }

    /// Looks up a user's orders with exactly this order date.
    ///
    /// The date must match the stored text exactly; there is no range match.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_user_and_date(
        &self,
        user_name: &str,
        order_date: &str,
    ) -> Result<Vec<Order>> {
        let condition = KeyCondition::partition(user_name).sort_equals(order_date);
        let items = self.store.query(&self.table, &condition, None).await?;
        to_orders(items)
    }
}

fn to_orders(items: Vec<Item>) -> Result<Vec<Order>> {
    items
        .into_iter()
        .map(|item| from_item(item).map_err(OrderingError::CorruptRecord))
        .collect()
}
