//! Product catalog service.

use common::{Item, ProductId, from_item, to_item};
use kv_store::{
    Filter, Key, KeyCondition, KeySchema, KeyValueStore, KeyValueStoreExt, Page, PageRequest,
};

use super::Product;
use crate::error::{DomainError, Result};

/// Service for managing catalog products.
///
/// Products live in a single table keyed by `id`.
pub struct ProductCatalog<S: KeyValueStore> {
    store: S,
    table: String,
}

impl<S: KeyValueStore> ProductCatalog<S> {
    /// Creates a catalog over the given store and table.
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Key schema of the product table.
    pub fn key_schema() -> KeySchema {
        KeySchema::partition(Product::ID_ATTRIBUTE)
    }

    /// Looks up a product. A missing product is `None`, not an error.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Product>> {
        let item = self.store.get(&self.table, &Key::partition(id)).await?;
        Ok(item.map(from_item).transpose()?)
    }

    /// Lists every product. Reads the whole table.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>> {
        let items = self.store.scan(&self.table).await?;
        Ok(items
            .into_iter()
            .map(from_item)
            .collect::<std::result::Result<_, _>>()?)
    }

    /// Lists one page of products.
    #[tracing::instrument(skip(self))]
    pub async fn list_page(&self, page: PageRequest) -> Result<Page<Product>> {
        let page = self.store.scan_page(&self.table, page).await?;
        Ok(page.try_map(from_item)?)
    }

    /// Looks up products by exact `id`, keeping those whose category contains
    /// `category` as a substring.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_category_contains(
        &self,
        id: &str,
        category: &str,
    ) -> Result<Vec<Product>> {
        let filter = Filter::contains("category", category);
        let items = self
            .store
            .query(&self.table, &KeyCondition::partition(id), Some(&filter))
            .await?;
        Ok(items
            .into_iter()
            .map(from_item)
            .collect::<std::result::Result<_, _>>()?)
    }

    /// Creates a product with a freshly generated id.
    ///
    /// Any `id` in `fields` is discarded.
    #[tracing::instrument(skip(self, fields))]
    pub async fn create(&self, mut fields: Item) -> Result<Product> {
        let id = ProductId::generate();
        fields.insert(Product::ID_ATTRIBUTE.to_string(), id.to_string().into());

        let product: Product = from_item(fields)
            .map_err(|e| DomainError::Validation(format!("invalid product: {e}")))?;
        self.store.put(&self.table, to_item(&product)?).await?;

        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Merges `fields` into the product, creating it if absent.
    ///
    /// Fields not mentioned are left untouched and an `id` in `fields` is
    /// ignored. Returns the product after the update.
    #[tracing::instrument(skip(self, fields))]
    pub async fn update(&self, id: &str, mut fields: Item) -> Result<Product> {
        fields.remove(Product::ID_ATTRIBUTE);
        if fields.is_empty() {
            return Err(DomainError::Validation(
                "update contains no fields".to_string(),
            ));
        }

        // Type-check the known attributes before anything is written.
        let mut candidate = fields.clone();
        candidate.insert(Product::ID_ATTRIBUTE.to_string(), id.into());
        from_item::<Product>(candidate)
            .map_err(|e| DomainError::Validation(format!("invalid product fields: {e}")))?;

        let updated = self
            .store
            .update(&self.table, &Key::partition(id), fields)
            .await?;
        Ok(from_item(updated)?)
    }

    /// Deletes a product. Deleting a missing product succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&self.table, &Key::partition(id)).await?;
        Ok(())
    }
}
