use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Filter, Item, Key, KeyCondition, KeySchema, Page, PageRequest, Result, StoreError,
    store::KeyValueStore,
};

/// Store operations that can be made to fail on purpose in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Get,
    Put,
    Update,
    Delete,
    Scan,
    Query,
}

impl StoreOperation {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        self as usize
    }

    fn as_str(self) -> &'static str {
        match self {
            StoreOperation::Get => "get",
            StoreOperation::Put => "put",
            StoreOperation::Update => "update",
            StoreOperation::Delete => "delete",
            StoreOperation::Scan => "scan",
            StoreOperation::Query => "query",
        }
    }
}

type Table = BTreeMap<Key, Item>;

/// In-memory key-value store.
///
/// Provides the same interface and key semantics as the PostgreSQL
/// implementation. Items are kept per table in key order. Individual
/// operations can be configured to fail, which simulates an unavailable
/// backing service.
#[derive(Clone)]
pub struct InMemoryStore {
    schemas: Arc<HashMap<String, KeySchema>>,
    tables: Arc<RwLock<HashMap<String, Table>>>,
    failures: Arc<[AtomicBool; StoreOperation::COUNT]>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            schemas: Arc::default(),
            tables: Arc::default(),
            failures: Arc::new(std::array::from_fn(|_| AtomicBool::new(false))),
        }
    }
}

impl InMemoryStore {
    /// Creates a new store without tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table with its key schema.
    pub fn with_table(mut self, name: impl Into<String>, schema: KeySchema) -> Self {
        Arc::make_mut(&mut self.schemas).insert(name.into(), schema);
        self
    }

    /// Configures the store to fail every call of `operation`.
    pub fn set_fail_on(&self, operation: StoreOperation, fail: bool) {
        self.failures[operation.index()].store(fail, Ordering::SeqCst);
    }

    /// Returns the number of items in a table.
    pub async fn item_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, BTreeMap::len)
    }

    fn schema(&self, table: &str) -> Result<&KeySchema> {
        self.schemas
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn check_failure(&self, operation: StoreOperation) -> Result<()> {
        if self.failures[operation.index()].load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "injected failure on {}",
                operation.as_str()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, table: &str, key: &Key) -> Result<Option<Item>> {
        self.check_failure(StoreOperation::Get)?;
        self.schema(table)?.validate(table, key)?;

        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|items| items.get(key)).cloned())
    }

    async fn put(&self, table: &str, item: Item) -> Result<()> {
        self.check_failure(StoreOperation::Put)?;
        let key = self.schema(table)?.key_of(table, &item)?;

        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().insert(key, item);
        Ok(())
    }

    async fn insert(&self, table: &str, item: Item) -> Result<()> {
        self.check_failure(StoreOperation::Put)?;
        let key = self.schema(table)?.key_of(table, &item)?;

        let mut tables = self.tables.write().await;
        let items = tables.entry(table.to_string()).or_default();
        if items.contains_key(&key) {
            return Err(StoreError::ConditionalCheckFailed {
                table: table.to_string(),
            });
        }
        items.insert(key, item);
        Ok(())
    }

    async fn update(&self, table: &str, key: &Key, changes: Item) -> Result<Item> {
        self.check_failure(StoreOperation::Update)?;
        let schema = self.schema(table)?;
        schema.validate(table, key)?;
        schema.validate_changes(table, &changes)?;

        let mut tables = self.tables.write().await;
        let item = tables
            .entry(table.to_string())
            .or_default()
            .entry(key.clone())
            .or_insert_with(|| schema.key_attributes(key));
        item.extend(changes);
        Ok(item.clone())
    }

    async fn delete(&self, table: &str, key: &Key) -> Result<()> {
        self.check_failure(StoreOperation::Delete)?;
        self.schema(table)?.validate(table, key)?;

        let mut tables = self.tables.write().await;
        if let Some(items) = tables.get_mut(table) {
            items.remove(key);
        }
        Ok(())
    }

    async fn scan_page(&self, table: &str, page: PageRequest) -> Result<Page<Item>> {
        self.check_failure(StoreOperation::Scan)?;
        self.schema(table)?;

        let tables = self.tables.read().await;
        let Some(items) = tables.get(table) else {
            return Ok(Page {
                items: Vec::new(),
                last_key: None,
            });
        };

        let lower = page.start_after.map_or(Bound::Unbounded, Bound::Excluded);
        let mut range = items.range((lower, Bound::Unbounded));
        let limit = page.limit.unwrap_or(usize::MAX);

        let mut result = Vec::new();
        let mut last_key = None;
        for (key, item) in range.by_ref().take(limit) {
            result.push(item.clone());
            last_key = Some(key.clone());
        }

        let more = range.next().is_some();
        Ok(Page {
            items: result,
            last_key: if more { last_key } else { None },
        })
    }

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        filter: Option<&Filter>,
    ) -> Result<Vec<Item>> {
        self.check_failure(StoreOperation::Query)?;
        self.schema(table)?;

        let tables = self.tables.read().await;
        let Some(items) = tables.get(table) else {
            return Ok(Vec::new());
        };

        // Keys order by partition first, so one partition is a contiguous range.
        let start = Key::partition(condition.partition.clone());
        let results = items
            .range(start..)
            .take_while(|(key, _)| key.partition == condition.partition)
            .filter(|(key, _)| condition.matches(key))
            .map(|(_, item)| item)
            .filter(|item| filter.is_none_or(|f| f.matches(item)))
            .cloned()
            .collect();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::KeyValueStoreExt;

    fn item(value: serde_json::Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_table("product", KeySchema::partition("id"))
            .with_table("order", KeySchema::composite("userName", "orderDate"))
    }

    #[tokio::test]
    async fn put_and_get() {
        let store = store();
        store
            .put("product", item(json!({"id": "p1", "name": "Widget"})))
            .await
            .unwrap();

        let found = store.get("product", &Key::partition("p1")).await.unwrap();
        assert_eq!(found.unwrap()["name"], "Widget");

        let missing = store.get("product", &Key::partition("p2")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn put_replaces_whole_item() {
        let store = store();
        store
            .put("product", item(json!({"id": "p1", "name": "A", "price": 1})))
            .await
            .unwrap();
        store
            .put("product", item(json!({"id": "p1", "name": "B"})))
            .await
            .unwrap();

        let found = store
            .get("product", &Key::partition("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["name"], "B");
        assert!(!found.contains_key("price"));
    }

    #[tokio::test]
    async fn unknown_table_is_an_error() {
        let store = store();
        let result = store.get("nope", &Key::partition("x")).await;
        assert!(matches!(result, Err(StoreError::TableNotFound(_))));
    }

    #[tokio::test]
    async fn insert_refuses_existing_key() {
        let store = store();
        let order = item(json!({"userName": "bob", "orderDate": "t1", "totalPrice": 1}));
        store.insert("order", order.clone()).await.unwrap();

        let result = store.insert("order", order).await;
        assert!(matches!(
            result,
            Err(StoreError::ConditionalCheckFailed { .. })
        ));
        assert_eq!(store.item_count("order").await, 1);
    }

    #[tokio::test]
    async fn update_merges_and_upserts() {
        let store = store();
        store
            .put(
                "product",
                item(json!({"id": "p1", "name": "Widget", "price": 10})),
            )
            .await
            .unwrap();

        let updated = store
            .update("product", &Key::partition("p1"), item(json!({"price": 42})))
            .await
            .unwrap();
        assert_eq!(updated["price"], 42);
        assert_eq!(updated["name"], "Widget");

        let created = store
            .update("product", &Key::partition("p9"), item(json!({"name": "New"})))
            .await
            .unwrap();
        assert_eq!(created["id"], "p9");
        assert_eq!(created["name"], "New");
    }

    #[tokio::test]
    async fn update_accepts_reserved_word_attribute_names() {
        let store = store();
        let changes = item(json!({"name": "n", "size": "L", "status": "x", "a b": 1}));
        let updated = store
            .update("product", &Key::partition("p1"), changes)
            .await
            .unwrap();
        assert_eq!(updated["a b"], 1);
        assert_eq!(updated["status"], "x");
    }

    #[tokio::test]
    async fn update_rejects_key_change() {
        let store = store();
        let result = store
            .update("product", &Key::partition("p1"), item(json!({"id": "p2"})))
            .await;
        assert!(matches!(result, Err(StoreError::KeyAttributeUpdate { .. })));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        store
            .put("product", item(json!({"id": "p1"})))
            .await
            .unwrap();

        store.delete("product", &Key::partition("p1")).await.unwrap();
        store.delete("product", &Key::partition("p1")).await.unwrap();
        assert_eq!(store.item_count("product").await, 0);
    }

    #[tokio::test]
    async fn scan_pages_follow_continuation_keys() {
        let store = store();
        for i in 0..5 {
            store
                .put("product", item(json!({"id": format!("p{i}")})))
                .await
                .unwrap();
        }

        let first = store
            .scan_page("product", PageRequest::first(2))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.last_key, Some(Key::partition("p1")));

        let second = store
            .scan_page("product", PageRequest::after(2, Key::partition("p1")))
            .await
            .unwrap();
        assert_eq!(second.items[0]["id"], "p2");

        let last = store
            .scan_page("product", PageRequest::after(2, Key::partition("p3")))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.is_last());

        let all = store.scan("product").await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn query_by_partition_and_sort() {
        let store = store();
        for (user, date) in [("bob", "t1"), ("bob", "t2"), ("bobby", "t1"), ("alice", "t1")] {
            store
                .insert("order", item(json!({"userName": user, "orderDate": date})))
                .await
                .unwrap();
        }

        let bob = store
            .query("order", &KeyCondition::partition("bob"), None)
            .await
            .unwrap();
        assert_eq!(bob.len(), 2);
        assert_eq!(bob[0]["orderDate"], "t1");
        assert_eq!(bob[1]["orderDate"], "t2");

        let exact = store
            .query(
                "order",
                &KeyCondition::partition("bob").sort_equals("t2"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0]["orderDate"], "t2");
    }

    #[tokio::test]
    async fn query_applies_filter() {
        let store = store();
        store
            .put("product", item(json!({"id": "p1", "category": "Phone"})))
            .await
            .unwrap();

        let matching = store
            .query(
                "product",
                &KeyCondition::partition("p1"),
                Some(&Filter::contains("category", "Pho")),
            )
            .await
            .unwrap();
        assert_eq!(matching.len(), 1);

        let filtered_out = store
            .query(
                "product",
                &KeyCondition::partition("p1"),
                Some(&Filter::contains("category", "Tablet")),
            )
            .await
            .unwrap();
        assert!(filtered_out.is_empty());
    }

    #[tokio::test]
    async fn injected_failures_surface_as_unavailable() {
        let store = store();
        store.set_fail_on(StoreOperation::Delete, true);

        let result = store.delete("product", &Key::partition("p1")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.set_fail_on(StoreOperation::Delete, false);
        assert!(store.delete("product", &Key::partition("p1")).await.is_ok());
    }
}
