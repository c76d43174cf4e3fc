//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p kv-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use kv_store::{
    Filter, Item, Key, KeyCondition, KeySchema, KeyValueStore, KeyValueStoreExt, PageRequest,
    PostgresStore, StoreError,
};
use serde_json::json;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/001_create_kv_items.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared table
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE kv_items")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
        .with_table("product", KeySchema::partition("id"))
        .with_table("order", KeySchema::composite("userName", "orderDate"))
}

fn item(value: serde_json::Value) -> Item {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn put_and_get_item() {
    let store = get_test_store().await;

    store
        .put(
            "product",
            item(json!({"id": "p1", "name": "Widget", "price": 9.99})),
        )
        .await
        .unwrap();

    let found = store
        .get("product", &Key::partition("p1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["name"], "Widget");
    assert_eq!(found["price"], 9.99);

    let missing = store.get("product", &Key::partition("p2")).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn update_merges_fields_and_upserts() {
    let store = get_test_store().await;

    store
        .put(
            "product",
            item(json!({"id": "p1", "name": "Widget", "category": "Tools"})),
        )
        .await
        .unwrap();

    let updated = store
        .update(
            "product",
            &Key::partition("p1"),
            item(json!({"price": 42, "order": "reserved word"})),
        )
        .await
        .unwrap();
    assert_eq!(updated["price"], 42);
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["order"], "reserved word");

    let created = store
        .update("product", &Key::partition("p2"), item(json!({"name": "New"})))
        .await
        .unwrap();
    assert_eq!(created["id"], "p2");
}

#[tokio::test]
async fn insert_is_conditional() {
    let store = get_test_store().await;
    let order = item(json!({"userName": "bob", "orderDate": "2024-01-01T00:00:00.000Z"}));

    store.insert("order", order.clone()).await.unwrap();
    let result = store.insert("order", order).await;

    assert!(matches!(
        result,
        Err(StoreError::ConditionalCheckFailed { .. })
    ));
}

#[tokio::test]
async fn delete_twice_succeeds() {
    let store = get_test_store().await;
    store
        .put("product", item(json!({"id": "p1"})))
        .await
        .unwrap();

    store.delete("product", &Key::partition("p1")).await.unwrap();
    store.delete("product", &Key::partition("p1")).await.unwrap();

    assert!(!store.exists("product", &Key::partition("p1")).await.unwrap());
}

#[tokio::test]
async fn scan_pages_through_table() {
    let store = get_test_store().await;
    for i in 0..5 {
        store
            .put("product", item(json!({"id": format!("p{i}")})))
            .await
            .unwrap();
    }
    store
        .insert("order", item(json!({"userName": "bob", "orderDate": "t1"})))
        .await
        .unwrap();

    let first = store
        .scan_page("product", PageRequest::first(3))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.last_key, Some(Key::partition("p2")));

    let rest = store
        .scan_page("product", PageRequest::after(3, Key::partition("p2")))
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 2);
    assert!(rest.is_last());

    assert_eq!(store.scan("product").await.unwrap().len(), 5);
    assert_eq!(store.scan("order").await.unwrap().len(), 1);
}

#[tokio::test]
async fn query_with_sort_condition_and_filter() {
    let store = get_test_store().await;
    for date in ["2024-01-01", "2024-01-02", "2024-02-01"] {
        store
            .insert(
                "order",
                item(json!({"userName": "bob", "orderDate": date, "paymentMethod": "card"})),
            )
            .await
            .unwrap();
    }

    let all = store
        .query("order", &KeyCondition::partition("bob"), None)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["orderDate"], "2024-01-01");

    let exact = store
        .query(
            "order",
            &KeyCondition::partition("bob").sort_equals("2024-01-02"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);

    let filtered = store
        .query(
            "order",
            &KeyCondition::partition("bob"),
            Some(&Filter::contains("paymentMethod", "cash")),
        )
        .await
        .unwrap();
    assert!(filtered.is_empty());
}
