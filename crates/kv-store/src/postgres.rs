use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Filter, Item, Key, KeyCondition, KeySchema, Page, PageRequest, Result, StoreError,
    store::KeyValueStore,
};

/// PostgreSQL-backed key-value store.
///
/// All logical tables share the `kv_items` table. Items are stored as JSONB;
/// tables without a sort key store an empty sort key column.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    schemas: Arc<HashMap<String, KeySchema>>,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store without tables.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schemas: Arc::default(),
        }
    }

    /// Registers a table with its key schema.
    pub fn with_table(mut self, name: impl Into<String>, schema: KeySchema) -> Self {
        Arc::make_mut(&mut self.schemas).insert(name.into(), schema);
        self
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn schema(&self, table: &str) -> Result<&KeySchema> {
        self.schemas
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn sort_column(key: &Key) -> &str {
        key.sort.as_deref().unwrap_or("")
    }

    fn row_to_item(row: &PgRow) -> Result<Item> {
        let Json(item): Json<Item> = row.try_get("item")?;
        Ok(item)
    }

    fn row_to_key(row: &PgRow, schema: &KeySchema) -> Result<Key> {
        let partition: String = row.try_get("partition_key")?;
        let sort: String = row.try_get("sort_key")?;
        Ok(Key {
            partition,
            sort: schema.sort_key.as_ref().map(|_| sort),
        })
    }
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, table: &str, key: &Key) -> Result<Option<Item>> {
        self.schema(table)?.validate(table, key)?;

        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT item
            FROM kv_items
            WHERE table_name = $1 AND partition_key = $2 AND sort_key = $3
            "#,
        )
        .bind(table)
        .bind(&key.partition)
        .bind(Self::sort_column(key))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn put(&self, table: &str, item: Item) -> Result<()> {
        let key = self.schema(table)?.key_of(table, &item)?;

        sqlx::query(
            r#"
            INSERT INTO kv_items (table_name, partition_key, sort_key, item)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (table_name, partition_key, sort_key) DO UPDATE SET
                item = EXCLUDED.item,
                updated_at = NOW()
            "#,
        )
        .bind(table)
        .bind(&key.partition)
        .bind(Self::sort_column(&key))
        .bind(Json(&item))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, table: &str, item: Item) -> Result<()> {
        let key = self.schema(table)?.key_of(table, &item)?;

        let result = sqlx::query(
            r#"
            INSERT INTO kv_items (table_name, partition_key, sort_key, item)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (table_name, partition_key, sort_key) DO NOTHING
            "#,
        )
        .bind(table)
        .bind(&key.partition)
        .bind(Self::sort_column(&key))
        .bind(Json(&item))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionalCheckFailed {
                table: table.to_string(),
            });
        }
        Ok(())
    }

    async fn update(&self, table: &str, key: &Key, changes: Item) -> Result<Item> {
        let schema = self.schema(table)?;
        schema.validate(table, key)?;
        schema.validate_changes(table, &changes)?;

        // Attribute names travel inside the JSONB parameter, never in the SQL text.
        let mut patch = schema.key_attributes(key);
        patch.extend(changes);

        let row = sqlx::query(
            r#"
            INSERT INTO kv_items (table_name, partition_key, sort_key, item)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (table_name, partition_key, sort_key) DO UPDATE SET
                item = kv_items.item || EXCLUDED.item,
                updated_at = NOW()
            RETURNING item
            "#,
        )
        .bind(table)
        .bind(&key.partition)
        .bind(Self::sort_column(key))
        .bind(Json(&patch))
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_item(&row)
    }

    async fn delete(&self, table: &str, key: &Key) -> Result<()> {
        self.schema(table)?.validate(table, key)?;

        sqlx::query(
            r#"
            DELETE FROM kv_items
            WHERE table_name = $1 AND partition_key = $2 AND sort_key = $3
            "#,
        )
        .bind(table)
        .bind(&key.partition)
        .bind(Self::sort_column(key))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn scan_page(&self, table: &str, page: PageRequest) -> Result<Page<Item>> {
        let schema = self.schema(table)?;
        // Fetch one extra row to learn whether another page exists.
        let fetch_limit = page
            .limit
            .map_or(i64::MAX, |limit| i64::try_from(limit).unwrap_or(i64::MAX - 1) + 1);

        let rows = match &page.start_after {
            Some(after) => {
                sqlx::query(
                    r#"
                    SELECT partition_key, sort_key, item
                    FROM kv_items
                    WHERE table_name = $1 AND (partition_key, sort_key) > ($2, $3)
                    ORDER BY partition_key ASC, sort_key ASC
                    LIMIT $4
                    "#,
                )
                .bind(table)
                .bind(&after.partition)
                .bind(Self::sort_column(after))
                .bind(fetch_limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT partition_key, sort_key, item
                    FROM kv_items
                    WHERE table_name = $1
                    ORDER BY partition_key ASC, sort_key ASC
                    LIMIT $2
                    "#,
                )
                .bind(table)
                .bind(fetch_limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let limit = page.limit.unwrap_or(usize::MAX);
        let more = rows.len() > limit;

        let mut items = Vec::with_capacity(rows.len().min(limit));
        let mut last_key = None;
        for row in rows.iter().take(limit) {
            items.push(Self::row_to_item(row)?);
            last_key = Some(Self::row_to_key(row, schema)?);
        }

        Ok(Page {
            items,
            last_key: if more { last_key } else { None },
        })
    }

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        filter: Option<&Filter>,
    ) -> Result<Vec<Item>> {
        self.schema(table)?;

        let rows = match &condition.sort {
            None => {
                sqlx::query(
                    r#"
                    SELECT item FROM kv_items
                    WHERE table_name = $1 AND partition_key = $2
                    ORDER BY sort_key ASC
                    "#,
                )
                .bind(table)
                .bind(&condition.partition)
                .fetch_all(&self.pool)
                .await?
            }
            Some(sort) => {
                sqlx::query(
                    r#"
                    SELECT item FROM kv_items
                    WHERE table_name = $1 AND partition_key = $2 AND sort_key = $3
                    "#,
                )
                .bind(table)
                .bind(&condition.partition)
                .bind(sort)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let item = Self::row_to_item(row)?;
            if filter.is_none_or(|f| f.matches(&item)) {
                items.push(item);
            }
        }
        Ok(items)
    }
}
