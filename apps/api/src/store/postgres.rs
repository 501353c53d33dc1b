use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use super::{KvStore, StoreError, Versioned};

/// Postgres-backed key-value store. One row per key; `version` starts at 1
/// and increments on every successful write.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects, bootstraps the schema, and returns a ready store.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key     TEXT PRIMARY KEY,
                value   JSONB NOT NULL,
                version BIGINT NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KvStore for PgStore {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value) VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, version = kv_entries.version + 1
            "#,
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: Value) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        let row: Option<(Value, i64)> =
            sqlx::query_as("SELECT value, version FROM kv_entries WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value, version)| Versioned { value, version }))
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: Value,
        expected: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE kv_entries SET value = $2, version = version + 1 WHERE key = $1 AND version = $3",
        )
        .bind(key)
        .bind(&value)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict {
                key: key.to_string(),
                expected,
            });
        }
        Ok(())
    }

    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, StoreError> {
        let rows: Vec<(String, Value, i64)> =
            sqlx::query_as("SELECT key, value, version FROM kv_entries WHERE starts_with(key, $1)")
                .bind(prefix)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(key, value, version)| (key, Versioned { value, version }))
            .collect())
    }
}
