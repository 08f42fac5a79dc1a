//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `codipop-core`. Values are opaque text; callers
//! that store structured data encode it themselves.

use chrono::Utc;
use codipop_core::storage::kv_store::KvStore;
use codipop_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|e| RepositoryError::Query(e.to_string()))
        })
        .transpose()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO kv_store (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteKvStore::new(pool);

        store
            .set("dailyTryOnQuota", r#"{"date":"2024-09-05","count":2}"#)
            .await
            .unwrap();

        let got = store.get("dailyTryOnQuota").await.unwrap();
        assert_eq!(got.as_deref(), Some(r#"{"date":"2024-09-05","count":2}"#));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteKvStore::new(pool);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteKvStore::new(pool);

        store.set("hasOnboarded", "false").await.unwrap();
        store.set("hasOnboarded", "true").await.unwrap();

        assert_eq!(store.get("hasOnboarded").await.unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_delete_and_delete_nonexistent() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteKvStore::new(pool);

        store.set("temp", "value").await.unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());

        store.delete("nope").await.unwrap();
    }
}
