use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::KeyValueStore;
use crate::database::{Database, PoolUsage};
use crate::error::Result;

/// Store backed by the `local_storage` table
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = $1")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = $1")
            .bind(key)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM local_storage WHERE starts_with(key, $1) ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(self.db.pool())
        .await?;

        Ok(keys)
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM local_storage WHERE starts_with(key, $1)")
            .bind(prefix)
            .execute(self.db.pool())
            .await?;

        debug!(prefix = prefix, removed = result.rows_affected(), "Removed keys by prefix");
        Ok(result.rows_affected())
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM local_storage")
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn len(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM local_storage")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn health_check(&self) -> Result<Duration> {
        self.db.health_check().await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn pool_usage(&self) -> Option<PoolUsage> {
        Some(self.db.usage())
    }
}
