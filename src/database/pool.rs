use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::config::{Config, DatabaseConfig};
use crate::error::{RelayError, Result};

/// Connections currently held by the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolUsage {
    pub size: u32,
    pub idle: usize,
}

/// Postgres pool holding the `local_storage` table
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with the `DB_*` settings and bring the schema up to date.
    pub async fn open(config: &Config) -> Result<Self> {
        info!(
            host = %config.database.host,
            port = %config.database.port,
            database = %config.database.name,
            "Opening storage database"
        );

        let db = Self::connect(&config.database_url(), &config.database).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Connect to `url` without touching the schema
    pub async fn connect(url: &str, settings: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(settings.min_connections)
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(30 * 60))
            .connect(url)
            .await
            .map_err(|e| RelayError::DatabaseConnection(e.to_string()))?;

        debug!(
            max_connections = settings.max_connections,
            "Storage pool connected"
        );
        Ok(Database { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn usage(&self) -> PoolUsage {
        PoolUsage {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// Round-trip time of `SELECT 1`
    pub async fn health_check(&self) -> Result<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(start.elapsed())
    }

    /// Apply pending migrations; already-applied versions are skipped
    pub async fn run_migrations(&self) -> Result<()> {
        super::migrations::run_migrations(&self.pool).await
    }

    pub async fn close(&self) {
        info!("Closing storage database");
        self.pool.close().await;
    }
}
