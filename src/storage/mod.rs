//! Key/value persistence behind the LocalStorage adapter

pub mod adapter;
pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;

use crate::database::PoolUsage;
use crate::error::Result;

pub use adapter::LocalStorageAdapter;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// String key/value store with prefix operations
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the stored text for a key
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a key
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; absent keys are not an error
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, sorted
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove all keys starting with `prefix`, returning how many were removed
    async fn remove_prefix(&self, prefix: &str) -> Result<u64>;

    /// Remove every key, returning how many were removed
    async fn clear(&self) -> Result<u64>;

    /// Number of stored keys
    async fn len(&self) -> Result<u64>;

    /// Round-trip latency of a trivial operation
    async fn health_check(&self) -> Result<Duration>;

    /// Backend name used in status reports
    fn backend(&self) -> &'static str;

    /// Connection pool usage, for backends that hold one
    fn pool_usage(&self) -> Option<PoolUsage> {
        None
    }
}
