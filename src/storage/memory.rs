use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::KeyValueStore;
use crate::error::Result;

/// In-process store; contents live as long as the process
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching_keys(items: &BTreeMap<String, String>, prefix: &str) -> Vec<String> {
        items
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(Self::matching_keys(&self.items.read(), prefix))
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<u64> {
        let mut items = self.items.write();
        let keys = Self::matching_keys(&items, prefix);
        for key in &keys {
            items.remove(key);
        }
        Ok(keys.len() as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let mut items = self.items.write();
        let removed = items.len() as u64;
        items.clear();
        Ok(removed)
    }

    async fn len(&self) -> Result<u64> {
        Ok(self.items.read().len() as u64)
    }

    async fn health_check(&self) -> Result<Duration> {
        let start = Instant::now();
        let _ = self.items.read().len();
        Ok(start.elapsed())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
