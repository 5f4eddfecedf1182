//! LocalStorage command dispatcher
//!
//! Translates [`Command`]s into [`KeyValueStore`] calls. Values are kept as
//! JSON text; reads that fail to parse, non-text keys and store failures all
//! degrade to `null`/empty results instead of surfacing to the client.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::Result;
use crate::models::{ClearTarget, Command, Envelope, Reply};

#[derive(Clone)]
pub struct LocalStorageAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl LocalStorageAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Envelope announcing that the adapter is ready
    pub fn startup(&self) -> Envelope {
        Reply::Startup.into_envelope()
    }

    /// Parse one inbound frame and run it.
    ///
    /// Returns `Ok(None)` for commands that have no reply.
    pub async fn handle_text(&self, text: &str) -> Result<Option<Envelope>> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let command = Command::try_from(envelope)?;
        Ok(self.dispatch(command).await.map(Reply::into_envelope))
    }

    pub async fn dispatch(&self, command: Command) -> Option<Reply> {
        debug!(tag = command.tag(), "Dispatching storage command");

        match command {
            Command::Get { label, key } => {
                let value = self.get(key.as_ref()).await;
                Some(Reply::Got { label, key, value })
            }
            Command::Put { key, value } => {
                self.put(key.as_ref(), value.as_ref()).await;
                None
            }
            Command::ListKeys { label, prefix } => {
                let keys = self.list_keys(prefix.as_ref()).await;
                Some(Reply::Keys {
                    label,
                    prefix,
                    keys,
                })
            }
            Command::Clear(target) => {
                self.clear(&target).await;
                None
            }
        }
    }

    async fn get(&self, key: Option<&Value>) -> Value {
        let Some(key) = key.and_then(Value::as_str) else {
            return Value::Null;
        };

        match self.store.get_item(key).await {
            Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
                debug!(key = key, "Stored value is not valid JSON: {}", e);
                Value::Null
            }),
            Ok(None) => Value::Null,
            Err(e) => {
                warn!(key = key, "Failed to read key: {}", e);
                Value::Null
            }
        }
    }

    async fn put(&self, key: Option<&Value>, value: Option<&Value>) {
        let Some(key) = key.and_then(Value::as_str) else {
            debug!("Ignoring put with non-text key");
            return;
        };
        let Some(value) = value else {
            debug!(key = key, "Ignoring put without a value");
            return;
        };

        let result = if value.is_null() {
            self.store.remove_item(key).await
        } else {
            match serde_json::to_string(value) {
                Ok(text) => self.store.set_item(key, &text).await,
                Err(e) => {
                    debug!(key = key, "Failed to encode value: {}", e);
                    return;
                }
            }
        };

        if let Err(e) = result {
            warn!(key = key, "Failed to write key: {}", e);
        }
    }

    async fn list_keys(&self, prefix: Option<&Value>) -> Vec<String> {
        let Some(prefix) = prefix.and_then(Value::as_str) else {
            return Vec::new();
        };

        self.store
            .keys_with_prefix(prefix)
            .await
            .unwrap_or_else(|e| {
                warn!(prefix = prefix, "Failed to list keys: {}", e);
                Vec::new()
            })
    }

    async fn clear(&self, target: &ClearTarget) {
        let result = match target {
            ClearTarget::All => self.store.clear().await,
            ClearTarget::Prefix(prefix) => self.store.remove_prefix(prefix).await,
            ClearTarget::Ignored => {
                debug!("Ignoring clear with non-text prefix");
                return;
            }
        };

        match result {
            Ok(removed) => debug!(removed = removed, "Cleared storage keys"),
            Err(e) => warn!("Failed to clear storage: {}", e),
        }
    }
}
