use std::sync::Arc;

use crate::error::Result;
use crate::models::ChatMessage;

use super::log::MessageLog;
use super::registry::{BroadcastReport, ConnectionRegistry};

/// One broadcast channel: its connections plus its shared log.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ChatChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    registry: ConnectionRegistry,
    log: MessageLog,
}

impl ChatChannel {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                registry: ConnectionRegistry::new(),
                log: MessageLog::new(log_capacity),
            }),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn log(&self) -> &MessageLog {
        &self.inner.log
    }

    /// Append a message and return the serialized log that now ends with it
    pub fn publish(&self, message: ChatMessage) -> Result<Arc<str>> {
        let json = self.inner.log.append_snapshot_json(message)?;
        Ok(Arc::from(json))
    }

    /// Push the current log to every registered connection
    pub fn broadcast_snapshot(&self) -> Result<BroadcastReport> {
        if self.inner.registry.is_empty() {
            return Ok(BroadcastReport::default());
        }

        let payload: Arc<str> = Arc::from(self.inner.log.snapshot_json()?);
        Ok(self.inner.registry.broadcast(payload))
    }
}
