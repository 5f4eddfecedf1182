//! Per-connection chat state machine

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{RelayError, Result};
use crate::models::ChatMessage;

use super::channel::ChatChannel;
use super::registry::{ConnectionId, Delivery};

/// Lifecycle of a chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// One client's view of a chat channel.
///
/// Opening registers the connection; closing (explicitly or on drop)
/// unregisters it, after which the outbound receiver drains and ends.
pub struct ChatSession {
    id: ConnectionId,
    origin: Option<String>,
    channel: ChatChannel,
    state: SessionState,
}

impl ChatSession {
    /// Register a new connection and return its outbound receiver
    pub fn open(
        channel: ChatChannel,
        origin: Option<String>,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let mut session = Self {
            id: Uuid::new_v4(),
            origin,
            channel,
            state: SessionState::Connecting,
        };

        session.channel.registry().register(session.id, tx);
        session.state = SessionState::Open;
        debug!(connection = %session.id, "Chat session opened");

        (session, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record an inbound message and send the updated log back to this
    /// connection only.
    pub fn receive(&mut self, content: impl Into<String>) -> Result<Delivery> {
        if self.state != SessionState::Open {
            return Err(RelayError::SessionClosed);
        }

        let message = ChatMessage::new(content, self.origin.clone());
        let payload = self.channel.publish(message)?;
        let delivery = self.channel.registry().send_to(&self.id, payload);

        if delivery == Delivery::Closed || delivery == Delivery::NotRegistered {
            self.state = SessionState::Closed;
        }
        Ok(delivery)
    }

    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.channel.registry().unregister(&self.id);
        self.state = SessionState::Closed;
        debug!(connection = %self.id, "Chat session closed");
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}
