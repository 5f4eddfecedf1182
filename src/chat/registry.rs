//! Registry of open chat connections

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier of one accepted connection
pub type ConnectionId = Uuid;

/// Outbound queue of a connection; a writer task drains it into the socket
pub type Outbound = mpsc::Sender<Arc<str>>;

/// Result of a targeted send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Buffer full, payload skipped
    Dropped,
    /// Receiver gone, connection unregistered
    Closed,
    NotRegistered,
}

/// Counters for one broadcast pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
    pub closed: usize,
}

/// Set of live connections of a channel.
///
/// The registry holds the only long-lived sender of each connection, so
/// unregistering is what ends its outbound queue.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Outbound>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection; returns false if the id was already registered
    pub fn register(&self, id: ConnectionId, sender: Outbound) -> bool {
        match self.connections.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(sender);
                true
            }
        }
    }

    /// Remove a connection; returns false if it was not registered
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send a payload to a single connection
    pub fn send_to(&self, id: &ConnectionId, payload: Arc<str>) -> Delivery {
        // Clone the sender so no shard lock is held across unregister
        let sender = match self.connections.get(id) {
            Some(entry) => entry.value().clone(),
            None => return Delivery::NotRegistered,
        };

        match sender.try_send(payload) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => {
                debug!(connection = %id, "Chat connection buffer full, dropping payload");
                Delivery::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                self.unregister(id);
                warn!(connection = %id, "Chat connection closed, unregistered");
                Delivery::Closed
            }
        }
    }

    /// Send a payload to every registered connection.
    ///
    /// A failing connection never stops delivery to the others; closed ones
    /// are unregistered once the pass is done.
    pub fn broadcast(&self, payload: Arc<str>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        for entry in self.connections.iter() {
            match entry.value().try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!(connection = %entry.key(), "Chat connection buffer full, dropping snapshot");
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => closed.push(*entry.key()),
            }
        }

        for id in closed {
            if self.unregister(&id) {
                warn!(connection = %id, "Chat connection closed during broadcast, unregistered");
                report.closed += 1;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &str) -> Arc<str> {
        Arc::from(text)
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(4);

        assert!(registry.register(id, tx.clone()));
        assert!(!registry.register(id, tx));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.unregister(&Uuid::new_v4()));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        registry.register(Uuid::new_v4(), tx_a);
        registry.register(Uuid::new_v4(), tx_b);

        let report = registry.broadcast(payload("[]"));

        assert_eq!(report.delivered, 2);
        assert_eq!(&*rx_a.recv().await.unwrap(), "[]");
        assert_eq!(&*rx_b.recv().await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_broadcast_skips_and_unregisters_closed_connection() {
        let registry = ConnectionRegistry::new();
        let live = Uuid::new_v4();
        let dead = Uuid::new_v4();
        let (tx_live, mut rx_live) = mpsc::channel(4);
        let (tx_dead, rx_dead) = mpsc::channel(4);
        registry.register(live, tx_live);
        registry.register(dead, tx_dead);
        drop(rx_dead);

        let report = registry.broadcast(payload("x"));

        assert_eq!(report.delivered, 1);
        assert_eq!(report.closed, 1);
        assert!(registry.contains(&live));
        assert!(!registry.contains(&dead));
        assert_eq!(&*rx_live.recv().await.unwrap(), "x");
    }

    #[test]
    fn test_broadcast_drops_when_buffer_full() {
        let registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(1);
        registry.register(id, tx);

        assert_eq!(registry.broadcast(payload("1")).delivered, 1);
        let report = registry.broadcast(payload("2"));

        assert_eq!(report.dropped, 1);
        assert!(registry.contains(&id));
    }

    #[test]
    fn test_send_to_unknown_and_closed() {
        let registry = ConnectionRegistry::new();
        assert_eq!(
            registry.send_to(&Uuid::new_v4(), payload("x")),
            Delivery::NotRegistered
        );

        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(1);
        registry.register(id, tx);
        drop(rx);

        assert_eq!(registry.send_to(&id, payload("x")), Delivery::Closed);
        assert!(!registry.contains(&id));
    }

    #[tokio::test]
    async fn test_unregister_ends_outbound_queue() {
        let registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(4);
        registry.register(id, tx);

        registry.unregister(&id);

        assert!(rx.recv().await.is_none());
    }
}
