//! Bounded, append-only chat log

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;
use crate::models::ChatMessage;

/// Ordered log of chat messages, oldest first.
///
/// Holds at most `capacity` entries; appending to a full log evicts the
/// oldest entry. Readers only ever get owned copies or serialized text.
pub struct MessageLog {
    entries: RwLock<VecDeque<ChatMessage>>,
    capacity: usize,
    total_appended: AtomicU64,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            total_appended: AtomicU64::new(0),
        }
    }

    /// Append a message, returning the evicted entry if the log was full
    pub fn append(&self, message: ChatMessage) -> Option<ChatMessage> {
        let mut entries = self.entries.write();
        self.push_locked(&mut entries, message)
    }

    /// Append a message and serialize the resulting log under the same
    /// write guard, so the appended message is always the last element.
    pub fn append_snapshot_json(&self, message: ChatMessage) -> Result<String> {
        let mut entries = self.entries.write();
        self.push_locked(&mut entries, message);
        Ok(serde_json::to_string(&*entries)?)
    }

    fn push_locked(
        &self,
        entries: &mut VecDeque<ChatMessage>,
        message: ChatMessage,
    ) -> Option<ChatMessage> {
        let evicted = if entries.len() >= self.capacity {
            entries.pop_front()
        } else {
            None
        };
        entries.push_back(message);
        self.total_appended.fetch_add(1, Ordering::Relaxed);
        evicted
    }

    /// Owned point-in-time copy of the log
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.entries.read().iter().cloned().collect()
    }

    /// Serialize the current log as a JSON array
    pub fn snapshot_json(&self) -> Result<String> {
        let entries = self.entries.read();
        Ok(serde_json::to_string(&*entries)?)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages ever appended, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.total_appended.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn msg(content: &str) -> ChatMessage {
        ChatMessage::new(content, Some("http://a.example".to_string()))
    }

    #[test]
    fn test_append_preserves_order() {
        let log = MessageLog::new(10);
        log.append(msg("one"));
        log.append(msg("two"));
        log.append(msg("three"));

        let contents: Vec<_> = log.snapshot().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_full_log_evicts_oldest() {
        let log = MessageLog::new(2);
        assert!(log.append(msg("a")).is_none());
        assert!(log.append(msg("b")).is_none());

        let evicted = log.append(msg("c")).unwrap();
        assert_eq!(evicted.content, "a");

        let contents: Vec<_> = log.snapshot().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["b", "c"]);
        assert_eq!(log.total_appended(), 3);
        assert_eq!(log.capacity(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = MessageLog::new(0);
        log.append(msg("a"));
        log.append(msg("b"));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.snapshot()[0].content, "b");
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let log = MessageLog::new(10);
        log.append(msg("first"));
        let snapshot = log.snapshot();
        log.append(msg("second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_append_snapshot_json_ends_with_appended_message() {
        let log = MessageLog::new(10);
        log.append(msg("earlier"));

        let json = log
            .append_snapshot_json(ChatMessage::new("hello", Some("http://o".to_string())))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let last = value.as_array().unwrap().last().unwrap();

        assert_eq!(last, &serde_json::json!({"message": "hello", "origin": "http://o"}));
    }

    #[test]
    fn test_empty_snapshot_json_is_empty_array() {
        let log = MessageLog::new(4);
        assert!(log.is_empty());
        assert_eq!(log.snapshot_json().unwrap(), "[]");
    }

    #[test]
    fn test_concurrent_appends_are_all_recorded() {
        let log = Arc::new(MessageLog::new(1000));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.append(msg(&format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 200);
        assert_eq!(log.total_appended(), 200);
    }
}
