//! WebSocket handlers
//!
//! Outbound traffic goes through bounded per-connection channels drained by
//! a writer task; slow clients lose payloads instead of growing a queue.

use axum::extract::ws::Message;

pub mod chat;
pub mod echo;
pub mod storage;

/// Maximum number of messages to buffer per WebSocket connection
pub const WS_BUFFER_SIZE: usize = 256;

/// Text carried by a data frame; binary frames count when they are UTF-8
pub(crate) fn frame_text(msg: Message) -> Option<String> {
    match msg {
        Message::Text(text) => Some(text),
        Message::Binary(bytes) => String::from_utf8(bytes).ok(),
        _ => None,
    }
}
