//! Storage WebSocket handler
//!
//! Carries LocalStorage envelopes, one per text frame. The startup envelope
//! is sent as soon as the socket opens.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use super::frame_text;
use crate::api::server::AppState;
use crate::models::Envelope;
use crate::storage::LocalStorageAdapter;

/// WebSocket handler for the LocalStorage adapter
pub async fn storage_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_storage_ws(socket, state.storage))
}

async fn handle_storage_ws(socket: WebSocket, adapter: LocalStorageAdapter) {
    let (mut sender, mut receiver) = socket.split();

    info!("Storage WebSocket connected");

    if !send_envelope(&mut sender, &adapter.startup()).await {
        info!("Storage WebSocket closed before startup");
        return;
    }

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Close(_)) => {
                debug!("Storage WebSocket received close");
                break;
            }
            Ok(msg) => msg,
            Err(e) => {
                debug!("Storage WebSocket error: {}", e);
                break;
            }
        };

        let Some(text) = frame_text(msg) else {
            continue;
        };

        match adapter.handle_text(&text).await {
            Ok(Some(reply)) => {
                if !send_envelope(&mut sender, &reply).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring storage frame: {}", e),
        }
    }

    info!("Storage WebSocket disconnected");
}

/// Returns false once the socket can no longer be written
async fn send_envelope(sender: &mut SplitSink<WebSocket, Message>, envelope: &Envelope) -> bool {
    let json = match serde_json::to_string(envelope) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize storage envelope: {}", e);
            return true;
        }
    };

    sender.send(Message::Text(json)).await.is_ok()
}
