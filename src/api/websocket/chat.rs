//! Chat WebSocket handler
//!
//! Every inbound message is appended to the shared log and the whole log is
//! sent straight back to the sender; the broadcast service pushes the log to
//! everyone else on its own timer.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::{frame_text, WS_BUFFER_SIZE};
use crate::api::server::AppState;
use crate::chat::ChatSession;

/// WebSocket handler for the chat channel
pub async fn chat_ws(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    ws.on_upgrade(move |socket| handle_chat_ws(socket, state, origin))
}

/// Handle WebSocket connection for chat
async fn handle_chat_ws(socket: WebSocket, state: AppState, origin: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let (mut session, mut rx) = ChatSession::open(state.chat.clone(), origin, WS_BUFFER_SIZE);
    let id = session.id();

    info!(
        connection = %id,
        origin = session.origin().unwrap_or("-"),
        connections = state.chat.registry().len(),
        "Chat WebSocket connected"
    );

    // Drain the session's outbound queue into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.to_string())).await.is_err() {
                break;
            }
        }
    });

    // Feed inbound frames into the session; dropping it unregisters
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(Message::Close(_)) => {
                    debug!(connection = %id, "Chat WebSocket received close");
                    break;
                }
                Ok(msg) => msg,
                Err(e) => {
                    debug!(connection = %id, "Chat WebSocket error: {}", e);
                    break;
                }
            };

            let Some(text) = frame_text(msg) else {
                continue;
            };

            debug!(connection = %id, "Chat message received: {}", text);
            if let Err(e) = session.receive(text) {
                warn!(connection = %id, "Failed to record chat message: {}", e);
                break;
            }
        }
        session.close();
    });

    // Wait for either side to finish
    tokio::select! {
        _ = &mut send_task => {}
        _ = &mut receive_task => {}
    }

    send_task.abort();
    receive_task.abort();
    let _ = tokio::join!(send_task, receive_task);

    info!(connection = %id, "Chat WebSocket disconnected");
}
