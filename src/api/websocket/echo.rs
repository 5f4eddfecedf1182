//! Echo WebSocket handler
//!
//! Answers every data frame with one fixed text reply. Keeps no state.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::api::server::AppState;

/// WebSocket handler for the echo endpoint
pub async fn echo_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let reply = state.config.chat.echo_reply.clone();
    ws.on_upgrade(move |socket| handle_echo_ws(socket, reply))
}

async fn handle_echo_ws(socket: WebSocket, reply: String) {
    let (mut sender, mut receiver) = socket.split();

    info!("Echo WebSocket connected");

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                info!("Echo WebSocket received: {}", text);
            }
            Ok(Message::Binary(bytes)) => {
                info!("Echo WebSocket received {} bytes", bytes.len());
            }
            Ok(Message::Close(frame)) => {
                debug!("Echo WebSocket received close: {:?}", frame);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                debug!("Echo WebSocket error: {}", e);
                break;
            }
        }

        if sender.send(Message::Text(reply.clone())).await.is_err() {
            break;
        }
    }

    info!("Echo WebSocket disconnected");
}
