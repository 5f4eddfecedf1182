//! Route definitions

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::server::AppState;
use super::websocket;

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/status", get(handlers::health::status))
        // WebSocket endpoints
        .route("/hello", get(websocket::echo::echo_ws))
        .route("/chat", get(websocket::chat::chat_ws))
        .route("/storage", get(websocket::storage::storage_ws))
        .with_state(state)
}
