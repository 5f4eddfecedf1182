//! HTTP and WebSocket surface
//!
//! Serves the echo, chat and storage sockets next to health/status endpoints.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{ApiServer, AppState};
