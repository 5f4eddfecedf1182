//! wsrelay - WebSocket chat relay and LocalStorage adapter
//!
//! ## Features
//!
//! - Echo socket answering every frame with a fixed reply
//! - Chat socket with a shared, bounded message log pushed to every client
//!   on a channel-wide timer and to the sender right after each message
//! - LocalStorage socket translating tagged `get`/`put`/`listkeys`/`clear`
//!   commands into key/value store calls
//! - In-memory or PostgreSQL key/value backends

pub mod api;
pub mod chat;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use database::Database;
pub use error::{RelayError, Result};
