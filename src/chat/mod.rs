//! Chat broadcast channel
//!
//! A minimal publish/subscribe core: a registry of open connections, a
//! bounded message log shared by all of them, and per-connection sessions
//! that append to the log and get the whole log back.

pub mod channel;
pub mod log;
pub mod registry;
pub mod session;

pub use channel::ChatChannel;
pub use log::MessageLog;
pub use registry::{BroadcastReport, ConnectionId, ConnectionRegistry, Delivery, Outbound};
pub use session::{ChatSession, SessionState};
