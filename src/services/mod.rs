//! Background services

pub mod broadcast;

pub use broadcast::{BroadcastConfig, BroadcastHandle, BroadcastService};
