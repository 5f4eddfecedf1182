pub mod chat;
pub mod storage;

pub use chat::*;
pub use storage::*;
