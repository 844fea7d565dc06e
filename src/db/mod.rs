//! Database module for the messaging server
//!
//! Store traits for users and messages, the Postgres implementation
//! and an in-memory one used by tests and `memory:` deployments.

pub mod memory;
pub mod models;
pub mod operations;
pub mod store;

pub use memory::MemoryStore;
pub use models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserSummary,
};
pub use operations::DbOperations;
pub use store::{MessageStore, UserStore};
