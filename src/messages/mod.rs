//! Messaging module
//!
//! Sending, reading and read-marking of messages between users.

pub mod handlers;
mod service;

pub use service::MessagingService;
