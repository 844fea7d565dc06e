use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserSummary,
};
use crate::error::AppError;

/// Persistence for accounts and their credentials.
///
/// Uniqueness of `username` is the store's job: `insert_user` reports a
/// taken name as `DatabaseError::Duplicate` even under concurrent inserts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError>;

    async fn get_user(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn get_password_hash(&self, username: &str) -> Result<Option<String>, AppError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, AppError>;

    /// Returns `false` when no such user exists.
    async fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
}

/// Persistence for directed messages between users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: &Message) -> Result<Message, AppError>;

    async fn get_message(&self, id: Uuid) -> Result<Option<MessageDetail>, AppError>;

    /// Ordered by `sent_at`, oldest first.
    async fn messages_from(&self, username: &str) -> Result<Vec<SentMessage>, AppError>;

    /// Ordered by `sent_at`, oldest first.
    async fn messages_to(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError>;

    /// Sets `read_at` only if it is still null; an already-read message keeps
    /// its original timestamp. `None` when the message does not exist.
    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Message>, AppError>;
}
