use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserSummary,
};
use crate::db::store::{MessageStore, UserStore};
use crate::error::{AppError, DatabaseError};

#[derive(Debug)]
struct StoredUser {
    profile: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, StoredUser>,
    // Insertion order doubles as send order
    messages: Vec<Message>,
}

impl Tables {
    fn summary(&self, username: &str) -> Result<UserSummary, AppError> {
        self.users
            .get(username)
            .map(|stored| UserSummary::from(&stored.profile))
            .ok_or_else(|| {
                DatabaseError::QueryError(format!("dangling reference to user {}", username)).into()
            })
    }
}

/// Process-local store with the same constraints as the Postgres schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.username) {
            return Err(DatabaseError::Duplicate.into());
        }

        let profile = User {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            join_at: user.join_at,
            last_login_at: None,
        };
        tables.users.insert(
            user.username.clone(),
            StoredUser {
                profile: profile.clone(),
                password_hash: user.password_hash.clone(),
            },
        );

        Ok(profile)
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(username).map(|stored| stored.profile.clone()))
    }

    async fn get_password_hash(&self, username: &str) -> Result<Option<String>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(username).map(|stored| stored.password_hash.clone()))
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        let tables = self.tables.read().await;
        let mut users: Vec<UserSummary> = tables
            .users
            .values()
            .map(|stored| UserSummary::from(&stored.profile))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(username) {
            Some(stored) => {
                stored.profile.last_login_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, message: &Message) -> Result<Message, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&message.from_username)
            || !tables.users.contains_key(&message.to_username)
        {
            return Err(DatabaseError::NotFound.into());
        }
        if tables.messages.iter().any(|m| m.id == message.id) {
            return Err(DatabaseError::Duplicate.into());
        }

        tables.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<MessageDetail>, AppError> {
        let tables = self.tables.read().await;
        let Some(message) = tables.messages.iter().find(|m| m.id == id) else {
            return Ok(None);
        };

        Ok(Some(MessageDetail {
            id: message.id,
            body: message.body.clone(),
            sent_at: message.sent_at,
            read_at: message.read_at,
            from_user: tables.summary(&message.from_username)?,
            to_user: tables.summary(&message.to_username)?,
        }))
    }

    async fn messages_from(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        let tables = self.tables.read().await;
        tables
            .messages
            .iter()
            .filter(|m| m.from_username == username)
            .map(|m| -> Result<SentMessage, AppError> {
                Ok(SentMessage {
                    id: m.id,
                    to_user: tables.summary(&m.to_username)?,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect()
    }

    async fn messages_to(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        let tables = self.tables.read().await;
        tables
            .messages
            .iter()
            .filter(|m| m.to_username == username)
            .map(|m| -> Result<ReceivedMessage, AppError> {
                Ok(ReceivedMessage {
                    id: m.id,
                    from_user: tables.summary(&m.from_username)?,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect()
    }

    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Message>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.read_at.get_or_insert(at);
            m.clone()
        }))
    }
}
