use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::models::{Message, MessageDetail, ReceivedMessage, SentMessage};
use crate::db::store::{MessageStore, UserStore};
use crate::error::{AppError, AuthError};

pub struct MessagingService {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
}

impl MessagingService {
    pub fn new(users: Arc<dyn UserStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { users, messages }
    }

    /// Self-addressed messages are allowed.
    pub async fn send(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message, AppError> {
        self.ensure_user(from_username).await?;
        self.ensure_user(to_username).await?;

        let message = Message::new(from_username.to_string(), to_username.to_string(), body.to_string());
        let message = self.messages.insert_message(&message).await?;

        info!("Message {} sent from {} to {}", message.id, from_username, to_username);
        Ok(message)
    }

    pub async fn get(&self, id: Uuid) -> Result<MessageDetail, AppError> {
        self.messages
            .get_message(id)
            .await?
            .ok_or_else(|| no_such_message(id))
    }

    /// Like [`get`](Self::get), but only for the sender or the recipient.
    pub async fn get_as(&self, id: Uuid, requesting_username: &str) -> Result<MessageDetail, AppError> {
        let message = self.get(id).await?;
        if !message.is_party(requesting_username) {
            warn!("{} is not a party to message {}", requesting_username, id);
            return Err(AuthError::Unauthorized.into());
        }
        Ok(message)
    }

    /// Empty when the user exists but has sent nothing.
    pub async fn list_sent_by(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        self.ensure_user(username).await?;
        self.messages.messages_from(username).await
    }

    /// Empty when the user exists but has received nothing.
    pub async fn list_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        self.ensure_user(username).await?;
        self.messages.messages_to(username).await
    }

    /// Only the recipient may mark a message read. Marking twice keeps the
    /// first `read_at`.
    pub async fn mark_read(&self, id: Uuid, requesting_username: &str) -> Result<Message, AppError> {
        let message = self.get(id).await?;
        if message.to_user.username != requesting_username {
            warn!("{} tried to mark message {} read", requesting_username, id);
            return Err(AuthError::Unauthorized.into());
        }

        let message = self
            .messages
            .mark_read(id, Utc::now())
            .await?
            .ok_or_else(|| no_such_message(id))?;

        info!("Message {} read by {}", id, requesting_username);
        Ok(message)
    }

    async fn ensure_user(&self, username: &str) -> Result<(), AppError> {
        match self.users.get_user(username).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("No such user: {}", username))),
        }
    }
}

fn no_such_message(id: Uuid) -> AppError {
    AppError::NotFound(format!("No such message: {}", id))
}
