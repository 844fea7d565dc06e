//! User directory: public profile lookups and per-user message listings.

pub mod handlers;

use std::sync::Arc;

use crate::db::models::{User, UserSummary};
use crate::db::store::UserStore;
use crate::error::AppError;

pub struct UserDirectory {
    users: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn all(&self) -> Result<Vec<UserSummary>, AppError> {
        self.users.list_users().await
    }

    pub async fn get(&self, username: &str) -> Result<User, AppError> {
        self.users
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No such user: {}", username)))
    }
}
