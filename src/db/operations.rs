use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserSummary,
};
use crate::db::store::{MessageStore, UserStore};
use crate::error::{AppError, DatabaseError};

/// Postgres-backed implementation of both stores.
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

const USER_COLUMNS: &str = "username, first_name, last_name, phone, join_at, last_login_at";

#[async_trait]
impl UserStore for DbOperations {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let query = format!(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, phone, join_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.phone)
            .bind(user.join_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn get_password_hash(&self, username: &str) -> Result<Option<String>, AppError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(hash)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT username, first_name, last_name, phone FROM users ORDER BY username",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    async fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET last_login_at = $1 WHERE username = $2")
            .bind(at)
            .bind(username)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'r> FromRow<'r, PgRow> for MessageDetail {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            body: row.try_get("body")?,
            sent_at: row.try_get("sent_at")?,
            read_at: row.try_get("read_at")?,
            from_user: UserSummary {
                username: row.try_get("from_username")?,
                first_name: row.try_get("from_first_name")?,
                last_name: row.try_get("from_last_name")?,
                phone: row.try_get("from_phone")?,
            },
            to_user: UserSummary {
                username: row.try_get("to_username")?,
                first_name: row.try_get("to_first_name")?,
                last_name: row.try_get("to_last_name")?,
                phone: row.try_get("to_phone")?,
            },
        })
    }
}

const MESSAGE_COLUMNS: &str = "id, from_username, to_username, body, sent_at, read_at";

#[async_trait]
impl MessageStore for DbOperations {
    async fn insert_message(&self, message: &Message) -> Result<Message, AppError> {
        let query = format!(
            r#"
            INSERT INTO messages (id, from_username, to_username, body, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        );

        let message = sqlx::query_as::<_, Message>(&query)
            .bind(message.id)
            .bind(&message.from_username)
            .bind(&message.to_username)
            .bind(&message.body)
            .bind(message.sent_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(message)
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<MessageDetail>, AppError> {
        let message = sqlx::query_as::<_, MessageDetail>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   f.username AS from_username, f.first_name AS from_first_name,
                   f.last_name AS from_last_name, f.phone AS from_phone,
                   t.username AS to_username, t.first_name AS to_first_name,
                   t.last_name AS to_last_name, t.phone AS to_phone
            FROM messages AS m
            JOIN users AS f ON m.from_username = f.username
            JOIN users AS t ON m.to_username = t.username
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(message)
    }

    async fn messages_from(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        let messages = sqlx::query_as::<_, SentMessage>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   u.username, u.first_name, u.last_name, u.phone
            FROM messages AS m
            JOIN users AS u ON m.to_username = u.username
            WHERE m.from_username = $1
            ORDER BY m.sent_at, m.id
            "#,
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(messages)
    }

    async fn messages_to(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        let messages = sqlx::query_as::<_, ReceivedMessage>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   u.username, u.first_name, u.last_name, u.phone
            FROM messages AS m
            JOIN users AS u ON m.from_username = u.username
            WHERE m.to_username = $1
            ORDER BY m.sent_at, m.id
            "#,
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(messages)
    }

    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Message>, AppError> {
        // COALESCE keeps the first read timestamp under concurrent marks
        let query = format!(
            r#"
            UPDATE messages
            SET read_at = COALESCE(read_at, $1)
            WHERE id = $2
            RETURNING {MESSAGE_COLUMNS}
            "#
        );

        let message = sqlx::query_as::<_, Message>(&query)
            .bind(at)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(message)
    }
}
