use crate::auth::password::{hash_password, verify_password};
use crate::db::models::{NewUser, User};
use crate::db::store::UserStore;
use crate::error::{AppError, DatabaseError};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, decode, Header, EncodingKey, DecodingKey, Validation, Algorithm};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Username
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

/// Profile fields and password supplied at registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Outcome of a credential check for an existing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    WrongPassword,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_expiry: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_expiry_hours: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_expiry: Duration::hours(token_expiry_hours),
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<User, AppError> {
        if self.users.get_user(&registration.username).await?.is_some() {
            return Err(already_exists(&registration.username));
        }

        let Registration { username, password, first_name, last_name, phone } = registration;
        let password_hash = run_blocking(move || hash_password(&password)).await?;

        let new_user = NewUser {
            username,
            password_hash,
            first_name,
            last_name,
            phone,
            join_at: Utc::now(),
        };

        // A concurrent registration can still win between the check and the insert
        match self.users.insert_user(&new_user).await {
            Ok(user) => {
                info!("Registered user {}", user.username);
                Ok(user)
            }
            Err(AppError::DatabaseError(DatabaseError::Duplicate)) => {
                Err(already_exists(&new_user.username))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthOutcome, AppError> {
        let stored_hash = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or_else(|| no_such_user(username))?;

        let password = password.to_owned();
        let verified = run_blocking(move || verify_password(&password, &stored_hash)).await?;

        if verified {
            debug!("Credentials verified for {}", username);
            Ok(AuthOutcome::Authenticated)
        } else {
            warn!("Wrong password for {}", username);
            Ok(AuthOutcome::WrongPassword)
        }
    }

    pub async fn record_login(&self, username: &str) -> Result<(), AppError> {
        if self.users.touch_last_login(username, Utc::now()).await? {
            Ok(())
        } else {
            Err(no_such_user(username))
        }
    }

    pub fn issue_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            exp: (now + self.token_expiry).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalError(format!("Token encoding failed: {}", e)))
    }

    /// Returns the username bound to a valid token.
    pub fn validate_token(&self, token: &str) -> Result<String, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(claims.claims.sub)
    }
}

fn already_exists(username: &str) -> AppError {
    AppError::Conflict(format!("User already exists: {}", username))
}

fn no_such_user(username: &str) -> AppError {
    AppError::NotFound(format!("No such user: {}", username))
}

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalError(format!("Blocking task failed: {}", e)))?
}
