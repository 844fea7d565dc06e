pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod messages;
pub mod users;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthenticatedUser, AuthService};
pub use db::{DbOperations, MemoryStore, MessageStore, UserStore};
pub use messages::MessagingService;
pub use users::UserDirectory;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Registers every route plus JSON error handling on an actix app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .route("/health", web::get().to(health_check))
    .route("/auth/register", web::post().to(auth::handlers::register))
    .route("/auth/login", web::post().to(auth::handlers::login))
    .route("/users", web::get().to(users::handlers::list_users))
    .route("/users/{username}", web::get().to(users::handlers::get_user))
    .route("/users/{username}/to", web::get().to(users::handlers::messages_to))
    .route("/users/{username}/from", web::get().to(users::handlers::messages_from))
    .route("/messages", web::post().to(messages::handlers::send_message))
    .route("/messages/{id}", web::get().to(messages::handlers::get_message))
    .route("/messages/{id}/read", web::post().to(messages::handlers::mark_read));
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDirectory>,
    pub messages: Arc<MessagingService>,
}

impl AppState {
    /// Builds the services over a store that backs both users and messages.
    pub fn from_store<S>(config: Settings, store: Arc<S>) -> Self
    where
        S: UserStore + MessageStore + 'static,
    {
        let auth = AuthService::new(
            store.clone(),
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry_hours,
        );

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            users: Arc::new(UserDirectory::new(store.clone())),
            messages: Arc::new(MessagingService::new(store.clone(), store)),
        }
    }

    pub fn in_memory(config: Settings) -> Self {
        warn!("Using the in-memory store; data is lost on shutdown");
        Self::from_store(config, Arc::new(MemoryStore::new()))
    }

    /// Connects to Postgres and applies pending migrations.
    pub async fn connect(config: Settings) -> Result<(Self, Arc<DbOperations>)> {
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await?;
        db.migrate().await?;
        info!("Database migrations applied");

        let db = Arc::new(db);
        Ok((Self::from_store(config, db.clone()), db))
    }
}
