use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::auth::service::{AuthOutcome, Registration};
use crate::error::{AppError, AuthError};
use tracing::{info, error, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Missing and empty fields are both rejected.
pub(crate) fn required(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (Some(username), Some(password)) = (required(&req.username), required(&req.password)) else {
        return Err(AppError::ValidationError("Username and password required".into()));
    };

    info!("Received login request for username: {}", username);
    match state.auth.authenticate(&username, &password).await {
        Ok(AuthOutcome::Authenticated) => {}
        Ok(AuthOutcome::WrongPassword) | Err(AppError::NotFound(_)) => {
            warn!("Login failed for username: {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => {
            error!("Login failed for username: {}: {}", username, e);
            return Err(e);
        }
    }

    state.auth.record_login(&username).await?;
    let token = state.auth.issue_token(&username)?;

    info!("Login successful for username: {}", username);
    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl RegisterRequest {
    fn into_registration(self) -> Result<Registration, AppError> {
        match (
            required(&self.username),
            required(&self.password),
            required(&self.first_name),
            required(&self.last_name),
            required(&self.phone),
        ) {
            (Some(username), Some(password), Some(first_name), Some(last_name), Some(phone)) => {
                Ok(Registration { username, password, first_name, last_name, phone })
            }
            _ => Err(AppError::ValidationError("All fields are required".into())),
        }
    }
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let registration = req.into_inner().into_registration()?;
    let username = registration.username.clone();
    info!("Received registration request for username: {}", username);

    if let Err(e) = state.auth.register(registration).await {
        error!("Registration failed for username: {}: {}", username, e);
        return Err(e);
    }

    // A fresh account counts as logged in
    state.auth.record_login(&username).await?;
    let token = state.auth.issue_token(&username)?;

    info!("Registration successful for username: {}", username);
    Ok(HttpResponse::Created().json(AuthResponse { token }))
}
