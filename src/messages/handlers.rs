use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::handlers::required;
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub to_username: Option<String>,
    pub body: Option<String>,
}

/// Ids that do not parse can never name a message.
fn parse_message_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("No such message: {}", raw)))
}

pub async fn get_message(
    path: web::Path<String>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_message_id(&path)?;
    let message = state.messages.get_as(id, user.username()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

pub async fn send_message(
    req: web::Json<SendMessageRequest>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (Some(to_username), Some(body)) = (required(&req.to_username), required(&req.body)) else {
        return Err(AppError::ValidationError("to_username and body are required".into()));
    };

    info!("{} sending message to {}", user.username(), to_username);
    let message = state.messages.send(user.username(), &to_username, &body).await?;
    Ok(HttpResponse::Created().json(json!({ "message": message })))
}

pub async fn mark_read(
    path: web::Path<String>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_message_id(&path)?;
    let message = state.messages.mark_read(id, user.username()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}
