use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::AppState;

pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.users.all().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

pub async fn get_user(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.users.get(&path).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// Messages received by the user.
pub async fn messages_to(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let messages = state.messages.list_received_by(&path).await?;
    Ok(HttpResponse::Ok().json(json!({ "messages": messages })))
}

/// Messages sent by the user.
pub async fn messages_from(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let messages = state.messages.list_sent_by(&path).await?;
    Ok(HttpResponse::Ok().json(json!({ "messages": messages })))
}
