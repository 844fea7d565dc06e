#![allow(dead_code)]

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use messagely_server::{AppState, Settings};
use serde_json::{json, Value};

pub async fn spawn_app() -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    let config = Settings::new_for_test().expect("Failed to load test config");
    let state = AppState::in_memory(config);

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(messagely_server::configure),
    )
    .await
}

/// Registers `username` with password "password123" and returns its token.
pub async fn register<S>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let response = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": username,
            "password": "password123",
            "first_name": format!("{}-first", username),
            "last_name": format!("{}-last", username),
            "phone": "+15555550100"
        }))
        .send_request(app)
        .await;

    assert_eq!(response.status(), 201, "registration of {} failed", username);
    let body: Value = test::read_body_json(response).await;
    body["token"].as_str().expect("token missing").to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
