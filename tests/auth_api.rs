mod common;

use actix_web::test;
use common::{register, spawn_app};
use serde_json::{json, Value};

#[actix_web::test]
async fn test_register_and_login() {
    let app = spawn_app().await;

    let token = register(&app, "alice").await;
    assert!(!token.is_empty());

    let login_response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "username": "alice",
            "password": "password123"
        }))
        .send_request(&app)
        .await;

    assert_eq!(login_response.status(), 200);
    let login_body: Value = test::read_body_json(login_response).await;
    assert!(login_body.get("token").is_some());
}

#[actix_web::test]
async fn test_register_sets_join_and_login_timestamps() {
    let app = spawn_app().await;
    register(&app, "alice").await;

    let response = test::TestRequest::get()
        .uri("/users/alice")
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["first_name"], "alice-first");
    assert!(body["user"]["join_at"].is_string());
    assert!(body["user"]["last_login_at"].is_string());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[actix_web::test]
async fn test_duplicate_registration() {
    let app = spawn_app().await;
    register(&app, "alice").await;

    let response = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "alice",
            "password": "another",
            "first_name": "Alice",
            "last_name": "Again",
            "phone": "+15555550101"
        }))
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["message"], "User already exists: alice");
}

#[actix_web::test]
async fn test_invalid_registration() {
    let app = spawn_app().await;

    let response = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "alice",
            "password": ""  // Empty password should fail
        }))
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["status"], 400);
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = spawn_app().await;

    let response = test::TestRequest::post()
        .uri("/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["status"], 400);
}

#[actix_web::test]
async fn test_invalid_login() {
    let app = spawn_app().await;
    register(&app, "alice").await;

    let wrong_password = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "username": "alice",
            "password": "wrongpassword"
        }))
        .send_request(&app)
        .await;
    assert_eq!(wrong_password.status(), 400);

    let unknown_user = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "username": "nonexistent",
            "password": "wrongpassword"
        }))
        .send_request(&app)
        .await;
    assert_eq!(unknown_user.status(), 400);

    let missing_fields = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "alice" }))
        .send_request(&app)
        .await;
    assert_eq!(missing_fields.status(), 400);
}

#[actix_web::test]
async fn test_list_and_get_users() {
    let app = spawn_app().await;
    register(&app, "bob").await;
    register(&app, "alice").await;

    let response = test::TestRequest::get().uri("/users").send_request(&app).await;
    assert_eq!(response.status(), 200);
    let body: Value = test::read_body_json(response).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[1]["username"], "bob");
    assert!(users[0].get("join_at").is_none());

    let missing = test::TestRequest::get().uri("/users/ghost").send_request(&app).await;
    assert_eq!(missing.status(), 404);
}
