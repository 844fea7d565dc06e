mod common;

use actix_web::test;
use common::{bearer, register, spawn_app};
use serde_json::{json, Value};

async fn send<S>(app: &S, token: &str, to: &str, body: &str) -> Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let response = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(token))
        .set_json(json!({ "to_username": to, "body": body }))
        .send_request(app)
        .await;

    assert_eq!(response.status(), 201);
    let json: Value = test::read_body_json(response).await;
    json["message"].clone()
}

#[actix_web::test]
async fn test_send_and_get_message() {
    let app = spawn_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let message = send(&app, &alice, "bob", "hi").await;
    assert_eq!(message["from_username"], "alice");
    assert_eq!(message["to_username"], "bob");
    assert_eq!(message["body"], "hi");
    assert!(message["read_at"].is_null());

    let id = message["id"].as_str().unwrap();
    let response = test::TestRequest::get()
        .uri(&format!("/messages/{}", id))
        .insert_header(bearer(&bob))
        .send_request(&app)
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"]["body"], "hi");
    assert!(body["message"]["read_at"].is_null());
    assert_eq!(body["message"]["from_user"]["username"], "alice");
    assert_eq!(body["message"]["from_user"]["first_name"], "alice-first");
    assert_eq!(body["message"]["to_user"]["username"], "bob");
}

#[actix_web::test]
async fn test_message_routes_require_token() {
    let app = spawn_app().await;
    register(&app, "bob").await;

    let response = test::TestRequest::post()
        .uri("/messages")
        .set_json(json!({ "to_username": "bob", "body": "anonymous" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);

    let response = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer("not-a-token"))
        .set_json(json!({ "to_username": "bob", "body": "forged" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
}

#[actix_web::test]
async fn test_outsider_cannot_read_message() {
    let app = spawn_app().await;
    let alice = register(&app, "alice").await;
    register(&app, "bob").await;
    let carol = register(&app, "carol").await;

    let message = send(&app, &alice, "bob", "private").await;
    let id = message["id"].as_str().unwrap();

    let response = test::TestRequest::get()
        .uri(&format!("/messages/{}", id))
        .insert_header(bearer(&carol))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);

    let response = test::TestRequest::get()
        .uri(&format!("/messages/{}", id))
        .insert_header(bearer(&alice))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
}

#[actix_web::test]
async fn test_mark_read() {
    let app = spawn_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let carol = register(&app, "carol").await;

    let message = send(&app, &alice, "bob", "read me").await;
    let uri = format!("/messages/{}/read", message["id"].as_str().unwrap());

    for token in [&alice, &carol] {
        let response = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(token))
            .send_request(&app)
            .await;
        assert_eq!(response.status(), 401);
    }

    let response = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&bob))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let first: Value = test::read_body_json(response).await;
    let read_at = first["message"]["read_at"].clone();
    assert!(read_at.is_string());

    let response = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&bob))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let second: Value = test::read_body_json(response).await;
    assert_eq!(second["message"]["read_at"], read_at);
}

#[actix_web::test]
async fn test_unknown_message_and_recipient() {
    let app = spawn_app().await;
    let alice = register(&app, "alice").await;

    let response = test::TestRequest::get()
        .uri("/messages/00000000-0000-0000-0000-000000000000")
        .insert_header(bearer(&alice))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 404);

    let response = test::TestRequest::get()
        .uri("/messages/42")
        .insert_header(bearer(&alice))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 404);

    let response = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(&alice))
        .set_json(json!({ "to_username": "ghost", "body": "hello?" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 404);
}

#[actix_web::test]
async fn test_user_message_listings() {
    let app = spawn_app().await;
    let alice = register(&app, "alice").await;
    register(&app, "bob").await;

    let response = test::TestRequest::get()
        .uri("/users/alice/from")
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["messages"], json!([]));

    let message = send(&app, &alice, "bob", "hi").await;

    let response = test::TestRequest::get()
        .uri("/users/alice/from")
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(response).await;
    let sent = body["messages"].as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["id"], message["id"]);
    assert_eq!(sent[0]["to_user"]["username"], "bob");

    let response = test::TestRequest::get()
        .uri("/users/bob/to")
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(response).await;
    let received = body["messages"].as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["from_user"]["username"], "alice");
    assert_eq!(received[0]["body"], "hi");

    let response = test::TestRequest::get()
        .uri("/users/ghost/to")
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 404);
}
