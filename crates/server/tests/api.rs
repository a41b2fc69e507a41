use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{ServerConfig, ServerState, router, session};

const SECRET: &str = "integration-test-secret";

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build();

    router(ServerState {
        engine: Arc::new(engine),
        config: Arc::new(ServerConfig {
            token_secret: SECRET.to_string(),
            frontend_origin: "http://localhost:5173".to_string(),
            secure_cookies: false,
        }),
    })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// First `name=value` pair of the Set-Cookie header.
fn cookie_pair(response: &Response<Body>) -> String {
    set_cookie(response)
        .and_then(|value| value.split(';').next().map(|pair| pair.to_string()))
        .unwrap()
}

async fn seed_user(app: &Router, name: &str, email: &str) -> i32 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({"name": name, "email": email}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn ping_pongs() {
    let app = test_router().await;

    let response = app.oneshot(get_request("/ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Pong");
}

#[tokio::test]
async fn sign_up_then_list_users() {
    let app = test_router().await;
    let id = seed_user(&app, "Alice", "alice@example.com").await;

    let response = app.oneshot(get_request("/api/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], json!(id));
    assert_eq!(users[0]["name"], json!("Alice"));
    assert_eq!(users[0]["email"], json!("alice@example.com"));
}

#[tokio::test]
async fn sign_up_validation_lists_failed_fields() {
    let app = test_router().await;

    let response = app
        .oneshot(json_request("POST", "/api/users", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email"]);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = test_router().await;
    seed_user(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({"name": "Other Alice", "email": "alice@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_entity_defaults_author_and_enriches_creator() {
    let app = test_router().await;
    let alice = seed_user(&app, "Alice", "alice@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/entities",
            json!({
                "name": "off by one",
                "description": "loop ran once too often",
                "created_by": alice,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["author"], json!("Anonymous"));
    assert_eq!(body["created_by"], json!(alice));
    assert_eq!(body["created_by_name"], json!("Alice"));
}

#[tokio::test]
async fn create_entity_without_required_fields_is_400() {
    let app = test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/entities",
            json!({"author": "bob"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "description", "created_by"]);
}

#[tokio::test]
async fn create_entity_with_dangling_creator_is_400() {
    let app = test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/entities",
            json!({
                "name": "ghost",
                "description": "no such creator",
                "created_by": 42,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("created_by"));
}

#[tokio::test]
async fn content_type_guard_rejects_non_json_writes() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/entities")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("name=x"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Reads are unaffected by the guard.
    let response = app.oneshot(get_request("/api/entities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let app = test_router().await;
    let alice = seed_user(&app, "Alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/entities",
            json!({
                "name": "old name",
                "description": "old description",
                "author": "carol",
                "created_by": alice,
            }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/entities/{id}"),
            json!({"name": "new name"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["name"], json!("new name"));
    assert_eq!(body["description"], json!("old description"));
    assert_eq!(body["author"], json!("carol"));
}

#[tokio::test]
async fn update_with_empty_body_is_400() {
    let app = test_router().await;
    let alice = seed_user(&app, "Alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/entities",
            json!({"name": "x", "description": "y", "created_by": alice}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/entities/{id}"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = test_router().await;
    let alice = seed_user(&app, "Alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/entities",
            json!({"name": "short lived", "description": "gone soon", "created_by": alice}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/entities/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        json!("Entity deleted successfully")
    );

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/entities/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again reports the same.
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/entities/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_by_user_filters() {
    let app = test_router().await;
    let alice = seed_user(&app, "Alice", "alice@example.com").await;
    let bob = seed_user(&app, "Bob", "bob@example.com").await;

    for (name, creator) in [("one", alice), ("two", bob), ("three", alice)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/entities",
                json!({"name": name, "description": "d", "created_by": creator}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(get_request(&format!("/api/entities/user/{alice}")))
        .await
        .unwrap();
    let body = body_json(response).await;
    let fails = body.as_array().unwrap();
    assert_eq!(fails.len(), 2);
    assert!(
        fails
            .iter()
            .all(|fail| fail["created_by"] == json!(alice))
    );
}

#[tokio::test]
async fn login_unknown_email_is_401_without_cookie() {
    let app = test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"email": "unknown@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn login_malformed_email_is_400() {
    let app = test_router().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"email": "not-an-email"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_sets_cookie_and_status_round_trips() {
    let app = test_router().await;
    let alice = seed_user(&app, "Alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"email": "alice@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw_cookie = set_cookie(&response).unwrap();
    assert!(raw_cookie.starts_with("token="));
    assert!(raw_cookie.contains("HttpOnly"));
    assert!(raw_cookie.contains("SameSite=Lax"));
    let pair = cookie_pair(&response);

    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Login successful"));
    assert_eq!(body["user"]["id"], json!(alice));

    let response = app
        .oneshot(get_with_cookie("/auth/status", &pair))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["loggedIn"], json!(true));
    assert_eq!(body["user"]["id"], json!(alice));
    assert_eq!(body["user"]["name"], json!("Alice"));
}

#[tokio::test]
async fn status_without_cookie_is_anonymous() {
    let app = test_router().await;

    let response = app.oneshot(get_request("/auth/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["loggedIn"], json!(false));
    assert!(body.get("user").is_none());
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw_cookie = set_cookie(&response).unwrap();
    assert!(raw_cookie.starts_with("token="));
    assert!(raw_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn expired_token_is_anonymous_and_cookie_is_cleared() {
    let app = test_router().await;
    seed_user(&app, "Alice", "alice@example.com").await;

    let stale = session::mint(SECRET, 1, "Alice", Utc::now() - Duration::hours(25)).unwrap();

    let response = app
        .oneshot(get_with_cookie(
            "/auth/status",
            &format!("token={stale}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw_cookie = set_cookie(&response).unwrap();
    assert!(raw_cookie.contains("Max-Age=0"));

    let body = body_json(response).await;
    assert_eq!(body["loggedIn"], json!(false));
}

#[tokio::test]
async fn tampered_token_is_anonymous() {
    let app = test_router().await;

    let forged = session::mint("some-other-secret", 1, "Mallory", Utc::now()).unwrap();

    let response = app
        .oneshot(get_with_cookie(
            "/auth/status",
            &format!("token={forged}"),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["loggedIn"], json!(false));
}
