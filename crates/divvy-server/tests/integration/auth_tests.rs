use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use uuid::Uuid;

use divvy_core::User;

use crate::integration::common::{TEST_PASSWORD, dinner, setup_test_app};

#[tokio::test]
async fn missing_token_returns_401() {
    let app = setup_test_app();

    let (status, json) = app.get("/api/expenses", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json,
        serde_json::json!({"message": "Not authorized, no token provided"})
    );
}

#[tokio::test]
async fn non_bearer_scheme_returns_401() {
    let app = setup_test_app();
    let (_, token) = app.user("alice").await;

    let request = Request::get("/api/expenses")
        .header("authorization", format!("Basic {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, json) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Not authorized, no token provided");
}

#[tokio::test]
async fn malformed_token_returns_401() {
    let app = setup_test_app();

    let (status, json) = app.get("/api/expenses", Some("not-a-jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Not authorized");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn expired_token_returns_401() {
    let app = setup_test_app();
    let (user, _) = app.user("alice").await;
    let token = app.expired_token(&user);

    let (status, json) = app.get("/api/expenses", Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Not authorized");
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("expired")
    );
}

#[tokio::test]
async fn token_for_unknown_user_returns_401() {
    let app = setup_test_app();
    let ghost = User {
        id: Uuid::new_v4(),
        name: "ghost".into(),
        password_hash: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let token = app.tokens.issue(&ghost).unwrap();

    let (status, json) = app.get("/api/expenses", Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Not authorized, user not found");
}

#[tokio::test]
async fn register_then_login() {
    let app = setup_test_app();

    let (status, registered) = app
        .post(
            "/api/auth/register",
            None,
            serde_json::json!({"name": "alice", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["name"], "alice");
    assert!(registered["token"].is_string());

    let (status, logged_in) = app
        .post(
            "/api/auth/login",
            None,
            serde_json::json!({"name": "alice", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["id"], registered["id"]);

    let token = logged_in["token"].as_str().unwrap();
    let (status, profile) = app.get("/api/auth/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], registered["id"]);
    assert_eq!(profile["name"], "alice");
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = setup_test_app();
    app.user("alice").await;

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            serde_json::json!({"name": "alice", "password": TEST_PASSWORD}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_validates_input() {
    let app = setup_test_app();

    for body in [
        serde_json::json!({"name": "   ", "password": TEST_PASSWORD}),
        serde_json::json!({"name": "alice", "password": "short"}),
        serde_json::json!({"name": "alice"}),
    ] {
        let (status, _) = app.post("/api/auth/register", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = setup_test_app();
    app.user("alice").await;

    let (wrong_password, wrong_body) = app
        .post(
            "/api/auth/login",
            None,
            serde_json::json!({"name": "alice", "password": "not-the-password"}),
        )
        .await;
    let (unknown_name, unknown_body) = app
        .post(
            "/api/auth/login",
            None,
            serde_json::json!({"name": "mallory", "password": TEST_PASSWORD}),
        )
        .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_name, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid credentials");
}

#[tokio::test]
async fn rename_to_taken_name_conflicts() {
    let app = setup_test_app();
    app.user("alice").await;
    let (_, bob) = app.user("bob").await;

    let (status, _) = app
        .patch(
            "/api/auth/me",
            Some(&bob),
            serde_json::json!({"name": "alice"}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn rejected_tokens_never_create_expenses() {
    let app = setup_test_app();
    let (user, token) = app.user("alice").await;
    let expired = app.expired_token(&user);

    for bad in ["not-a-jwt", expired.as_str()] {
        let (status, json) = app
            .post("/api/expenses", Some(bad), dinner(10.0, &[("alice", 10.0)]))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Not authorized");
    }

    let (status, json) = app.get("/api/expenses", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}
