use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use divvy_core::{TokenConfig, TokenService, User};
use divvy_server::routes;
use divvy_server::state::AppState;

pub const TEST_SECRET: &str = "test-secret-key";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub tokens: TokenService,
}

/// Build the app on a fresh in-memory store.
pub fn setup_test_app() -> TestApp {
    setup_with_reads(false)
}

/// Same as [`setup_test_app`] with reads by id limited to participants.
pub fn setup_restricted_app() -> TestApp {
    setup_with_reads(true)
}

fn setup_with_reads(restrict_reads: bool) -> TestApp {
    let config = TokenConfig::new(TEST_SECRET).with_ttl(Duration::from_secs(3600));
    let state = Arc::new(AppState::in_memory(&config, restrict_reads));

    TestApp {
        router: routes::router(state.clone()),
        state,
        tokens: TokenService::new(&config),
    }
}

impl TestApp {
    /// Register a user directly through the service and return it with a token.
    pub async fn user(&self, name: &str) -> (User, String) {
        let session = self
            .state
            .accounts
            .register(name, TEST_PASSWORD)
            .await
            .expect("Failed to register test user");
        (session.user, session.token)
    }

    /// A token that expired an hour ago.
    pub fn expired_token(&self, user: &User) -> String {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        self.tokens
            .issue_at(user, now - Duration::from_secs(2 * 3600))
            .unwrap()
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::get(path);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send_json("POST", path, token, body).await
    }

    pub async fn patch(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send_json("PATCH", path, token, body).await
    }

    async fn send_json(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        self.send(
            request
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// Send a request and decode the JSON body (`Null` when empty or not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

pub fn dinner(amount: f64, splits: &[(&str, f64)]) -> serde_json::Value {
    serde_json::json!({
        "description": "Dinner",
        "amount": amount,
        "splitBetween": splits
            .iter()
            .map(|(username, share)| serde_json::json!({"username": username, "share": share}))
            .collect::<Vec<_>>(),
    })
}
