// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use training_quest::config::Config;
use training_quest::db::{FirestoreDb, LedgerDb};
use training_quest::middleware::auth::create_jwt;
use training_quest::routes::create_router;
use training_quest::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by a fresh in-memory ledger.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app(Config::test_default(), LedgerDb::in_memory())
}

/// Same as [`create_test_app`] with a specific frontend URL.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_app(config, LedgerDb::in_memory())
}

/// Create a test app whose Firestore client is offline, so every store call fails.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    create_app(
        Config::test_default(),
        LedgerDb::Firestore(FirestoreDb::new_mock()),
    )
}

#[allow(dead_code)]
pub fn create_app(config: Config, db: LedgerDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Session token for a user ID, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    create_jwt(user_id, &Config::test_default().jwt_signing_key).unwrap()
}

/// Send a request and decode the JSON response (Null for empty bodies).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register and log in a user. Returns (user ID, session token).
#[allow(dead_code)]
pub async fn sign_up(app: &axum::Router, name: &str) -> (String, String) {
    let credentials = serde_json::json!({ "name": name, "password": "correct-horse" });

    let (status, _) = send(app, "POST", "/auth/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::OK, "register {}", name);

    let (status, json) = send(app, "POST", "/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK, "login {}", name);

    (
        json["user"]["id"].as_str().unwrap().to_string(),
        json["token"].as_str().unwrap().to_string(),
    )
}

/// Log a workout for a signed-in user.
#[allow(dead_code)]
pub async fn log_workout(
    app: &axum::Router,
    user_id: &str,
    token: &str,
    weight: f64,
    reps: u32,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/workouts",
        Some(token),
        Some(serde_json::json!({
            "userId": user_id,
            "type": "ベンチプレス",
            "weight": weight,
            "reps": reps,
        })),
    )
    .await
}
