// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration and session routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::id_utils::new_id;
use crate::middleware::auth::{create_jwt, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::{User, UserProfile};
use crate::routes::extract::ValidatedJson;
use crate::services::credentials::{hash_password, verify_password};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Name and password, shared by registration and login.
#[derive(Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 32, message = "name must be 1-32 characters"))]
    pub name: String,
    // bcrypt only looks at the first 72 bytes
    #[validate(length(min = 1, max = 72, message = "password must be 1-72 characters"))]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Session cookie with the attributes used both to set and to clear it.
fn session_cookie(frontend_url: &str, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(frontend_url.starts_with("https://"))
        .build()
}

/// Create a new account.
async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<Json<RegisterResponse>> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be blank".to_string()));
    }

    if state.db.find_user_by_name(name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User name '{}' is already taken",
            name
        )));
    }

    let password_hash = hash_password(&req.password, state.config.bcrypt_cost).await?;
    let user = User::new(new_id()?, name.to_string(), password_hash, now_rfc3339());

    state.db.create_user(&user).await?;

    tracing::info!(user_id = %user.id, name = %user.name, "User registered");

    Ok(Json(RegisterResponse {
        message: "registered".to_string(),
        user: user.into(),
    }))
}

/// Check credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = match state.db.find_user_by_name(req.name.trim()).await? {
        Some(user) => user,
        None => {
            tracing::info!("Login attempt for unknown user");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&req.password, &user.password_hash).await? {
        tracing::info!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let mut cookie = session_cookie(&state.config.frontend_url, token.clone());
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// End the session by expiring the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let removal = session_cookie(&state.config.frontend_url, String::new());
    (jar.remove(removal), StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_secure_only_over_https() {
        let local = session_cookie("http://localhost:3000", "t".to_string());
        let prod = session_cookie("https://quest.example.com", "t".to_string());

        assert_eq!(local.secure(), Some(false));
        assert_eq!(prod.secure(), Some(true));
        assert_eq!(prod.http_only(), Some(true));
        assert_eq!(prod.path(), Some("/"));
    }

    #[test]
    fn test_credentials_validation() {
        let empty = CredentialsRequest {
            name: String::new(),
            password: "pw".to_string(),
        };
        assert!(empty.validate().is_err());

        let long_password = CredentialsRequest {
            name: "taro".to_string(),
            password: "x".repeat(73),
        };
        assert!(long_password.validate().is_err());

        let ok = CredentialsRequest {
            name: "taro".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
