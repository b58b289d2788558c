// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{PublicUser, UserProfile, WorkoutSummary};
use crate::routes::extract::ValidatedJson;
use crate::services::{RewardBundle, WorkoutInput};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts", post(create_workout).get(list_workouts))
        .route("/avatar", post(equip_avatar))
        .route("/avatar/unlock", post(unlock_avatar))
        .route("/reward/use", post(use_reward))
        .route("/users/me", get(get_me))
        .route("/users", get(list_users))
}

// ─── Workouts ────────────────────────────────────────────────

/// Largest weight (kg) and rep count accepted for one set.
const MAX_WEIGHT_KG: f64 = 1000.0;
const MAX_REPS: u32 = 1000;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64, message = "type must be 1-64 characters"))]
    pub exercise_type: String,
    #[validate(range(exclusive_min = 0.0, max = MAX_WEIGHT_KG))]
    pub weight: f64,
    #[validate(range(min = 1, max = MAX_REPS))]
    pub reps: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutResponse {
    pub workout: WorkoutSummary,
    pub updated_user: UserProfile,
    pub leveled_up: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub old_level: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub new_level: u64,
    pub rewards: RewardBundle,
    pub new_badges: Vec<String>,
}

/// Log a workout and apply its experience, rewards and badges.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<WorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    auth.ensure_is(&req.user_id)?;

    let input = WorkoutInput {
        exercise_type: req.exercise_type.trim().to_string(),
        weight: req.weight,
        reps: req.reps,
    };
    if input.exercise_type.is_empty() {
        return Err(AppError::BadRequest("type must not be blank".to_string()));
    }

    let outcome = state.training.record_workout(&auth.user_id, input).await?;

    Ok(Json(WorkoutResponse {
        workout: outcome.workout.into(),
        new_level: outcome.user.level,
        updated_user: outcome.user.into(),
        leveled_up: outcome.leveled_up,
        old_level: outcome.old_level,
        rewards: outcome.rewards,
        new_badges: outcome
            .new_badges
            .iter()
            .map(|b| b.label().to_string())
            .collect(),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutsQuery {
    /// Defaults to the signed-in user
    user_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    50
}

const MAX_LIMIT: u32 = 100;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutsResponse {
    pub workouts: Vec<WorkoutSummary>,
}

/// Workout history, newest first.
async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<WorkoutsQuery>,
) -> Result<Json<WorkoutsResponse>> {
    if let Some(user_id) = params.user_id.as_deref() {
        auth.ensure_is(user_id)?;
    }

    let limit = params.limit.clamp(1, MAX_LIMIT);
    let workouts = state.training.list_workouts(&auth.user_id, limit).await?;

    Ok(Json(WorkoutsResponse {
        workouts: workouts.into_iter().map(WorkoutSummary::from).collect(),
    }))
}

// ─── Avatars ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 256))]
    pub avatar: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserUpdateResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnlockResponse {
    pub success: bool,
    pub already_owned: bool,
    pub user: UserProfile,
}

/// Equip an owned avatar.
async fn equip_avatar(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<AvatarRequest>,
) -> Result<Json<UserUpdateResponse>> {
    auth.ensure_is(&req.user_id)?;

    let user = state
        .training
        .equip_avatar(&auth.user_id, &req.avatar)
        .await?;

    Ok(Json(UserUpdateResponse {
        success: true,
        user: user.into(),
    }))
}

/// Add an avatar to the user's collection.
async fn unlock_avatar(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<AvatarRequest>,
) -> Result<Json<UnlockResponse>> {
    auth.ensure_is(&req.user_id)?;

    let result = state
        .training
        .unlock_avatar(&auth.user_id, &req.avatar)
        .await?;

    Ok(Json(UnlockResponse {
        success: true,
        already_owned: result.already_owned,
        user: result.user.into(),
    }))
}

// ─── Rewards ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UseRewardRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 64))]
    pub ticket: String,
}

/// Spend one reward ticket.
async fn use_reward(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<UseRewardRequest>,
) -> Result<Json<UserUpdateResponse>> {
    auth.ensure_is(&req.user_id)?;

    let user = state.training.use_ticket(&auth.user_id, &req.ticket).await?;

    Ok(Json(UserUpdateResponse {
        success: true,
        user: user.into(),
    }))
}

// ─── Users ───────────────────────────────────────────────────

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let user = state.db.require_user(&auth.user_id).await?;
    Ok(Json(user.into()))
}

/// Public profiles of all users, highest experience first.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PublicUser>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout_request(weight: f64, reps: u32) -> WorkoutRequest {
        WorkoutRequest {
            user_id: "u1".to_string(),
            exercise_type: "スクワット".to_string(),
            weight,
            reps,
        }
    }

    #[test]
    fn test_workout_request_bounds() {
        assert!(workout_request(60.0, 10).validate().is_ok());
        assert!(workout_request(MAX_WEIGHT_KG, MAX_REPS).validate().is_ok());
        assert!(workout_request(0.0, 10).validate().is_err());
        assert!(workout_request(-5.0, 10).validate().is_err());
        assert!(workout_request(MAX_WEIGHT_KG + 0.5, 10).validate().is_err());
        assert!(workout_request(60.0, 0).validate().is_err());
        assert!(workout_request(60.0, MAX_REPS + 1).validate().is_err());
    }

    #[test]
    fn test_workout_request_type_field() {
        let req: WorkoutRequest = serde_json::from_str(
            r#"{"userId":"u1","type":"ベンチプレス","weight":60,"reps":10}"#,
        )
        .unwrap();

        assert_eq!(req.exercise_type, "ベンチプレス");
        assert_eq!(req.weight, 60.0);
    }
}
