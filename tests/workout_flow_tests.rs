// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end workout submission tests against the in-memory ledger.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_first_workout_response() {
    let (app, _) = common::create_test_app();
    let (user_id, token) = common::sign_up(&app, "taro").await;

    let (status, json) = common::log_workout(&app, &user_id, &token, 60.0, 10).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["workout"]["type"], "ベンチプレス");
    assert_eq!(json["workout"]["expGain"], 120);
    assert_eq!(json["workout"]["userId"], user_id.as_str());
    assert_eq!(json["updatedUser"]["exp"], 120);
    assert_eq!(json["updatedUser"]["level"], 2);
    assert_eq!(json["leveledUp"], true);
    assert_eq!(json["oldLevel"], 1);
    assert_eq!(json["newLevel"], 2);
    assert_eq!(json["rewards"]["tickets"], json!(["Lv.2報酬チケット"]));
    assert_eq!(json["rewards"]["avatars"], json!([]));
    assert_eq!(json["newBadges"], json!(["初トレーニング"]));
    assert_eq!(json["updatedUser"]["badges"], json!(["初トレーニング"]));
}

#[tokio::test]
async fn test_level_jump_grants_final_ticket_and_avatar() {
    let (app, _) = common::create_test_app();
    let (user_id, token) = common::sign_up(&app, "jump").await;

    // 45 kg x 10 = 90 exp, still level 1
    let (_, json) = common::log_workout(&app, &user_id, &token, 45.0, 10).await;
    assert_eq!(json["updatedUser"]["exp"], 90);
    assert_eq!(json["leveledUp"], false);
    assert_eq!(json["rewards"]["tickets"], json!([]));

    // +120 exp: 90 -> 210, level 1 -> 3
    let (status, json) = common::log_workout(&app, &user_id, &token, 60.0, 10).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["updatedUser"]["exp"], 210);
    assert_eq!(json["newLevel"], 3);
    assert_eq!(json["oldLevel"], 1);
    assert_eq!(json["rewards"]["tickets"], json!(["Lv.3報酬チケット"]));
    assert_eq!(json["rewards"]["avatars"], json!(["/avatars/level3.png"]));
    assert_eq!(
        json["updatedUser"]["ownedAvatars"],
        json!(["/avatars/level1.png", "/avatars/level3.png"])
    );
    assert_eq!(json["newBadges"], json!([]));
}

#[tokio::test]
async fn test_workout_history_newest_first() {
    let (app, _) = common::create_test_app();
    let (user_id, token) = common::sign_up(&app, "history").await;

    for reps in 1..=3 {
        let (status, _) = common::log_workout(&app, &user_id, &token, 10.0, reps).await;
        assert_eq!(status, StatusCode::OK);
        // Distinct timestamps for ordering
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, json) = common::send(&app, "GET", "/workouts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let reps: Vec<u64> = json["workouts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["reps"].as_u64().unwrap())
        .collect();
    assert_eq!(reps, vec![3, 2, 1]);

    let (_, json) = common::send(
        &app,
        "GET",
        &format!("/workouts?userId={}&limit=2", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(json["workouts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_users_me_reflects_progress() {
    let (app, _) = common::create_test_app();
    let (user_id, token) = common::sign_up(&app, "me").await;
    common::log_workout(&app, &user_id, &token, 100.0, 10).await;

    let (status, json) = common::send(&app, "GET", "/users/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], user_id.as_str());
    assert_eq!(json["exp"], 200);
    assert_eq!(json["level"], 3);
    assert_eq!(json["rewards"], json!(["Lv.3報酬チケット"]));
}

#[tokio::test]
async fn test_users_listed_by_exp_without_private_fields() {
    let (app, _) = common::create_test_app();
    let (weak_id, weak_token) = common::sign_up(&app, "weak").await;
    let (strong_id, strong_token) = common::sign_up(&app, "strong").await;
    common::log_workout(&app, &weak_id, &weak_token, 10.0, 10).await;
    common::log_workout(&app, &strong_id, &strong_token, 100.0, 10).await;

    let (status, json) = common::send(&app, "GET", "/users", Some(&weak_token), None).await;

    assert_eq!(status, StatusCode::OK);
    let users = json.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "strong");
    assert_eq!(users[1]["name"], "weak");
    for user in users {
        assert!(user.get("rewards").is_none());
        assert!(user.get("version").is_none());
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("password_hash").is_none());
        assert!(user["ownedAvatars"].is_array());
    }
}
