// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing and verification.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool.

use crate::error::{AppError, Result};

/// Hash a password with the given bcrypt cost.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))
}

/// Check a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Password verification task failed: {}", e))
        })?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification error: {}", e)))
}
