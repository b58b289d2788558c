// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::format_utc_rfc3339;

/// Stored workout record. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    /// Workout ID (also used as document ID)
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    /// Exercise label (Bench press, Squat, etc.)
    pub exercise_type: String,
    /// Weight lifted in kilograms
    pub weight: f64,
    /// Repetitions performed
    pub reps: u32,
    /// Experience awarded for this workout
    pub exp_gain: u64,
    /// When the workout was logged
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Workout as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutSummary {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub weight: f64,
    pub reps: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp_gain: u64,
    pub created_at: String,
}

impl From<Workout> for WorkoutSummary {
    fn from(w: Workout) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            exercise_type: w.exercise_type,
            weight: w.weight,
            reps: w.reps,
            exp_gain: w.exp_gain,
            created_at: format_utc_rfc3339(w.created_at),
        }
    }
}
