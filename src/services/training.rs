// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training service.
//!
//! Handles the core workflow for a workout submission:
//! 1. Serialize on the user's lock
//! 2. Load the user and their workout history
//! 3. Compute experience, level, rewards and badges
//! 4. Commit the workout and the updated user together
//! 5. Retry from step 2 if another writer got there first
//!
//! Avatar and ticket changes go through the same lock and version check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::LedgerDb;
use crate::error::{AppError, Result};
use crate::id_utils::new_id;
use crate::models::{is_known_avatar, Badge, User, Workout};
use crate::services::badges::{award_badges, evaluate_badges};
use crate::services::progression::{compute_progression, exp_gain, InvalidInput};
use crate::services::rewards::{
    consume_ticket, evaluate_level_up_rewards, grant_rewards, unlock_avatar, RewardBundle,
    TicketPolicy,
};

/// Attempts at a version-checked write before giving up.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Per-user mutexes serializing writes within this process.
pub type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Holds a user's lock and drops the map entry once nobody else wants it.
struct UserLockGuard<'a> {
    locks: &'a UserLocks,
    user_id: &'a str,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        // Release first so our own reference no longer counts.
        self.guard.take();
        self.locks
            .remove_if(self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// A workout as submitted by the user.
#[derive(Debug, Clone)]
pub struct WorkoutInput {
    pub exercise_type: String,
    pub weight: f64,
    pub reps: u32,
}

/// Everything a workout changed.
#[derive(Debug, Clone)]
pub struct WorkoutOutcome {
    pub workout: Workout,
    pub user: User,
    pub old_level: u64,
    pub leveled_up: bool,
    pub rewards: RewardBundle,
    pub new_badges: Vec<Badge>,
}

/// Result of an avatar unlock request.
#[derive(Debug, Clone)]
pub struct UnlockResult {
    pub user: User,
    pub already_owned: bool,
}

/// Apply one workout to a user.
///
/// `history` is the user's existing workouts in any order. Returns the new
/// workout and the user as it should be stored, with `version` bumped.
pub fn apply_workout(
    user: &User,
    mut history: Vec<Workout>,
    input: &WorkoutInput,
    workout_id: String,
    now: DateTime<Utc>,
    policy: TicketPolicy,
) -> std::result::Result<WorkoutOutcome, InvalidInput> {
    let progression = compute_progression(user, input.weight, input.reps)?;

    let workout = Workout {
        id: workout_id,
        user_id: user.id.clone(),
        exercise_type: input.exercise_type.clone(),
        weight: input.weight,
        reps: input.reps,
        exp_gain: progression.exp_gain,
        created_at: now,
    };

    let mut updated = user.clone();
    updated.exp = progression.new_exp;
    updated.level = progression.new_level;
    updated.version = user.version + 1;

    let rewards = grant_rewards(
        &mut updated,
        evaluate_level_up_rewards(user.level, progression.new_level, policy),
    );

    history.push(workout.clone());
    let new_badges = evaluate_badges(&updated, &history);
    award_badges(&mut updated, &new_badges);

    Ok(WorkoutOutcome {
        workout,
        user: updated,
        old_level: user.level,
        leveled_up: progression.leveled_up,
        rewards,
        new_badges,
    })
}

/// Coordinates progression updates against the ledger.
#[derive(Clone)]
pub struct TrainingService {
    db: LedgerDb,
    locks: UserLocks,
    ticket_policy: TicketPolicy,
}

impl TrainingService {
    pub fn new(db: LedgerDb, locks: UserLocks, ticket_policy: TicketPolicy) -> Self {
        Self {
            db,
            locks,
            ticket_policy,
        }
    }

    /// Take the user's lock, creating it on first use.
    async fn lock_user<'a>(&'a self, user_id: &'a str) -> UserLockGuard<'a> {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        UserLockGuard {
            locks: &self.locks,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Record a workout logged now.
    pub async fn record_workout(&self, user_id: &str, input: WorkoutInput) -> Result<WorkoutOutcome> {
        self.record_workout_at(user_id, input, Utc::now()).await
    }

    /// Record a workout with an explicit timestamp.
    pub async fn record_workout_at(
        &self,
        user_id: &str,
        input: WorkoutInput,
        now: DateTime<Utc>,
    ) -> Result<WorkoutOutcome> {
        // Reject bad input before touching the store
        exp_gain(input.weight, input.reps)?;

        let workout_id = new_id()?;
        let _guard = self.lock_user(user_id).await;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let user = self.db.require_user(user_id).await?;
            let history = self.db.list_workouts_for_user(user_id, None).await?;

            let outcome = apply_workout(
                &user,
                history,
                &input,
                workout_id.clone(),
                now,
                self.ticket_policy,
            )?;

            match self
                .db
                .commit_workout(&outcome.workout, &outcome.user, user.version)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        user_id,
                        exp_gain = outcome.workout.exp_gain,
                        level = outcome.user.level,
                        leveled_up = outcome.leveled_up,
                        tickets = ?outcome.rewards.tickets,
                        avatars = ?outcome.rewards.avatars,
                        badges = ?outcome.new_badges,
                        "Workout recorded"
                    );
                    return Ok(outcome);
                }
                Err(AppError::VersionConflict(_)) => {
                    tracing::warn!(user_id, attempt, "Version conflict recording workout, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::VersionConflict(format!("user {}", user_id)))
    }

    /// Workouts for a user, newest first.
    pub async fn list_workouts(&self, user_id: &str, limit: u32) -> Result<Vec<Workout>> {
        self.db.require_user(user_id).await?;
        self.db.list_workouts_for_user(user_id, Some(limit)).await
    }

    /// Apply `change` to the user under the user's lock with a version check.
    ///
    /// `change` may run more than once if another writer interferes.
    async fn modify_user<T, F>(&self, user_id: &str, mut change: F) -> Result<(User, T)>
    where
        F: FnMut(&mut User) -> Result<T>,
    {
        let _guard = self.lock_user(user_id).await;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let mut user = self.db.require_user(user_id).await?;
            let expected_version = user.version;

            let value = change(&mut user)?;
            user.version = expected_version + 1;

            match self.db.update_user(&user, expected_version).await {
                Ok(()) => return Ok((user, value)),
                Err(AppError::VersionConflict(_)) => {
                    tracing::warn!(user_id, attempt, "Version conflict updating user, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::VersionConflict(format!("user {}", user_id)))
    }

    /// Add an avatar to the user's collection. Owning it already is fine.
    pub async fn unlock_avatar(&self, user_id: &str, avatar: &str) -> Result<UnlockResult> {
        if !is_known_avatar(avatar) {
            return Err(AppError::BadRequest(format!("Unknown avatar '{}'", avatar)));
        }

        let current = self.db.require_user(user_id).await?;
        if current.owns_avatar(avatar) {
            tracing::debug!(user_id, avatar, "Avatar already owned");
            return Ok(UnlockResult {
                user: current,
                already_owned: true,
            });
        }

        let (user, added) = self
            .modify_user(user_id, |user| Ok(unlock_avatar(user, avatar)))
            .await?;

        tracing::info!(user_id, avatar, added, "Avatar unlocked");
        Ok(UnlockResult {
            user,
            already_owned: !added,
        })
    }

    /// Equip an avatar the user owns.
    pub async fn equip_avatar(&self, user_id: &str, avatar: &str) -> Result<User> {
        let (user, ()) = self
            .modify_user(user_id, |user| {
                if !user.owns_avatar(avatar) {
                    return Err(AppError::BadRequest(format!(
                        "Avatar '{}' is not owned",
                        avatar
                    )));
                }
                user.avatar = avatar.to_string();
                Ok(())
            })
            .await?;

        tracing::info!(user_id, avatar, "Avatar equipped");
        Ok(user)
    }

    /// Spend one reward ticket.
    pub async fn use_ticket(&self, user_id: &str, ticket: &str) -> Result<User> {
        let (user, ()) = self
            .modify_user(user_id, |user| {
                consume_ticket(user, ticket)?;
                Ok(())
            })
            .await?;

        tracing::info!(
            user_id,
            ticket,
            remaining = user.rewards.len(),
            "Reward ticket used"
        );
        Ok(user)
    }
}
