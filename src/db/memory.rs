//! In-memory ledger for local development and tests.
//!
//! Mirrors the Firestore wrapper's semantics, including the version check
//! on user writes. Data lives only as long as the process.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::AppError;
use crate::models::{User, Workout};

/// In-memory user and workout storage.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<String, User>>,
    /// User name -> user ID, for uniqueness and login lookup
    names: Arc<DashMap<String, String>>,
    /// User ID -> workouts in insertion order
    workouts: Arc<DashMap<String, Vec<Workout>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    pub fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        match self.names.get(name) {
            Some(id) => self.get_user(id.value()),
            None => Ok(None),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| b.exp.cmp(&a.exp).then_with(|| a.name.cmp(&b.name)));
        Ok(users)
    }

    pub fn create_user(&self, user: &User) -> Result<(), AppError> {
        match self.names.entry(user.name.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "User name '{}' is already taken",
                user.name
            ))),
            Entry::Vacant(slot) => {
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(())
            }
        }
    }

    pub fn update_user(&self, user: &User, expected_version: u64) -> Result<(), AppError> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

        if stored.version != expected_version {
            return Err(AppError::VersionConflict(format!("user {}", user.id)));
        }

        *stored = user.clone();
        Ok(())
    }

    /// Workouts for a user, newest first.
    pub fn list_workouts_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError> {
        let mut workouts = self
            .workouts
            .get(user_id)
            .map(|w| w.value().clone())
            .unwrap_or_default();

        workouts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            workouts.truncate(limit as usize);
        }
        Ok(workouts)
    }

    /// Store a workout and its user together.
    ///
    /// The user's map entry stays locked for the whole write, so a reader
    /// never sees the workout without the matching user state.
    pub fn commit_workout(
        &self,
        workout: &Workout,
        user: &User,
        expected_version: u64,
    ) -> Result<(), AppError> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

        if stored.version != expected_version {
            return Err(AppError::VersionConflict(format!("user {}", user.id)));
        }

        self.workouts
            .entry(user.id.clone())
            .or_default()
            .push(workout.clone());
        *stored = user.clone();
        Ok(())
    }
}
