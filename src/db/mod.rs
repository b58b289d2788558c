//! Database layer: the ledger of users and workouts.
//!
//! [`LedgerDb`] dispatches to Firestore in production or to an in-memory
//! store for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::{Config, LedgerBackend};
use crate::error::AppError;
use crate::models::{User, Workout};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const WORKOUTS: &str = "workouts";
}

/// Storage backend for users and workouts.
#[derive(Clone)]
pub enum LedgerDb {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl LedgerDb {
    /// Connect to the backend named in the config.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.ledger_backend {
            LedgerBackend::Firestore => Ok(Self::Firestore(
                FirestoreDb::new(&config.gcp_project_id).await?,
            )),
            LedgerBackend::Memory => {
                tracing::warn!("Using in-memory ledger; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::Memory(MemoryDb::new())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match self {
            Self::Firestore(db) => db.get_user(user_id).await,
            Self::Memory(db) => db.get_user(user_id),
        }
    }

    /// Get a user, turning absence into `NotFound`.
    pub async fn require_user(&self, user_id: &str) -> Result<User, AppError> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        match self {
            Self::Firestore(db) => db.find_user_by_name(name).await,
            Self::Memory(db) => db.find_user_by_name(name),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        match self {
            Self::Firestore(db) => db.list_users().await,
            Self::Memory(db) => db.list_users(),
        }
    }

    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.create_user(user).await,
            Self::Memory(db) => db.create_user(user),
        }
    }

    pub async fn update_user(&self, user: &User, expected_version: u64) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.update_user(user, expected_version).await,
            Self::Memory(db) => db.update_user(user, expected_version),
        }
    }

    pub async fn list_workouts_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError> {
        match self {
            Self::Firestore(db) => db.list_workouts_for_user(user_id, limit).await,
            Self::Memory(db) => db.list_workouts_for_user(user_id, limit),
        }
    }

    pub async fn commit_workout(
        &self,
        workout: &Workout,
        user: &User,
        expected_version: u64,
    ) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.commit_workout(workout, user, expected_version).await,
            Self::Memory(db) => db.commit_workout(workout, user, expected_version),
        }
    }
}
