// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, credentials and progression state)
//! - Workouts (immutable training log)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{User, Workout};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by their unique display name.
    pub async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("name").eq(name)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.pop())
    }

    /// List all users, highest experience first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("exp", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user. Fails with `Conflict` if the name is taken.
    ///
    /// The name check and the insert are separate calls; two registrations
    /// racing on one name can both pass the check.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        if self.find_user_by_name(&user.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "User name '{}' is already taken",
                user.name
            )));
        }

        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Read the stored version of a user inside `transaction`, failing if it
    /// moved past `expected_version`.
    ///
    /// The read goes through the transaction, so Firestore aborts the commit
    /// if another writer touches the user before it lands.
    async fn check_user_version(
        &self,
        transaction: &firestore::FirestoreTransaction<'_>,
        user_id: &str,
        expected_version: u64,
    ) -> Result<(), AppError> {
        let current: User = self
            .get_client()?
            .clone_with_consistency_selector(firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj::<User>()
            .one(user_id)
            .await
            .map_err(|e| transaction_error("Transactional read failed", user_id, e))?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if current.version != expected_version {
            tracing::debug!(
                user_id,
                expected_version,
                stored_version = current.version,
                "User version moved"
            );
            return Err(AppError::VersionConflict(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// Overwrite a user if its stored version still equals `expected_version`.
    pub async fn update_user(&self, user: &User, expected_version: u64) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let staged = async {
            self.check_user_version(&transaction, &user.id, expected_version)
                .await?;

            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(&user.id)
                .object(user)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;

            Ok::<(), AppError>(())
        }
        .await;

        if let Err(e) = staged {
            let _ = transaction.rollback().await;
            return Err(e);
        }

        transaction
            .commit()
            .await
            .map_err(|e| transaction_error("Transaction commit failed", &user.id, e))?;

        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Get workouts for a user, newest first.
    pub async fn list_workouts_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Workout Commit ───────────────────────────────────

    /// Atomically store a workout together with the user it updated.
    ///
    /// Both writes go into one Firestore transaction, so the workout log
    /// and the user's progression cannot drift apart. The user's stored
    /// version must still equal `expected_version`; otherwise nothing is
    /// written and `VersionConflict` is returned so the caller can retry
    /// with fresh data.
    pub async fn commit_workout(
        &self,
        workout: &Workout,
        user: &User,
        expected_version: u64,
    ) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let staged = async {
            // 1. Make sure nobody else wrote the user since we read it
            self.check_user_version(&transaction, &user.id, expected_version)
                .await?;

            // 2. Add workout write to transaction
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::WORKOUTS)
                .document_id(&workout.id)
                .object(workout)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add workout to transaction: {}", e))
                })?;

            // 3. Add user write to transaction
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(&user.id)
                .object(user)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;

            Ok::<(), AppError>(())
        }
        .await;

        if let Err(e) = staged {
            let _ = transaction.rollback().await;
            return Err(e);
        }

        // 4. Commit the transaction atomically
        transaction
            .commit()
            .await
            .map_err(|e| transaction_error("Transaction commit failed", &user.id, e))?;

        tracing::info!(
            user_id = %user.id,
            workout_id = %workout.id,
            exp = user.exp,
            level = user.level,
            "Workout committed atomically"
        );

        Ok(())
    }
}

/// Map a Firestore error raised inside a user transaction.
///
/// Contention aborts are retryable, so they surface as `VersionConflict`
/// and the caller re-reads and tries again.
fn transaction_error(context: &str, user_id: &str, e: firestore::errors::FirestoreError) -> AppError {
    match e {
        firestore::errors::FirestoreError::DatabaseError(ref db_err) if db_err.retry_possible => {
            tracing::debug!(user_id, error = %e, "{} with retryable error", context);
            AppError::VersionConflict(format!("user {}", user_id))
        }
        e => AppError::Database(format!("{}: {}", context, e)),
    }
}
