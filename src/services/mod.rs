// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod badges;
pub mod credentials;
pub mod progression;
pub mod rewards;
pub mod training;

pub use progression::{compute_progression, InvalidInput, Progression};
pub use rewards::{RewardBundle, TicketNotFound, TicketPolicy};
pub use training::{TrainingService, UnlockResult, UserLocks, WorkoutInput, WorkoutOutcome};
