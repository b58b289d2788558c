// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod badge;
pub mod reward;
pub mod user;
pub mod workout;

pub use badge::Badge;
pub use reward::{avatars_unlocked_between, is_known_avatar, ticket_label, AVATAR_REWARDS};
pub use user::{PublicUser, User, UserProfile, DEFAULT_AVATAR};
pub use workout::{Workout, WorkoutSummary};
