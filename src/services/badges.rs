// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement badge evaluation.
//!
//! Runs over the user's complete workout history after each new workout.
//! The streak rule re-scans everything; fine while histories stay small.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Badge, User, Workout};

/// Streak length needed for the streak badge.
pub const STREAK_TARGET: u32 = 7;

/// Level needed for the level badge.
pub const BADGE_LEVEL: u64 = 10;

/// Largest gap between workouts that still continues a streak (1.5 days).
pub fn max_streak_gap() -> Duration {
    Duration::hours(36)
}

/// Longest run of workouts where each follows the previous within
/// [`max_streak_gap`].
pub fn longest_streak(timestamps: &[DateTime<Utc>]) -> u32 {
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();

    let gap = max_streak_gap();
    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<DateTime<Utc>> = None;

    for ts in sorted {
        current = match previous {
            Some(prev) if ts - prev <= gap => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(ts);
    }

    best
}

/// Badges the user has newly earned.
///
/// `workouts` must include the workout just recorded, and `user.level`
/// must already reflect it.
pub fn evaluate_badges(user: &User, workouts: &[Workout]) -> Vec<Badge> {
    let mut earned = Vec::new();

    if workouts.len() == 1 && !user.has_badge(Badge::FirstTraining) {
        earned.push(Badge::FirstTraining);
    }

    if !user.has_badge(Badge::SevenDayStreak) {
        let timestamps: Vec<DateTime<Utc>> = workouts.iter().map(|w| w.created_at).collect();
        if longest_streak(&timestamps) >= STREAK_TARGET {
            earned.push(Badge::SevenDayStreak);
        }
    }

    if user.level >= BADGE_LEVEL && !user.has_badge(Badge::LevelTen) {
        earned.push(Badge::LevelTen);
    }

    earned
}

/// Record newly earned badges on the user. Badges already held are skipped.
pub fn award_badges(user: &mut User, badges: &[Badge]) {
    for badge in badges {
        if !user.has_badge(*badge) {
            user.badges.push(badge.label().to_string());
        }
    }
}
