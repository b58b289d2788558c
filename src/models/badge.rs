// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Achievement badges.

use serde::{Deserialize, Serialize};

/// The closed set of achievement badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    /// Awarded for the very first logged workout.
    #[serde(rename = "初トレーニング")]
    FirstTraining,
    /// Awarded for a run of at least seven closely spaced workouts.
    #[serde(rename = "継続の鬼")]
    SevenDayStreak,
    /// Awarded on reaching level 10.
    #[serde(rename = "筋肉王")]
    LevelTen,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::FirstTraining, Badge::SevenDayStreak, Badge::LevelTen];

    /// Label stored on the user record and shown to clients.
    pub fn label(self) -> &'static str {
        match self {
            Badge::FirstTraining => "初トレーニング",
            Badge::SevenDayStreak => "継続の鬼",
            Badge::LevelTen => "筋肉王",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
