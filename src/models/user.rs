//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Badge;

/// Avatar every user owns from registration onward.
pub const DEFAULT_AVATAR: &str = "/avatars/level1.png";

/// User record stored in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID (also used as document ID)
    pub id: String,
    /// Unique display name, used for login
    pub name: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Total experience points
    #[serde(default)]
    pub exp: u64,
    /// Current level, derived from `exp`
    #[serde(default = "default_level")]
    pub level: u64,
    /// Currently equipped avatar
    pub avatar: String,
    /// Avatars unlocked so far (no duplicates)
    #[serde(default)]
    pub owned_avatars: Vec<String>,
    /// Reward ticket labels, oldest first (duplicates allowed)
    #[serde(default)]
    pub rewards: Vec<String>,
    /// Badge labels, in award order
    #[serde(default)]
    pub badges: Vec<String>,
    /// Incremented on every write for optimistic concurrency
    #[serde(default)]
    pub version: u64,
    /// When the user registered (RFC 3339)
    pub created_at: String,
}

fn default_level() -> u64 {
    1
}

impl User {
    /// Build a freshly registered user with zero progression.
    pub fn new(id: String, name: String, password_hash: String, created_at: String) -> Self {
        Self {
            id,
            name,
            password_hash,
            exp: 0,
            level: 1,
            avatar: DEFAULT_AVATAR.to_string(),
            owned_avatars: vec![DEFAULT_AVATAR.to_string()],
            rewards: Vec::new(),
            badges: Vec::new(),
            version: 0,
            created_at,
        }
    }

    pub fn owns_avatar(&self, avatar: &str) -> bool {
        self.owned_avatars.iter().any(|a| a == avatar)
    }

    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.iter().any(|b| b == badge.label())
    }

    /// Count of reward tickets with the given label.
    pub fn ticket_count(&self, label: &str) -> usize {
        self.rewards.iter().filter(|r| *r == label).count()
    }
}

/// Full profile of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub level: u64,
    pub avatar: String,
    pub owned_avatars: Vec<String>,
    pub rewards: Vec<String>,
    pub badges: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            exp: user.exp,
            level: user.level,
            avatar: user.avatar,
            owned_avatars: user.owned_avatars,
            rewards: user.rewards,
            badges: user.badges,
        }
    }
}

/// What other users can see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub level: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp: u64,
    pub avatar: String,
    pub owned_avatars: Vec<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            level: user.level,
            exp: user.exp,
            avatar: user.avatar,
            owned_avatars: user.owned_avatars,
        }
    }
}
