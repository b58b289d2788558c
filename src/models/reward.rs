//! Reward tickets and avatar unlock table.

use crate::models::DEFAULT_AVATAR;

/// Avatars unlocked by reaching an exact level.
pub const AVATAR_REWARDS: [(u64, &str); 4] = [
    (3, "/avatars/level3.png"),
    (5, "/avatars/level5.png"),
    (7, "/avatars/level7.png"),
    (10, "/avatars/level10.png"),
];

/// Label of the ticket granted for reaching `level`.
pub fn ticket_label(level: u64) -> String {
    format!("Lv.{}報酬チケット", level)
}

/// Avatars whose unlock level lies in `(old_level, new_level]`.
pub fn avatars_unlocked_between(old_level: u64, new_level: u64) -> impl Iterator<Item = &'static str> {
    AVATAR_REWARDS
        .iter()
        .filter(move |(level, _)| *level > old_level && *level <= new_level)
        .map(|(_, avatar)| *avatar)
}

/// Whether `avatar` names an avatar that exists at all.
pub fn is_known_avatar(avatar: &str) -> bool {
    avatar == DEFAULT_AVATAR || AVATAR_REWARDS.iter().any(|(_, a)| *a == avatar)
}
