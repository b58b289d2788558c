// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Level-up rewards: tickets, avatar unlocks, and ticket consumption.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{avatars_unlocked_between, ticket_label, User};

/// How many tickets a multi-level jump earns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPolicy {
    /// One ticket for the level the workout lands on.
    #[default]
    FinalLevel,
    /// One ticket for every level crossed.
    EveryLevel,
}

impl std::str::FromStr for TicketPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "final_level" => Ok(TicketPolicy::FinalLevel),
            "every_level" => Ok(TicketPolicy::EveryLevel),
            other => Err(format!("unknown ticket policy '{}'", other)),
        }
    }
}

/// Rewards produced by one level transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RewardBundle {
    pub tickets: Vec<String>,
    pub avatars: Vec<String>,
}

impl RewardBundle {
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty() && self.avatars.is_empty()
    }
}

/// Ticket label was not in the user's rewards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ticket '{0}' not held")]
pub struct TicketNotFound(pub String);

/// Most tickets a single workout can earn under [`TicketPolicy::EveryLevel`].
/// A larger jump pays out for its highest levels only.
pub const MAX_TICKETS_PER_WORKOUT: u64 = 10;

/// Most unspent tickets a user can hold. The user record is stored as one
/// document, so it must not grow without limit.
pub const MAX_HELD_TICKETS: usize = 500;

/// Determine the rewards for moving from `old_level` to `new_level`.
///
/// Avatars are unlocked for every table level crossed, so a jump past
/// level 5 still hands out the level 5 avatar.
pub fn evaluate_level_up_rewards(old_level: u64, new_level: u64, policy: TicketPolicy) -> RewardBundle {
    if new_level <= old_level {
        return RewardBundle::default();
    }

    let tickets = match policy {
        TicketPolicy::FinalLevel => vec![ticket_label(new_level)],
        TicketPolicy::EveryLevel => {
            let first = (old_level + 1).max(new_level.saturating_sub(MAX_TICKETS_PER_WORKOUT - 1));
            (first..=new_level).map(ticket_label).collect()
        }
    };

    let avatars = avatars_unlocked_between(old_level, new_level)
        .map(str::to_string)
        .collect();

    RewardBundle { tickets, avatars }
}

/// Add `avatar` to the user's owned set.
///
/// Returns `false` without touching the user if it is already owned.
pub fn unlock_avatar(user: &mut User, avatar: &str) -> bool {
    if user.owns_avatar(avatar) {
        return false;
    }
    user.owned_avatars.push(avatar.to_string());
    true
}

/// Apply a reward bundle to the user, skipping avatars already owned and
/// tickets beyond [`MAX_HELD_TICKETS`].
///
/// Returns the bundle that actually changed the user.
pub fn grant_rewards(user: &mut User, bundle: RewardBundle) -> RewardBundle {
    let room = MAX_HELD_TICKETS.saturating_sub(user.rewards.len());
    if bundle.tickets.len() > room {
        tracing::warn!(
            user_id = %user.id,
            held = user.rewards.len(),
            dropped = bundle.tickets.len() - room,
            "Ticket limit reached, not granting all tickets"
        );
    }
    let tickets: Vec<String> = bundle.tickets.into_iter().take(room).collect();
    user.rewards.extend(tickets.iter().cloned());

    let avatars = bundle
        .avatars
        .into_iter()
        .filter(|avatar| unlock_avatar(user, avatar))
        .collect();

    RewardBundle { tickets, avatars }
}

/// Remove one ticket with the given label, the earliest granted first.
pub fn consume_ticket<'a>(user: &'a mut User, label: &str) -> Result<&'a [String], TicketNotFound> {
    let index = user
        .rewards
        .iter()
        .position(|r| r == label)
        .ok_or_else(|| TicketNotFound(label.to_string()))?;
    user.rewards.remove(index);
    Ok(&user.rewards)
}
