// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Experience and level computation.
//!
//! Pure functions only: callers persist the results.

use crate::models::User;

/// Experience earned per kilogram-repetition.
pub const EXP_PER_KG_REP: f64 = 0.2;

/// Experience needed to advance one level.
pub const EXP_PER_LEVEL: u64 = 100;

/// Outcome of applying one workout's experience to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    pub exp_gain: u64,
    pub new_exp: u64,
    pub new_level: u64,
    pub leveled_up: bool,
}

/// Rejected workout input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("weight must be a positive number (got {0})")]
    Weight(f64),

    #[error("reps must be a positive integer")]
    Reps,
}

/// Level for a given experience total.
pub fn level_for_exp(exp: u64) -> u64 {
    exp / EXP_PER_LEVEL + 1
}

/// Experience earned for lifting `weight` kilograms `reps` times.
pub fn exp_gain(weight: f64, reps: u32) -> Result<u64, InvalidInput> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(InvalidInput::Weight(weight));
    }
    if reps == 0 {
        return Err(InvalidInput::Reps);
    }

    // Float-to-int casts saturate, so absurd inputs cannot wrap.
    Ok((weight * f64::from(reps) * EXP_PER_KG_REP).floor() as u64)
}

/// Compute the user's progression after a workout.
pub fn compute_progression(user: &User, weight: f64, reps: u32) -> Result<Progression, InvalidInput> {
    let exp_gain = exp_gain(weight, reps)?;
    let new_exp = user.exp.saturating_add(exp_gain);
    let new_level = level_for_exp(new_exp);

    Ok(Progression {
        exp_gain,
        new_exp,
        new_level,
        leveled_up: new_level > user.level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(exp: u64, level: u64) -> User {
        let mut user = User::new(
            "u1".to_string(),
            "taro".to_string(),
            "hash".to_string(),
            "2026-01-01T00:00:00Z".to_string(),
        );
        user.exp = exp;
        user.level = level;
        user
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_exp(0), 1);
        assert_eq!(level_for_exp(99), 1);
        assert_eq!(level_for_exp(100), 2);
        assert_eq!(level_for_exp(250), 3);
        assert_eq!(level_for_exp(999), 10);
    }

    #[test]
    fn test_exp_gain_floors() {
        assert_eq!(exp_gain(60.0, 10), Ok(120));
        assert_eq!(exp_gain(80.0, 12), Ok(192));
        // 2.5 * 3 * 0.2 = 1.5
        assert_eq!(exp_gain(2.5, 3), Ok(1));
        // Light sets can earn nothing
        assert_eq!(exp_gain(1.0, 2), Ok(0));
    }

    #[test]
    fn test_exp_gain_rejects_bad_input() {
        assert_eq!(exp_gain(0.0, 10), Err(InvalidInput::Weight(0.0)));
        assert_eq!(exp_gain(-5.0, 10), Err(InvalidInput::Weight(-5.0)));
        assert!(exp_gain(f64::NAN, 10).is_err());
        assert!(exp_gain(f64::INFINITY, 10).is_err());
        assert_eq!(exp_gain(50.0, 0), Err(InvalidInput::Reps));
    }

    #[test]
    fn test_multi_level_jump() {
        let user = user_with(90, 1);

        let p = compute_progression(&user, 60.0, 10).unwrap();

        assert_eq!(
            p,
            Progression {
                exp_gain: 120,
                new_exp: 210,
                new_level: 3,
                leveled_up: true,
            }
        );
    }

    #[test]
    fn test_no_level_up_within_level() {
        let user = user_with(100, 2);

        let p = compute_progression(&user, 20.0, 10).unwrap();

        assert_eq!(p.exp_gain, 40);
        assert_eq!(p.new_exp, 140);
        assert_eq!(p.new_level, 2);
        assert!(!p.leveled_up);
    }

    #[test]
    fn test_exact_boundary_levels_up() {
        let user = user_with(50, 1);

        let p = compute_progression(&user, 25.0, 10).unwrap();

        assert_eq!(p.new_exp, 100);
        assert_eq!(p.new_level, 2);
        assert!(p.leveled_up);
    }

    #[test]
    fn test_gain_is_never_negative_for_valid_input() {
        for weight in [0.5, 1.0, 7.5, 42.0, 250.0] {
            for reps in [1, 3, 8, 15, 100] {
                let gain = exp_gain(weight, reps).unwrap();
                assert_eq!(gain, (weight * reps as f64 * 0.2).floor() as u64);
            }
        }
    }
}
