// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Training Quest: a gamified strength-training log
//!
//! This crate provides the backend API that turns logged workouts into
//! experience, levels, reward tickets, avatars and badges.

pub mod config;
pub mod db;
pub mod error;
pub mod id_utils;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::LedgerDb;
use services::TrainingService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: LedgerDb,
    pub training: TrainingService,
}

impl AppState {
    /// Build state around a ledger, with fresh per-user locks.
    pub fn new(config: Config, db: LedgerDb) -> Self {
        let locks = std::sync::Arc::new(dashmap::DashMap::new());
        let training = TrainingService::new(db.clone(), locks, config.ticket_policy);
        Self {
            config,
            db,
            training,
        }
    }
}
