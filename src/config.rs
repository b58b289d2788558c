//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and kept in memory.

use std::env;

use crate::services::rewards::TicketPolicy;

/// Which ledger backend stores users and workouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for LedgerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "firestore" => Ok(LedgerBackend::Firestore),
            "memory" => Ok(LedgerBackend::Memory),
            _ => Err(ConfigError::Invalid("LEDGER_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage backend
    pub ledger_backend: LedgerBackend,
    /// Tickets granted on multi-level jumps
    pub ticket_policy: TicketPolicy,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let ledger_backend = match env::var("LEDGER_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => LedgerBackend::Firestore,
        };

        let ticket_policy = match env::var("TICKET_POLICY") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("TICKET_POLICY"))?,
            Err(_) => TicketPolicy::default(),
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .ok_or(ConfigError::Invalid("BCRYPT_COST"))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            ledger_backend,
            ticket_policy,
            bcrypt_cost,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests: in-memory ledger and the cheapest bcrypt cost.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            ledger_backend: LedgerBackend::Memory,
            ticket_policy: TicketPolicy::FinalLevel,
            bcrypt_cost: 4,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("LEDGER_BACKEND", "memory");
        env::set_var("TICKET_POLICY", "every_level");
        env::set_var("BCRYPT_COST", "5");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.ledger_backend, LedgerBackend::Memory);
        assert_eq!(config.ticket_policy, TicketPolicy::EveryLevel);
        assert_eq!(config.bcrypt_cost, 5);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(
            "firestore".parse::<LedgerBackend>().unwrap(),
            LedgerBackend::Firestore
        );
        assert!(matches!(
            "postgres".parse::<LedgerBackend>(),
            Err(ConfigError::Invalid("LEDGER_BACKEND"))
        ));
    }
}
