//! Environment-driven configuration

use crate::types::{GameConfig, MAX_HAND_SIZE, MAX_ROUND_SECONDS, MIN_PLAYERS};
use std::path::PathBuf;
use std::str::FromStr;

/// Read an env var and parse it, falling back to `default` when unset or invalid
fn env_parse<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value {:?} for {}, using {}", raw, name, default);
                default
            }
        },
        Err(_) => default,
    }
}

impl GameConfig {
    /// Load game rules from environment variables
    /// (ROUND_SECONDS, HAND_SIZE, MIN_PLAYERS)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut config = Self {
            round_seconds: env_parse("ROUND_SECONDS", defaults.round_seconds),
            hand_size: env_parse("HAND_SIZE", defaults.hand_size),
            min_players: env_parse("MIN_PLAYERS", defaults.min_players),
        };

        if config.round_seconds == 0 || config.round_seconds > MAX_ROUND_SECONDS {
            let clamped = config.round_seconds.clamp(1, MAX_ROUND_SECONDS);
            tracing::warn!(
                "ROUND_SECONDS={} is outside 1..={}, using {}",
                config.round_seconds,
                MAX_ROUND_SECONDS,
                clamped
            );
            config.round_seconds = clamped;
        }

        if config.hand_size == 0 || config.hand_size > MAX_HAND_SIZE {
            let clamped = config.hand_size.clamp(1, MAX_HAND_SIZE);
            tracing::warn!(
                "HAND_SIZE={} is outside 1..={}, using {}",
                config.hand_size,
                MAX_HAND_SIZE,
                clamped
            );
            config.hand_size = clamped;
        }

        // A round needs a judge plus at least two players to pick between
        if config.min_players < MIN_PLAYERS {
            tracing::warn!(
                "MIN_PLAYERS={} is below {}, using {}",
                config.min_players,
                MIN_PLAYERS,
                MIN_PLAYERS
            );
            config.min_players = MIN_PLAYERS;
        }
        config
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Optional JSON card file replacing the built-in deck
    pub cards_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cards_path: None,
        }
    }
}

impl ServerConfig {
    /// Load server config from environment variables (PORT, CARDS_PATH)
    pub fn from_env() -> Self {
        let cards_path = std::env::var("CARDS_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            port: env_parse("PORT", Self::default().port),
            cards_path,
        }
    }
}
