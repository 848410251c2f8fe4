//! Engine Configuration
//!
//! Rules that vary per deployment. Loaded from JSON (file or string) or from
//! `VEILED_DUEL_*` environment variables layered over the defaults.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// What a draw does on an empty deck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckExhaustion {
    /// Fail the draw with `DeckExhausted`; the game is stuck until resolved
    /// externally.
    #[default]
    Reject,
    /// Skip the draw without a proof.
    SkipDraw,
    /// The exhausted player loses immediately.
    Lose,
}

/// What a draw does when the ledger no longer serves the recorded anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleAnchor {
    /// Accept the draw as a re-anchor: no card moves, the step stays `Draw`,
    /// and a fresh future anchor is recorded.
    #[default]
    Reanchor,
    /// Fail the draw with `AnchorUnavailable`.
    Reject,
}

/// Engine rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Health each player starts with.
    pub starting_health: u32,
    /// Cards dealt into the hand at join.
    pub initial_hand_size: u32,
    /// Empty-deck draw rule.
    pub deck_exhaustion: DeckExhaustion,
    /// Expired-anchor draw rule.
    pub stale_anchor: StaleAnchor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_health: 20,
            initial_hand_size: 3,
            deck_exhaustion: DeckExhaustion::Reject,
            stale_anchor: StaleAnchor::Reanchor,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// JSON did not parse.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Environment variable holds an unusable value.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// Parsed values are unusable.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by `VEILED_DUEL_STARTING_HEALTH`,
    /// `VEILED_DUEL_INITIAL_HAND_SIZE`, `VEILED_DUEL_DECK_EXHAUSTION` and
    /// `VEILED_DUEL_STALE_ANCHOR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("VEILED_DUEL_STARTING_HEALTH") {
            config.starting_health = value.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "VEILED_DUEL_STARTING_HEALTH",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("VEILED_DUEL_INITIAL_HAND_SIZE") {
            config.initial_hand_size = value.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "VEILED_DUEL_INITIAL_HAND_SIZE",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("VEILED_DUEL_DECK_EXHAUSTION") {
            config.deck_exhaustion = match value.as_str() {
                "reject" => DeckExhaustion::Reject,
                "skip_draw" => DeckExhaustion::SkipDraw,
                "lose" => DeckExhaustion::Lose,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "VEILED_DUEL_DECK_EXHAUSTION",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("VEILED_DUEL_STALE_ANCHOR") {
            config.stale_anchor = match value.as_str() {
                "reanchor" => StaleAnchor::Reanchor,
                "reject" => StaleAnchor::Reject,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "VEILED_DUEL_STALE_ANCHOR",
                        value,
                    });
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no game could be played under.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_health == 0 {
            return Err(ConfigError::Invalid("starting_health must be positive"));
        }
        Ok(())
    }
}
