//! Application configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::games::tictactoe::Difficulty;
use crate::history::HISTORY_LIMIT;

/// Environment variable that overrides [`AppConfig::wallet_address`].
pub const WALLET_ADDRESS_ENV: &str = "TACOTEX_WALLET_ADDRESS";

/// Settings for the terminal front end.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pause before the local AI replies, in milliseconds.
    #[serde(default = "default_opponent_delay_ms")]
    opponent_delay_ms: u64,

    /// Records kept per account.
    #[serde(default = "default_history_limit")]
    history_limit: usize,

    /// JSON file backing history and settings.
    #[serde(default = "default_store_path")]
    store_path: PathBuf,

    /// Connected wallet account; history is keyed by it.
    #[serde(default)]
    wallet_address: Option<String>,

    /// Difficulty to start with instead of showing the selector.
    #[serde(default)]
    default_difficulty: Option<Difficulty>,
}

fn default_opponent_delay_ms() -> u64 {
    500
}

fn default_history_limit() -> usize {
    HISTORY_LIMIT
}

fn default_store_path() -> PathBuf {
    PathBuf::from("tacotex_store.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opponent_delay_ms: default_opponent_delay_ms(),
            history_limit: default_history_limit(),
            store_path: default_store_path(),
            wallet_address: None,
            default_difficulty: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(store = %config.store_path.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if given, otherwise the defaults, then applies
    /// environment overrides.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies [`WALLET_ADDRESS_ENV`] when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(address) = std::env::var(WALLET_ADDRESS_ENV)
            && !address.trim().is_empty()
        {
            debug!(%address, "Wallet address taken from environment");
            self.wallet_address = Some(address.trim().to_string());
        }
        self
    }

    /// Starts games at `difficulty` without showing the selector.
    pub fn with_default_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.default_difficulty = Some(difficulty);
        self
    }

    /// [`Self::opponent_delay_ms`] as a duration.
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
