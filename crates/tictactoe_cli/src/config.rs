//! Client configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tictactoe_session::LoopbackConfig;
use tracing::{debug, info, instrument};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "tictactoe.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Simulated game server settings.
    #[serde(default)]
    loopback: LoopbackSettings,
}

/// `[loopback]` table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LoopbackSettings {
    /// Milliseconds until the connection opens.
    #[serde(default = "default_connect_delay_ms")]
    connect_delay_ms: u64,

    /// Milliseconds before create/join are answered.
    #[serde(default = "default_ack_delay_ms")]
    ack_delay_ms: u64,

    /// Milliseconds before a move is echoed.
    #[serde(default = "default_move_delay_ms")]
    move_delay_ms: u64,

    /// Whether a simulated opponent joins and plays.
    #[serde(default = "default_auto_opponent")]
    auto_opponent: bool,

    /// Fixed seed for game ids.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_connect_delay_ms() -> u64 {
    500
}

fn default_ack_delay_ms() -> u64 {
    500
}

fn default_move_delay_ms() -> u64 {
    300
}

fn default_auto_opponent() -> bool {
    true
}

impl Default for LoopbackSettings {
    fn default() -> Self {
        Self {
            connect_delay_ms: default_connect_delay_ms(),
            ack_delay_ms: default_ack_delay_ms(),
            move_delay_ms: default_move_delay_ms(),
            auto_opponent: default_auto_opponent(),
            seed: None,
        }
    }
}

impl LoopbackSettings {
    /// Converts to the transport's configuration.
    pub fn to_loopback_config(&self) -> LoopbackConfig {
        LoopbackConfig::new(
            Duration::from_millis(self.connect_delay_ms),
            Duration::from_millis(self.ack_delay_ms),
            Duration::from_millis(self.move_delay_ms),
            self.auto_opponent,
            self.seed,
        )
    }
}

impl ClientConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(auto_opponent = config.loopback.auto_opponent, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given. Otherwise loads [`DEFAULT_CONFIG_PATH`] when it
    /// exists and falls back to defaults when it does not.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => {
                debug!("No config file; using defaults");
                Ok(Self::default())
            }
        }
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
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
