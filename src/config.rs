//! Configuration loading.
//!
//! The config file is TOML with a typed `[connection]` section, a
//! `[general]` section naming the plugins to load, and one opaque table
//! per plugin that is handed to the plugin's constructor untouched.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or is missing required keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server connection settings.
    pub connection: ConnectionConfig,
    /// Plugin chain settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Per-plugin sections, keyed by plugin name. Opaque to the core;
    /// each plugin deserializes its own section.
    #[serde(flatten)]
    pub plugins: toml::Table,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The raw config table for a plugin, if one was given.
    pub fn plugin_section(&self, name: &str) -> Option<&toml::Value> {
        self.plugins.get(name)
    }
}

/// Connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname (e.g. "irc.chat.twitch.tv").
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Nickname, which for Twitch is the bot's account name.
    pub nickname: String,
    /// Channel to join after authenticating.
    pub channel: Option<String>,
    /// Server password (`oauth:...` token for Twitch).
    pub password: Option<String>,
    /// Seconds without any inbound bytes before the connection is
    /// considered dead.
    #[serde(default = "default_activity_timeout")]
    pub activity_timeout: u64,
    /// Echo raw traffic at debug level.
    #[serde(default)]
    pub log_traffic: bool,
}

/// Plugin chain settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Plugins to load, in dispatch order.
    #[serde(default)]
    pub plugins: Vec<String>,
}

fn default_port() -> u16 {
    6667
}

fn default_activity_timeout() -> u64 {
    600
}
