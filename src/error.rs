//! Error handling for the bot.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from a single [`read_next_line`] call.
///
/// [`read_next_line`]: crate::connection::Connection::read_next_line
#[derive(Debug, Error)]
pub enum ReadError {
    /// The call's own deadline passed with no complete line. Not fatal:
    /// the connection stays open and the caller retries.
    #[error("timed out waiting for a line")]
    Timeout,

    /// An unrecoverable I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded or parsed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An unrecoverable connection failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `[general] plugins` named a plugin that does not exist.
    #[error("unknown plugin: {0:?}")]
    UnknownPlugin(String),

    /// A plugin rejected its configuration section.
    #[error("plugin {name:?}: {reason}")]
    PluginConfig {
        /// The plugin being configured.
        name: String,
        /// What was wrong with its configuration.
        reason: String,
    },
}
