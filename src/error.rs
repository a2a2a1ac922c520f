//! Error taxonomy for the bot.

use thiserror::Error;

/// Errors surfaced by the timer engine at the request boundary.
///
/// Background failures (unreachable display messages, notification delivery)
/// are recovered where they occur and never become a `TimerError`.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The duration text parsed to zero seconds.
    #[error("Please provide a valid duration.")]
    InvalidDuration,

    /// A timer is already registered for this (guild, channel, subject).
    #[error("A timer is already active for this member in this channel.")]
    AlreadyActive,

    /// The registry mutex was poisoned by a panicking holder.
    #[error("Timer registry unavailable: {0}")]
    Registry(String),
}

/// Errors raised while loading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is not set.
    ///
    /// Check the documentation or `.env.example` for required variables.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable is set but does not parse.
    #[error("Invalid value for environment variable: {0}")]
    InvalidEnvVar(String),

    #[error("Failed to read settings file {path}: {source}")]
    SettingsRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    SettingsParse {
        path: String,
        source: serde_json::Error,
    },

    /// Settings parsed but contain unusable values (e.g. zero snowflakes).
    #[error("Invalid settings in {path}: {reason}")]
    SettingsInvalid { path: String, reason: String },
}
