//! Configuration and CLI argument handling

use clap::Parser;
use serde::Deserialize;

use crate::error::ConfigError;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "gavel")]
#[command(about = "A community assistant bot for running debate events on Discord")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Path to the guild settings file
    #[arg(short, long, default_value = "gavel.json")]
    pub settings: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Secrets read from the environment (optionally loaded from a `.env` file).
pub struct Secrets {
    pub token: String,
    pub guild_id: u64,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?;
        let guild_id = std::env::var("GUILD_ID")
            .map_err(|_| ConfigError::MissingEnvVar("GUILD_ID".to_string()))?
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| ConfigError::InvalidEnvVar("GUILD_ID".to_string()))?;
        Ok(Self { token, guild_id })
    }
}

/// Per-guild settings: channel wiring and the team-role catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildSettings {
    /// Channel greeting new members.
    pub welcome_channel: u64,
    /// Channel receiving the short-lived role-watch announcements.
    pub announce_channel: u64,
    /// Role whose assignment triggers an announcement.
    pub watched_role: u64,
    /// Role mentioned in the team-reporting prompt.
    pub debater_role: u64,
    /// First half of the team catalog, displayed in listed order.
    pub team_roles_first: Vec<u64>,
    /// Second half of the team catalog, displayed sorted by role name.
    pub team_roles_second: Vec<u64>,
}

impl GuildSettings {
    /// Loads and validates the settings file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
            path: path.to_string(),
            source,
        })?;
        let settings: GuildSettings =
            serde_json::from_str(&raw).map_err(|source| ConfigError::SettingsParse {
                path: path.to_string(),
                source,
            })?;
        settings
            .validate()
            .map_err(|reason| ConfigError::SettingsInvalid {
                path: path.to_string(),
                reason,
            })?;
        Ok(settings)
    }

    /// Every team role in the catalog, both halves, in catalog order.
    pub fn all_team_roles(&self) -> impl Iterator<Item = u64> + '_ {
        self.team_roles_first
            .iter()
            .chain(&self.team_roles_second)
            .copied()
    }

    pub fn team_role_count(&self) -> usize {
        self.team_roles_first.len() + self.team_roles_second.len()
    }

    fn validate(&self) -> Result<(), String> {
        let ids = [
            ("welcome_channel", self.welcome_channel),
            ("announce_channel", self.announce_channel),
            ("watched_role", self.watched_role),
            ("debater_role", self.debater_role),
        ];
        for (name, id) in ids {
            if id == 0 {
                return Err(format!("{name} must be a non-zero id"));
            }
        }
        if self.all_team_roles().any(|id| id == 0) {
            return Err("team role catalog contains a zero id".to_string());
        }
        // Discord caps a select menu at 25 options per dropdown.
        if self.team_roles_first.len() > 25 || self.team_roles_second.len() > 25 {
            return Err("each team catalog half is limited to 25 roles".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GuildSettings {
        GuildSettings {
            welcome_channel: 1,
            announce_channel: 2,
            watched_role: 3,
            debater_role: 4,
            team_roles_first: vec![100, 101],
            team_roles_second: vec![200],
        }
    }

    #[test]
    fn valid_settings_pass_validation() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn zero_ids_fail_validation() {
        let mut broken = settings();
        broken.watched_role = 0;
        assert!(broken.validate().is_err());

        let mut broken = settings();
        broken.team_roles_second = vec![200, 0];
        assert!(broken.validate().is_err());
    }

    #[test]
    fn oversized_catalog_half_fails_validation() {
        let mut broken = settings();
        broken.team_roles_first = (1..=26).collect();
        assert!(broken.validate().is_err());
    }

    #[test]
    fn catalog_iterates_both_halves_in_order() {
        let all: Vec<u64> = settings().all_team_roles().collect();
        assert_eq!(all, vec![100, 101, 200]);
        assert_eq!(settings().team_role_count(), 3);
    }

    #[test]
    fn settings_parse_from_json() {
        let parsed: GuildSettings = serde_json::from_str(
            r#"{
                "welcome_channel": 1410541883884568688,
                "announce_channel": 1417850104806637670,
                "watched_role": 1410554605494079498,
                "debater_role": 1410554605494079498,
                "team_roles_first": [1410618414891929681],
                "team_roles_second": [1412413185612316673]
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.team_role_count(), 2);
    }
}
