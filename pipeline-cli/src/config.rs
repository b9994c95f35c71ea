//! Pipeline configuration: paths from the environment and the roster of groups and channels
//! from a JSON file.

use anyhow::{Context, Result};
use pipeline_core::PipelineError;
use pipeline_telegram::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fmt::Write;

pub struct PipelineConfig {
    pub database_url: String,
    pub log_file: String,
    pub roster_path: String,
    pub media_dir: String,
}

impl PipelineConfig {
    /// Loads paths from DATABASE_URL, LOG_FILE, PIPELINE_CONFIG and MEDIA_DIR. A given
    /// `roster_path` overrides PIPELINE_CONFIG.
    pub fn load(roster_path: Option<String>) -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "pipeline.sqlite".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/gif-pipeline.log".to_string());
        let roster_path = roster_path
            .or_else(|| env::var("PIPELINE_CONFIG").ok())
            .unwrap_or_else(|| "config.json".to_string());
        let media_dir = env::var("MEDIA_DIR").unwrap_or_else(|_| "store/".to_string());
        Self {
            database_url,
            log_file,
            roster_path,
            media_dir,
        }
    }
}

/// Telegram settings from env; a given token overrides BOT_TOKEN. The API URL is validated here.
pub fn load_telegram_config(token: Option<String>) -> Result<TelegramConfig> {
    let config = match token {
        Some(token) => {
            let mut config = TelegramConfig::with_token(token);
            config.telegram_api_url = env::var("TELEGRAM_API_URL")
                .or_else(|_| env::var("TELOXIDE_API_URL"))
                .ok();
            config
        }
        None => TelegramConfig::from_env()?,
    };
    config.build_bot()?;
    Ok(config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub chat_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub chat_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub read_only: bool,
}

/// Configured chats. Channel order is the order destinations are offered in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

impl Roster {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file {}", path))?;
        let roster = Self::from_json(&content)?;
        Ok(roster)
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, PipelineError> {
        let roster: Roster = serde_json::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Invalid roster: {}", e)))?;
        roster.validate()?;
        Ok(roster)
    }

    /// Chat ids are unique across groups and channels; channel usernames are unique ignoring
    /// case and a leading `@`.
    pub fn validate(&self) -> std::result::Result<(), PipelineError> {
        let mut chat_ids = HashSet::new();
        let ids = self
            .groups
            .iter()
            .map(|g| g.chat_id)
            .chain(self.channels.iter().map(|c| c.chat_id));
        for chat_id in ids {
            if !chat_ids.insert(chat_id) {
                return Err(PipelineError::Config(format!(
                    "Duplicate chat id in roster: {}",
                    chat_id
                )));
            }
        }

        let mut usernames = HashSet::new();
        for username in self.channels.iter().filter_map(|c| c.username.as_deref()) {
            let normalized = username.trim_start_matches('@').to_lowercase();
            if !usernames.insert(normalized) {
                return Err(PipelineError::Config(format!(
                    "Duplicate channel username in roster: {}",
                    username
                )));
            }
        }
        Ok(())
    }

    /// Human-readable listing for the `channels` command.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Groups:");
        for group in &self.groups {
            let _ = writeln!(
                out,
                "  {} {}",
                group.chat_id,
                group.username.as_deref().unwrap_or("-")
            );
        }
        let _ = writeln!(out, "Channels:");
        for channel in &self.channels {
            let _ = writeln!(
                out,
                "  {} {}{}",
                channel.chat_id,
                channel.username.as_deref().unwrap_or("-"),
                if channel.read_only { " (read-only)" } else { "" }
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ROSTER: &str = r#"{
        "groups": [{"chat_id": -1001}],
        "channels": [
            {"chat_id": -1002, "username": "deergifs"},
            {"chat_id": -1003, "username": "archive", "read_only": true}
        ]
    }"#;

    #[test]
    fn test_roster_parses_in_declaration_order() {
        let roster = Roster::from_json(ROSTER).unwrap();
        assert_eq!(roster.groups, vec![GroupEntry { chat_id: -1001, username: None }]);
        assert_eq!(roster.channels[0].chat_id, -1002);
        assert!(!roster.channels[0].read_only);
        assert!(roster.channels[1].read_only);
    }

    #[test]
    fn test_roster_rejects_duplicate_chat_id() {
        let err = Roster::from_json(
            r#"{"groups": [{"chat_id": 5}], "channels": [{"chat_id": 5, "username": "a"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate chat id"));
    }

    #[test]
    fn test_roster_rejects_duplicate_username_ignoring_case() {
        let err = Roster::from_json(
            r#"{"channels": [
                {"chat_id": 1, "username": "DeerGifs"},
                {"chat_id": 2, "username": "@deergifs"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate channel username"));
    }

    #[test]
    fn test_roster_rejects_malformed_json() {
        assert!(matches!(
            Roster::from_json("{\"channels\": 3}"),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_roster_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, ROSTER).unwrap();

        let roster = Roster::load(path.to_str().unwrap()).unwrap();

        assert_eq!(roster.channels.len(), 2);
        assert!(Roster::load(dir.path().join("missing.json").to_str().unwrap()).is_err());
    }

    #[test]
    fn test_describe_marks_read_only() {
        let listing = Roster::from_json(ROSTER).unwrap().describe();
        assert!(listing.contains("-1002 deergifs\n"));
        assert!(listing.contains("-1003 archive (read-only)"));
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        env::remove_var("DATABASE_URL");
        env::remove_var("LOG_FILE");
        env::remove_var("PIPELINE_CONFIG");
        env::remove_var("MEDIA_DIR");

        let config = PipelineConfig::load(None);

        assert_eq!(config.database_url, "pipeline.sqlite");
        assert_eq!(config.log_file, "logs/gif-pipeline.log");
        assert_eq!(config.roster_path, "config.json");
        assert_eq!(config.media_dir, "store/");
    }

    #[test]
    #[serial]
    fn test_load_config_roster_override() {
        env::set_var("PIPELINE_CONFIG", "env.json");
        assert_eq!(PipelineConfig::load(None).roster_path, "env.json");
        assert_eq!(
            PipelineConfig::load(Some("cli.json".to_string())).roster_path,
            "cli.json"
        );
        env::remove_var("PIPELINE_CONFIG");
    }

    #[test]
    #[serial]
    fn test_load_telegram_config_with_override_token() {
        env::set_var("BOT_TOKEN", "env_token");
        env::remove_var("TELEGRAM_API_URL");
        env::remove_var("TELOXIDE_API_URL");

        let config = load_telegram_config(Some("override_token".to_string())).unwrap();

        assert_eq!(config.bot_token, "override_token");
        assert!(config.telegram_api_url.is_none());
    }

    #[test]
    #[serial]
    fn test_load_telegram_config_rejects_invalid_url() {
        env::set_var("BOT_TOKEN", "env_token");
        env::set_var("TELEGRAM_API_URL", "not a url");

        let result = load_telegram_config(None);
        env::remove_var("TELEGRAM_API_URL");

        assert!(result.is_err());
    }
}
