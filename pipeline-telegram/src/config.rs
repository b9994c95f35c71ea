//! Telegram connection settings: token and optional API URL.
//! Loaded from the environment variables BOT_TOKEN and TELEGRAM_API_URL (or TELOXIDE_API_URL).

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    /// BOT_TOKEN is required; the API URL is optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?;
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        Ok(Self {
            bot_token,
            telegram_api_url,
        })
    }

    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
        }
    }

    /// Builds the teloxide Bot, pointing it at the custom API URL when one is set.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = teloxide::Bot::new(&self.bot_token);
        match &self.telegram_api_url {
            Some(url) => {
                let url = reqwest::Url::parse(url)
                    .with_context(|| format!("Invalid TELEGRAM_API_URL: {}", url))?;
                Ok(bot.set_api_url(url))
            }
            None => Ok(bot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.telegram_api_url.is_none());
    }

    #[test]
    fn test_build_bot_rejects_invalid_api_url() {
        let mut config = TelegramConfig::with_token("test_token".to_string());
        config.telegram_api_url = Some("not a url".to_string());
        assert!(config.build_bot().is_err());
    }

    #[test]
    fn test_build_bot_uses_custom_api_url() {
        let mut config = TelegramConfig::with_token("test_token".to_string());
        config.telegram_api_url = Some("http://localhost:8081/".to_string());
        let bot = config.build_bot().unwrap();
        assert_eq!(bot.api_url().as_str(), "http://localhost:8081/");
    }
}
