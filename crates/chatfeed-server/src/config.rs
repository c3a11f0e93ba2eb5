use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use chatfeed_api::assemble::DEFAULT_MAX_MESSAGES;
use chatfeed_gateway::{DEFAULT_API_BASE, DEFAULT_HISTORY_LIMIT, DEFAULT_TIMEOUT, SlackConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub slack: SlackConfig,
    pub max_messages: usize,
    pub emoji_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Empty values count as unset so a blank line in .env keeps the default.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let Some(token) = get("CHATFEED_SLACK_TOKEN") else {
            bail!("CHATFEED_SLACK_TOKEN must be set");
        };
        let Some(channel_id) = get("CHATFEED_CHANNEL_ID") else {
            bail!("CHATFEED_CHANNEL_ID must be set");
        };

        let timeout_secs: u64 = parse_or(&get, "CHATFEED_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;

        let slack = SlackConfig {
            api_base: get("CHATFEED_SLACK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            token,
            channel_id,
            history_limit: parse_or(&get, "CHATFEED_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            host: get("CHATFEED_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "CHATFEED_PORT", 3000)?,
            slack,
            max_messages: parse_or(&get, "CHATFEED_MAX_MESSAGES", DEFAULT_MAX_MESSAGES)?,
            emoji_path: get("CHATFEED_EMOJI_PATH").map(PathBuf::from),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
