//! Environment-driven configuration
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Manifest directories, message overrides, sharding, forced registration
//! - 1.0.0: Token, log level and database path

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Shard this process runs, as assigned by the external supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardConfig {
    pub id: u64,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub log_level: String,
    pub database_path: String,
    pub actions_dir: PathBuf,
    pub events_dir: PathBuf,
    /// Message table overrides, skipped when the file does not exist
    pub messages_path: PathBuf,
    /// Publish commands to this guild only (development mode)
    pub discord_guild_id: Option<u64>,
    pub shard: Option<ShardConfig>,
    /// Overwrite colliding registry keys while loading
    pub force_register: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?;

        let discord_guild_id = get("DISCORD_GUILD_ID")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("invalid DISCORD_GUILD_ID value")?;

        let shard_id = get("SHARD_ID")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("invalid SHARD_ID value")?;
        let shard_count = get("SHARD_COUNT")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("invalid SHARD_COUNT value")?;
        let shard = match (shard_id, shard_count) {
            (Some(id), Some(count)) => {
                if count == 0 || id >= count {
                    bail!("SHARD_ID {id} is out of range for SHARD_COUNT {count}");
                }
                Some(ShardConfig { id, count })
            }
            (None, None) => None,
            _ => bail!("SHARD_ID and SHARD_COUNT must be set together"),
        };

        let force_register = match get("FORCE_REGISTER") {
            None => false,
            Some(v) => parse_flag(&v).with_context(|| format!("invalid FORCE_REGISTER value: {v}"))?,
        };

        Ok(Self {
            discord_token,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "courier.db".to_string()),
            actions_dir: get("ACTIONS_DIR")
                .unwrap_or_else(|| "definitions/actions".to_string())
                .into(),
            events_dir: get("EVENTS_DIR")
                .unwrap_or_else(|| "definitions/events".to_string())
                .into(),
            messages_path: get("MESSAGES_PATH")
                .unwrap_or_else(|| "locales/messages.yaml".to_string())
                .into(),
            discord_guild_id,
            shard,
            force_register,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
