use anyhow::{anyhow, Result};
use chrono::{FixedOffset, Local, Offset};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// The only channel commands are read from
    pub command_channel_id: u64,
    /// Every broadcast goes to each of these, in order
    pub announcement_channel_ids: Vec<u64>,
    pub mention_everyone: bool,
    pub cancel_reminders_on_delete: bool,
    pub event_utc_offset: FixedOffset,
    pub keepalive_port: Option<u16>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow!("{} environment variable not set", key))
        };

        let command_channel_id = parse_channel_id("COMMAND_CHANNEL_ID", &required("COMMAND_CHANNEL_ID")?)?;
        let announcement_channel_ids = required("ANNOUNCEMENT_CHANNEL_IDS")?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| parse_channel_id("ANNOUNCEMENT_CHANNEL_IDS", id))
            .collect::<Result<Vec<_>>>()?;
        if announcement_channel_ids.is_empty() {
            return Err(anyhow!("ANNOUNCEMENT_CHANNEL_IDS must list at least one channel"));
        }

        let event_utc_offset = match lookup("EVENT_UTC_OFFSET") {
            Some(raw) => raw
                .trim()
                .parse::<FixedOffset>()
                .map_err(|e| anyhow!("Invalid EVENT_UTC_OFFSET '{}': {}", raw, e))?,
            None => Local::now().offset().fix(),
        };

        let keepalive_port = lookup("KEEPALIVE_PORT")
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|e| anyhow!("Invalid KEEPALIVE_PORT '{}': {}", raw, e))
            })
            .transpose()?;

        Ok(Config {
            discord_token: required("DISCORD_TOKEN")?,
            command_channel_id,
            announcement_channel_ids,
            mention_everyone: parse_flag("MENTION_EVERYONE", lookup("MENTION_EVERYONE"))?,
            cancel_reminders_on_delete: parse_flag(
                "CANCEL_REMINDERS_ON_DELETE",
                lookup("CANCEL_REMINDERS_ON_DELETE"),
            )?,
            event_utc_offset,
            keepalive_port,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_channel_id(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| anyhow!("Invalid channel id '{}' in {}: {}", raw, key, e))
}

fn parse_flag(key: &str, raw: Option<String>) -> Result<bool> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("yes") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" || v.eq_ignore_ascii_case("no") => Ok(false),
        Some(v) => Err(anyhow!("Invalid {} '{}': expected true or false", key, v)),
    }
}
