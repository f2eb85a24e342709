use std::{path::PathBuf, time::Duration};

use crate::errors::{BotError, BotResult};

const DEFAULT_DOWNLOADS_DIR: &str = "videos";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 2;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 100;

/// Runtime settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub downloads_dir: PathBuf,
    pub ytdlp_path: String,
    pub max_concurrent_downloads: usize,
    /// Timeout for every Telegram request, uploads included
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BotResult<Self> {
        let token = lookup("TELOXIDE_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BotError::config_error("TELOXIDE_TOKEN must be set"))?;

        let downloads_dir = lookup("DOWNLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOADS_DIR));

        let ytdlp_path = lookup("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string());

        let max_concurrent_downloads = match lookup("MAX_CONCURRENT_DOWNLOADS") {
            Some(v) => parse_number::<usize>("MAX_CONCURRENT_DOWNLOADS", &v)?.max(1),
            None => DEFAULT_MAX_CONCURRENT_DOWNLOADS,
        };

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(v) => parse_number::<u64>("REQUEST_TIMEOUT_SECS", &v)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            token,
            downloads_dir,
            ytdlp_path,
            max_concurrent_downloads,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> BotResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BotError::config_error(format!("{} must be a number, got {:?}", key, value)))
}
