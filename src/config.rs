use std::env;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://v3.football.api-sports.io";
const DEFAULT_API_HOST: &str = "v3.football.api-sports.io";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_PLAYER_THRESHOLD: u8 = 60;
const DEFAULT_RECENT_MATCHES: usize = 5;
pub const MAX_RECENT_MATCHES: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnv(&'static str),
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
    pub timeout: Duration,
    pub retries: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    /// Fixed season; `None` derives it from today's date on every request.
    pub season: Option<u16>,
    pub player_match_threshold: u8,
    pub recent_matches_default: usize,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("FOOTBALL_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingEnv("FOOTBALL_API_KEY"))?;
        let base_url = env_string("FOOTBALL_API_BASE_URL", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let api_host = env_string("FOOTBALL_API_HOST", DEFAULT_API_HOST);
        let timeout_secs = env_parse::<u64>("FOOTBALL_HTTP_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let retries = env_parse::<u32>("FOOTBALL_HTTP_RETRIES")
            .unwrap_or(DEFAULT_RETRIES)
            .min(5);
        let season = env_parse::<u16>("FOOTBALL_SEASON");
        let player_match_threshold = env_parse::<u8>("PLAYER_MATCH_THRESHOLD")
            .unwrap_or(DEFAULT_PLAYER_THRESHOLD)
            .min(100);
        let recent_matches_default = env_parse::<usize>("RECENT_MATCHES_DEFAULT")
            .unwrap_or(DEFAULT_RECENT_MATCHES)
            .clamp(1, MAX_RECENT_MATCHES);
        let bind_addr = env_string("BIND_ADDR", DEFAULT_BIND_ADDR);

        Ok(Self {
            provider: ProviderConfig {
                base_url,
                api_key,
                api_host,
                timeout: Duration::from_secs(timeout_secs),
                retries,
            },
            season,
            player_match_threshold,
            recent_matches_default,
            bind_addr,
        })
    }

    /// Settings used by tests and offline tooling; no credential attached.
    pub fn for_tests() -> Self {
        Self {
            provider: ProviderConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                api_key: String::new(),
                api_host: DEFAULT_API_HOST.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                retries: 0,
            },
            season: Some(2023),
            player_match_threshold: DEFAULT_PLAYER_THRESHOLD,
            recent_matches_default: DEFAULT_RECENT_MATCHES,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    pub fn season(&self) -> u16 {
        self.season
            .unwrap_or_else(|| season_for_date(chrono::Local::now().date_naive()))
    }

    pub fn match_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.recent_matches_default)
            .clamp(1, MAX_RECENT_MATCHES)
    }
}

/// European seasons start in July: Jan-Jun belong to the season that began
/// the previous year.
pub fn season_for_date(date: NaiveDate) -> u16 {
    let year = date.year() as u16;
    if date.month() >= 7 { year } else { year - 1 }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
