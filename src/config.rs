//! Settings read from the environment, optionally through a `.env` file.

use std::{fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;

use crate::store::SupabaseConfig;

/// Picker contents when `STICKERS` is unset.
pub const DEFAULT_STICKERS: &[&str] = &[
    "https://stickers.example/party.gif",
    "https://stickers.example/wave.gif",
    "https://stickers.example/thumbs-up.png",
    "https://stickers.example/facepalm.gif",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} is set but {1} is not")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Local sqlite store, used when no Supabase project is configured.
    pub database_url: String,
    pub supabase: Option<SupabaseConfig>,
    pub github_api_url: String,
    pub git_token: Option<String>,
    pub session_ttl: time::Duration,
    pub stickers: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            tracing::debug!("loaded .env");
        }
        Self::from_vars(|key| dotenv::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let supabase = match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => {
                let poll_ms: u64 = parse_or(&var, "SUPABASE_POLL_MS", 1000)?;
                if poll_ms == 0 {
                    return Err(ConfigError::Invalid {
                        key: "SUPABASE_POLL_MS",
                        reason: "must be above zero".to_owned(),
                    });
                }
                Some(SupabaseConfig {
                    url,
                    anon_key,
                    poll_interval: Duration::from_millis(poll_ms),
                })
            }
            (Some(_), None) => return Err(ConfigError::Incomplete("SUPABASE_URL", "SUPABASE_ANON_KEY")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("SUPABASE_ANON_KEY", "SUPABASE_URL")),
            (None, None) => None,
        };

        let stickers = var("STICKERS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_STICKERS.iter().map(|url| url.to_string()).collect());

        let session_minutes: i64 = parse_or(&var, "SESSION_MINUTES", 60)?;
        if session_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_MINUTES",
                reason: "must be above zero".to_owned(),
            });
        }

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_owned()),
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite://stickerchat.db".to_owned()),
            supabase,
            github_api_url: var("GITHUB_API_URL").unwrap_or_else(|| "https://api.github.com".to_owned()),
            git_token: var("GIT_TOKEN"),
            session_ttl: time::Duration::minutes(session_minutes),
            stickers,
        })
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            tracing::debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
