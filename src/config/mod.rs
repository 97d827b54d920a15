// src/config/mod.rs
//! Process configuration, read once from the environment at startup.

pub mod keywords;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use keywords::KeywordConfig;

pub const ENV_KEYWORDS_PATH: &str = "SENTINEL_KEYWORDS_PATH";

const DEFAULT_WATCH_LIST: &[&str] = &["삼성전자"];
const DEFAULT_POLL_INTERVAL_SECS: u64 = 120;
const DEFAULT_DIGEST_INTERVAL_MIN: u64 = 60;
const DEFAULT_MAX_ARTICLE_AGE_MIN: u64 = 90;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Credentials for the external collaborators. Not `Debug` on purpose.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub telegram_token: String,
    pub chat_id: String,
    pub dart_api_key: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub watch_list: Vec<String>,
    pub poll_interval: Duration,
    pub digest_interval: Duration,
    pub max_article_age: Duration,
    pub http_timeout: Duration,
    pub state_path: PathBuf,
    pub corp_map_path: PathBuf,
    pub openai_model: String,
    pub keywords: KeywordConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("watch_list", &self.watch_list)
            .field("poll_interval", &self.poll_interval)
            .field("digest_interval", &self.digest_interval)
            .field("max_article_age", &self.max_article_age)
            .field("http_timeout", &self.http_timeout)
            .field("state_path", &self.state_path)
            .field("corp_map_path", &self.corp_map_path)
            .field("openai_model", &self.openai_model)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let credentials = Credentials {
            openai_api_key: required("OPENAI_API_KEY")?,
            telegram_token: required("TELEGRAM_TOKEN")?,
            chat_id: required("CHAT_ID")?,
            dart_api_key: required("DART_API_KEY")?,
        };

        let watch_list = match get("WATCH_LIST") {
            Some(raw) => parse_watch_list(&raw),
            None => DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect(),
        };
        if watch_list.is_empty() {
            return Err(ConfigError::Invalid {
                name: "WATCH_LIST",
                value: get("WATCH_LIST").unwrap_or_default(),
            });
        }

        let secs = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(name) {
                None => Ok(default),
                Some(v) => match v.trim().parse::<u64>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(ConfigError::Invalid { name, value: v }),
                },
            }
        };

        let keywords = match get(ENV_KEYWORDS_PATH) {
            Some(p) if !p.trim().is_empty() => KeywordConfig::load_from(&PathBuf::from(p.trim()))?,
            _ => KeywordConfig::default(),
        };

        Ok(Self {
            credentials,
            watch_list,
            poll_interval: Duration::from_secs(secs(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            digest_interval: Duration::from_secs(
                60 * secs("DIGEST_INTERVAL_MIN", DEFAULT_DIGEST_INTERVAL_MIN)?,
            ),
            max_article_age: Duration::from_secs(
                60 * secs("MAX_ARTICLE_AGE_MIN", DEFAULT_MAX_ARTICLE_AGE_MIN)?,
            ),
            http_timeout: Duration::from_secs(secs(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            state_path: get("STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("state.json")),
            corp_map_path: get("DART_CORP_MAP_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dart_corp_codes.json")),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            keywords,
        })
    }
}

/// Comma separated, trimmed, empties and repeats dropped, order kept.
pub fn parse_watch_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}
