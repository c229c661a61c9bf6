use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::digest::SubjectStyle;
use crate::infrastructure::notifier::SmtpTls;
use crate::infrastructure::repositories::KeyMode;

/// Upper bound for `RETENTION_DAYS` (about a century).
pub const MAX_RETENTION_DAYS: i64 = 36500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("could not read feeds file {path}: {message}")]
    FeedsFile { path: String, message: String },
    #[error("invalid feeds configuration: {0}")]
    Feeds(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub feeds_config_path: PathBuf,
    pub retention_days: i64,
    pub key_mode: KeyMode,
    pub subject_style: SubjectStyle,
    pub subject_prefix: Option<String>,
    pub fetch_timeout: Duration,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: SmtpTls,
    pub from: Option<String>,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// One configured source feed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct FeedsFile {
    feeds: Vec<FeedConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Config {
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 8080)?,
            environment: match get("ENVIRONMENT").as_deref() {
                Some("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match get("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            feeds_config_path: PathBuf::from(
                get("FEEDS_CONFIG_PATH").unwrap_or_else(|| "feeds.json".to_string()),
            ),
            retention_days: parse_or("RETENTION_DAYS", get("RETENTION_DAYS"), 30)?,
            key_mode: parse_or("KEY_MODE", get("KEY_MODE"), KeyMode::default())?,
            subject_style: parse_or(
                "EMAIL_SUBJECT_STYLE",
                get("EMAIL_SUBJECT_STYLE"),
                SubjectStyle::default(),
            )?,
            subject_prefix: get("EMAIL_SUBJECT_PREFIX"),
            fetch_timeout: Duration::from_secs(parse_or(
                "FETCH_TIMEOUT_SECS",
                get("FETCH_TIMEOUT_SECS"),
                30,
            )?),
            smtp: SmtpConfig {
                host: get("SMTP_HOST"),
                port: parse_or("SMTP_PORT", get("SMTP_PORT"), 587)?,
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
                tls: parse_or("SMTP_TLS", get("SMTP_TLS"), SmtpTls::default())?,
                from: get("EMAIL_FROM"),
                to: get("EMAIL_TO")
                    .map(|list| {
                        list.split(',')
                            .map(str::trim)
                            .filter(|a| !a.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        };

        if !(1..=MAX_RETENTION_DAYS).contains(&config.retention_days) {
            return Err(ConfigError::Invalid {
                key: "RETENTION_DAYS",
                message: format!("must be between 1 and {}", MAX_RETENTION_DAYS),
            });
        }

        Ok(config)
    }

    /// Read and validate the feed list this configuration points at.
    pub fn load_feeds(&self) -> Result<Vec<FeedConfig>, ConfigError> {
        load_feeds(&self.feeds_config_path, self.key_mode)
    }
}

pub fn load_feeds(path: &Path, key_mode: KeyMode) -> Result<Vec<FeedConfig>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedsFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse_feeds(&raw, key_mode)
}

/// Parse `{"feeds": [{"name", "url", "enabled"}]}` and validate it.
pub fn parse_feeds(raw: &str, key_mode: KeyMode) -> Result<Vec<FeedConfig>, ConfigError> {
    let file: FeedsFile =
        serde_json::from_str(raw).map_err(|e| ConfigError::Feeds(e.to_string()))?;

    let mut names = HashSet::new();
    for feed in &file.feeds {
        if feed.name.trim().is_empty() {
            return Err(ConfigError::Feeds("feed name must not be empty".to_string()));
        }
        if !names.insert(feed.name.as_str()) {
            return Err(ConfigError::Feeds(format!("duplicate feed name '{}'", feed.name)));
        }
        let scheme_ok = url::Url::parse(&feed.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !scheme_ok {
            return Err(ConfigError::Feeds(format!(
                "feed '{}' has invalid URL '{}'",
                feed.name, feed.url
            )));
        }
    }

    let enabled = file.feeds.iter().filter(|f| f.enabled).count();
    if enabled == 0 {
        return Err(ConfigError::Feeds("no enabled feeds".to_string()));
    }
    if key_mode == KeyMode::TitleOnly && enabled != 1 {
        return Err(ConfigError::Feeds(format!(
            "key mode title_only requires exactly one enabled feed, found {}",
            enabled
        )));
    }

    Ok(file.feeds)
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
