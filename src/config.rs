use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_DOWNLOAD_CONCURRENCY, DEFAULT_MEDIA_ACCOUNT_ID};
use crate::site::templates::TextEscaping;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Settings that are not positional command-line arguments.
///
/// Loaded from environment variables, optionally via a `.env` file.
#[derive(Debug, Clone)]
pub struct Config {
    // Paths
    pub output_dir: PathBuf,
    pub css_dir: PathBuf,
    pub credentials_path: PathBuf,

    // Media index
    pub media_account_id: i64,
    pub resolve_videos: bool,
    pub twitter_api_base: String,

    // Downloads
    pub download_concurrency: usize,
    pub download_timeout: Duration,

    // Pages
    pub text_escaping: TextEscaping,
    pub site_lang: String,
    pub site_name: String,
    pub site_title: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Paths
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", "output")),
            css_dir: PathBuf::from(env_or_default("CSS_DIR", "css")),
            credentials_path: PathBuf::from(env_or_default("CREDENTIALS_PATH", "credential.json")),

            // Media index
            media_account_id: parse_env_i64("MEDIA_ACCOUNT_ID", DEFAULT_MEDIA_ACCOUNT_ID)?,
            resolve_videos: parse_env_bool("VIDEO_RESOLUTION", true)?,
            twitter_api_base: env_or_default("TWITTER_API_BASE", "https://api.twitter.com"),

            // Downloads
            download_concurrency: parse_env_usize(
                "DOWNLOAD_CONCURRENCY",
                DEFAULT_DOWNLOAD_CONCURRENCY,
            )?,
            download_timeout: Duration::from_secs(parse_env_u64("DOWNLOAD_TIMEOUT_SECS", 30)?),

            // Pages
            text_escaping: parse_text_escaping(&env_or_default("TEXT_ESCAPING", "raw"))?,
            site_lang: env_or_default("SITE_LANG", "ja"),
            site_name: env_or_default("SITE_NAME", "BIRD"),
            site_title: env_or_default("SITE_TITLE", "BIRD: Information of Ruin Document"),
        })
    }

    /// Configuration with defaults, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            css_dir: PathBuf::from("css"),
            credentials_path: PathBuf::from("credential.json"),
            media_account_id: DEFAULT_MEDIA_ACCOUNT_ID,
            resolve_videos: true,
            twitter_api_base: "https://api.twitter.com".to_string(),
            download_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            download_timeout: Duration::from_secs(30),
            text_escaping: TextEscaping::Raw,
            site_lang: "ja".to_string(),
            site_name: "BIRD".to_string(),
            site_title: "BIRD: Information of Ruin Document".to_string(),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.download_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DOWNLOAD_CONCURRENCY".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.download_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "DOWNLOAD_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "OUTPUT_DIR".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Directory downloaded media is written to.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("i").join("images")
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_i64(name: &str, default: i64) -> Result<i64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_text_escaping(value: &str) -> Result<TextEscaping, ConfigError> {
    match value.to_lowercase().as_str() {
        "raw" => Ok(TextEscaping::Raw),
        "escaped" | "escape" => Ok(TextEscaping::Escaped),
        _ => Err(ConfigError::InvalidValue {
            name: "TEXT_ESCAPING".to_string(),
            message: format!("must be 'raw' or 'escaped', got '{value}'"),
        }),
    }
}
