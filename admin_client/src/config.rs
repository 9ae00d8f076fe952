use std::env;
use std::time::Duration;

use url::Url;

use crate::retry::DEFAULT_MAX_RETRIES;

pub const DEFAULT_API_URL: &str = "http://localhost:3002";
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Build mode. Development turns on error logging in the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub timeout: Duration,
    pub max_retries: u32,
    pub env: AppEnv,
}

impl Config {
    /// Reads `ADMIN_API_URL` and `APP_ENV`. Call `dotenvy::dotenv()` first
    /// if a `.env` file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var("ADMIN_API_URL").ok(), env::var("APP_ENV").ok())
    }

    pub fn from_vars(api_url: Option<String>, app_env: Option<String>) -> Result<Self, ConfigError> {
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_url(&api_url)?,
            timeout: REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            env: app_env.as_deref().map(AppEnv::parse).unwrap_or(AppEnv::Production),
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_url(url)?;
        Ok(self)
    }

    pub fn is_development(&self) -> bool {
        self.env == AppEnv::Development
    }
}

fn parse_url(url: &str) -> Result<Url, ConfigError> {
    Url::parse(url.trim()).map_err(|source| ConfigError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}
