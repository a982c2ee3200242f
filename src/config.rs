//! Runtime configuration, read from the environment at startup.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub vision_model: String,
    pub chat_model: String,
    pub notify_webhook_url: Option<String>,
    pub sheets_webhook_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            vision_model: DEFAULT_MODEL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            notify_webhook_url: None,
            sheets_webhook_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|err| ConfigError::InvalidValue("PORT".to_string(), err.to_string()))?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            data_path: var("APP_DATA_PATH").map(PathBuf::from).unwrap_or(defaults.data_path),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            vision_model: var("VISION_MODEL").unwrap_or(defaults.vision_model),
            chat_model: var("CHAT_MODEL").unwrap_or(defaults.chat_model),
            notify_webhook_url: var("NOTIFY_WEBHOOK_URL"),
            sheets_webhook_url: var("SHEETS_WEBHOOK_URL"),
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Purchase summaries go to the notification hook, or the sheets hook
    /// when only that one is configured.
    pub fn purchase_webhook_url(&self) -> Option<&str> {
        self.notify_webhook_url
            .as_deref()
            .or(self.sheets_webhook_url.as_deref())
    }
}
