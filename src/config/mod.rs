//! Configuration module.
//!
//! Process settings come from environment variables; the translation
//! mapping (locales, cache, db) is a JSON document read through
//! [`Settings`] and validated into [`TextsConfig`].

mod settings;
mod texts;

use std::env;
use std::fs;

use serde::Deserialize;

use crate::error::{TextError, TextResult};

pub use settings::Settings;
pub use texts::{
    CacheSettings, DbSettings, LocaleDescriptor, TextsConfig, DEFAULT_CACHE_LIFETIME, DEFAULT_SCOPE,
    MAX_CACHE_LIFETIME,
};

/// Application environment.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Local,
    Testing,
    Staging,
    Production,
}

impl Default for AppEnv {
    fn default() -> Self {
        Self::Production
    }
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "local" | "dev" | "development" => Self::Local,
            "test" | "testing" => Self::Testing,
            "staging" => Self::Staging,
            _ => Self::Production,
        }
    }

    /// Environments that serve texts through the cache.
    pub fn is_production_like(self) -> bool {
        matches!(self, Self::Staging | Self::Production)
    }

    /// The environment where missing keys may be registered automatically.
    pub fn is_local(self) -> bool {
        self == Self::Local
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub bind_addr: String,

    /// MongoDB connection string. Without it texts live in memory.
    pub mongodb_uri: Option<String>,
    /// Database name; `db.connection` in the texts mapping overrides it.
    pub mongodb_database: String,

    /// Path of the JSON translation mapping.
    pub texts_config_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let app_env = env::var("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or_default();

        Self {
            app_env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            mongodb_uri: env::var("MONGODB_URI").ok().filter(|s| !s.is_empty()),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "texts".to_string()),
            texts_config_path: env::var("TEXTS_CONFIG").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Read and validate the translation mapping.
    ///
    /// Falls back to a single English locale when no path is configured.
    pub fn load_texts_config(&self) -> TextResult<TextsConfig> {
        let Some(path) = &self.texts_config_path else {
            return Ok(TextsConfig::single("en", "English"));
        };

        let text = fs::read_to_string(path)
            .map_err(|e| TextError::config(format!("cannot read {}: {}", path, e)))?;
        TextsConfig::from_settings(&Settings::from_json(&text)?)
    }

    /// Database holding the text collection.
    pub fn database_name<'a>(&'a self, texts: &'a TextsConfig) -> &'a str {
        texts.db.connection.as_deref().unwrap_or(&self.mongodb_database)
    }
}
