//! Typed translation configuration built from [`Settings`].

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::Settings;
use crate::error::{TextError, TextResult};

/// Default cache lifetime in minutes (one day).
pub const DEFAULT_CACHE_LIFETIME: u64 = 1440;

/// Longest accepted cache lifetime in minutes (one year).
pub const MAX_CACHE_LIFETIME: u64 = 525_600;

/// Default scope for translation keys.
pub const DEFAULT_SCOPE: &str = "global";

/// A configured locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleDescriptor {
    /// Two-letter code used as URL prefix (e.g. `ka`).
    pub code: String,
    /// Name of the language in itself.
    pub native_name: String,
    /// Locale the code resolves to, if different from the code.
    pub canonical_locale: Option<String>,
    /// Full regional locale (e.g. `ka_GE`).
    pub full_locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocale {
    #[serde(default, alias = "native_name")]
    native: String,
    #[serde(default, alias = "canonical_locale", alias = "locale")]
    canonical: Option<String>,
    #[serde(default, alias = "full_locale")]
    full: Option<String>,
}

/// `cache` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Backend name. Only `memory` is built in.
    pub store: String,
    /// Entry lifetime in minutes.
    pub lifetime: u64,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.lifetime.saturating_mul(60))
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store: "memory".to_string(),
            lifetime: DEFAULT_CACHE_LIFETIME,
        }
    }
}

/// `db` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// Register missing keys automatically (local environment only).
    pub autosave: bool,
    /// Database name override for the text store.
    pub connection: Option<String>,
    /// Collection holding text rows.
    pub texts_table: String,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            autosave: false,
            connection: None,
            texts_table: "texts".to_string(),
        }
    }
}

/// Validated translation configuration.
#[derive(Debug, Clone)]
pub struct TextsConfig {
    /// Locales in declaration order.
    pub locales: Vec<LocaleDescriptor>,
    pub default_locale: String,
    /// Path patterns that never get a locale redirect. `*` matches anything.
    pub exclude_segments: Vec<String>,
    pub cache: CacheSettings,
    pub db: DbSettings,
}

impl TextsConfig {
    /// Build and validate from a configuration mapping.
    ///
    /// # Errors
    /// Returns `ConfigurationInvalid` if the mapping is malformed.
    pub fn from_settings(settings: &Settings) -> TextResult<Self> {
        let raw_locales: Map<String, Value> = settings
            .get_as("locales")?
            .ok_or_else(|| TextError::config("'locales' must be configured"))?;

        let mut locales = Vec::with_capacity(raw_locales.len());
        for (code, value) in raw_locales {
            if code.is_empty() {
                return Err(TextError::config("locale code must not be empty"));
            }
            let raw: RawLocale = serde_json::from_value(value)
                .map_err(|e| TextError::config(format!("locale '{}': {}", code, e)))?;
            locales.push(LocaleDescriptor {
                native_name: if raw.native.is_empty() { code.clone() } else { raw.native },
                canonical_locale: raw.canonical.filter(|c| !c.is_empty()),
                full_locale: raw.full.filter(|f| !f.is_empty()),
                code,
            });
        }

        let Some(first) = locales.first() else {
            return Err(TextError::config("at least one locale must be configured"));
        };

        let default_locale = settings
            .get_as::<String>("default_locale")?
            .unwrap_or_else(|| first.code.clone());

        let cache_defaults = CacheSettings::default();
        let cache = CacheSettings {
            enabled: settings.get_as("cache.enabled")?.unwrap_or(cache_defaults.enabled),
            store: settings.get_as("cache.store")?.unwrap_or(cache_defaults.store),
            lifetime: settings.get_as("cache.lifetime")?.unwrap_or(cache_defaults.lifetime),
        };

        let db_defaults = DbSettings::default();
        let db = DbSettings {
            autosave: settings.get_as("db.autosave")?.unwrap_or(db_defaults.autosave),
            connection: settings
                .get_as::<String>("db.connection")?
                .filter(|c| !c.is_empty()),
            texts_table: settings
                .get_as("db.texts_table")?
                .unwrap_or(db_defaults.texts_table),
        };

        let config = Self {
            locales,
            default_locale,
            exclude_segments: settings.get_as("exclude_segments")?.unwrap_or_default(),
            cache,
            db,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> TextResult<()> {
        if !self.has_locale(&self.default_locale) {
            return Err(TextError::config(format!(
                "default locale '{}' is not among configured locales",
                self.default_locale
            )));
        }
        if self.cache.lifetime == 0 {
            return Err(TextError::config("cache.lifetime must be positive"));
        }
        if self.cache.lifetime > MAX_CACHE_LIFETIME {
            return Err(TextError::config(format!(
                "cache.lifetime must not exceed {} minutes",
                MAX_CACHE_LIFETIME
            )));
        }
        if self.db.texts_table.is_empty() {
            return Err(TextError::config("db.texts_table must not be empty"));
        }
        Ok(())
    }

    /// Single-locale configuration used when no mapping is supplied.
    pub fn single(code: &str, native_name: &str) -> Self {
        Self {
            locales: vec![LocaleDescriptor {
                code: code.to_string(),
                native_name: native_name.to_string(),
                canonical_locale: None,
                full_locale: None,
            }],
            default_locale: code.to_string(),
            exclude_segments: Vec::new(),
            cache: CacheSettings::default(),
            db: DbSettings::default(),
        }
    }

    pub fn locale(&self, code: &str) -> Option<&LocaleDescriptor> {
        self.locales.iter().find(|l| l.code == code)
    }

    pub fn has_locale(&self, code: &str) -> bool {
        self.locale(code).is_some()
    }

    /// Configured locale codes in declaration order.
    pub fn locale_codes(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(|l| l.code.as_str())
    }
}
