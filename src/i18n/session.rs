//! Per-request translation session.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::router::LocaleRouter;
use super::table::{replace_placeholders, select_plural, TranslationTable};
use crate::config::{AppEnv, LocaleDescriptor, TextsConfig, DEFAULT_SCOPE};
use crate::database::{TextEntry, TextRepository};
use crate::error::{TextError, TextResult};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    LocaleSet,
    TextsLoaded,
    Flushed,
}

/// Where `load_texts` reads a table from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Always query the store, so edits show up immediately.
    Database,
    /// Serve from cache; on a miss query the store and populate the cache.
    CacheFirst,
}

impl LoadStrategy {
    pub fn resolve(env: AppEnv, config: &TextsConfig) -> Self {
        if env.is_production_like() && config.cache.enabled {
            Self::CacheFirst
        } else {
            Self::Database
        }
    }
}

enum Lookup {
    /// No locale yet; the key is echoed back untouched.
    Passthrough,
    Found(String),
    Missing,
}

fn require(value: &str, what: &str) -> TextResult<()> {
    if value.is_empty() {
        return Err(TextError::invalid_argument(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Translation state of one request.
///
/// Holds the current locale and scope, the loaded table, and keys that
/// were asked for but not found. Not shared between requests.
#[derive(Debug)]
pub struct Translator {
    repository: Arc<TextRepository>,
    config: Arc<TextsConfig>,
    router: LocaleRouter,
    env: AppEnv,

    locale: Option<String>,
    scope: String,
    table: Option<TranslationTable>,
    /// Missing keys grouped by the scope they were asked in.
    pending: BTreeMap<String, BTreeSet<String>>,
    phase: SessionPhase,
}

impl Translator {
    pub fn new(repository: Arc<TextRepository>, config: Arc<TextsConfig>, env: AppEnv) -> Self {
        Self {
            router: LocaleRouter::new(Arc::clone(&config)),
            repository,
            config,
            env,
            locale: None,
            scope: DEFAULT_SCOPE.to_string(),
            table: None,
            pending: BTreeMap::new(),
            phase: SessionPhase::Uninitialized,
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn router(&self) -> &LocaleRouter {
        &self.router
    }

    pub fn locales(&self) -> &[LocaleDescriptor] {
        &self.config.locales
    }

    /// Currently loaded table, if any.
    pub fn texts(&self) -> Option<&TranslationTable> {
        self.table.as_ref()
    }

    /// Missing keys queued in the current scope.
    pub fn pending_keys(&self) -> Option<&BTreeSet<String>> {
        self.pending.get(&self.scope)
    }

    /// Missing keys of every scope.
    pub fn pending(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.pending
    }

    /// Switch locale. A table of another locale is dropped; setting the
    /// current locale again keeps the table and phase.
    ///
    /// # Errors
    /// `InvalidArgument` if `lang` is empty.
    pub fn set_locale(&mut self, lang: &str) -> TextResult<()> {
        require(lang, "locale")?;

        if self.locale.as_deref() == Some(lang) {
            return Ok(());
        }

        self.table = None;
        self.locale = Some(lang.to_string());
        self.phase = SessionPhase::LocaleSet;
        debug!("Locale set to {}", lang);
        Ok(())
    }

    /// Switch scope. A table of another scope is dropped.
    pub fn set_scope(&mut self, scope: &str) -> TextResult<()> {
        require(scope, "scope")?;

        if self.scope != scope {
            self.table = None;
            self.scope = scope.to_string();
            if self.locale.is_some() {
                self.phase = SessionPhase::LocaleSet;
            }
        }
        Ok(())
    }

    /// Load the table of `locale`/`scope` (defaulting to the current ones)
    /// and make it current.
    ///
    /// # Errors
    /// `InvalidArgument` without any locale; `StorageUnavailable` if the
    /// store fails. Cache failures fall back to the store.
    pub async fn load_texts(
        &mut self,
        locale: Option<&str>,
        scope: Option<&str>,
    ) -> TextResult<&TranslationTable> {
        let locale = match locale {
            Some(l) => {
                require(l, "locale")?;
                l.to_string()
            }
            None => self
                .locale
                .clone()
                .ok_or_else(|| TextError::invalid_argument("no locale set"))?,
        };
        let scope = match scope {
            Some(s) => {
                require(s, "scope")?;
                s.to_string()
            }
            None => self.scope.clone(),
        };

        let strategy = LoadStrategy::resolve(self.env, &self.config);
        let entries = match strategy {
            LoadStrategy::Database => self.repository.load_from_database(&locale, &scope).await?,
            LoadStrategy::CacheFirst => self.load_cache_first(&locale, &scope).await?,
        };
        debug!(
            "Loaded {} texts for {}/{} ({:?})",
            entries.len(),
            locale,
            scope,
            strategy
        );

        let table = TranslationTable::new(&locale, &scope, entries);
        self.locale = Some(locale);
        self.scope = scope;
        self.phase = SessionPhase::TextsLoaded;
        Ok(self.table.insert(table))
    }

    async fn load_cache_first(&self, locale: &str, scope: &str) -> TextResult<Vec<TextEntry>> {
        match self.repository.cached(locale, scope).await {
            Ok(Some(entries)) => {
                debug!("Cache hit for {}/{}", locale, scope);
                return Ok(entries);
            }
            Ok(None) => debug!("Cache miss for {}/{}", locale, scope),
            Err(e) => warn!("Text cache unavailable, reading from database: {}", e),
        }

        let entries = self.repository.load_from_database(locale, scope).await?;
        if let Err(e) = self.repository.store_in_cache(locale, &entries, scope).await {
            warn!("Failed to cache texts for {}/{}: {}", locale, scope, e);
        }
        Ok(entries)
    }

    async fn lookup(&mut self, key: &str) -> TextResult<Lookup> {
        require(key, "key")?;

        if self.locale.is_none() {
            return Ok(Lookup::Passthrough);
        }
        if self.table.is_none() {
            self.load_texts(None, None).await?;
        }

        match self.table.as_ref().and_then(|t| t.get(key)) {
            Some(value) => Ok(Lookup::Found(value.to_string())),
            None => {
                let queued = self
                    .pending
                    .entry(self.scope.clone())
                    .or_default()
                    .insert(key.to_string());
                if queued {
                    debug!("Queued missing key '{}' in scope '{}'", key, self.scope);
                }
                Ok(Lookup::Missing)
            }
        }
    }

    /// Translate `key`, substituting `:name` placeholders.
    ///
    /// Without a locale the key is returned unchanged. A key missing from
    /// the table is queued for registration and rendered as itself.
    ///
    /// # Errors
    /// `InvalidArgument` if `key` is empty; load errors otherwise.
    pub async fn get(&mut self, key: &str, replacements: &[(&str, &str)]) -> TextResult<String> {
        Ok(match self.lookup(key).await? {
            Lookup::Passthrough => key.to_string(),
            Lookup::Found(value) => replace_placeholders(&value, replacements),
            Lookup::Missing => replace_placeholders(key, replacements),
        })
    }

    /// Translate a `singular|plural` message for `count`.
    ///
    /// `:count` is substituted alongside `replacements`.
    pub async fn choice(
        &mut self,
        key: &str,
        count: i64,
        replacements: &[(&str, &str)],
    ) -> TextResult<String> {
        let count_text = count.to_string();
        let mut all: Vec<(&str, &str)> = Vec::with_capacity(replacements.len() + 1);
        all.push(("count", count_text.as_str()));
        all.extend_from_slice(replacements);

        Ok(match self.lookup(key).await? {
            Lookup::Passthrough => key.to_string(),
            Lookup::Found(value) => replace_placeholders(select_plural(&value, count), &all),
            Lookup::Missing => replace_placeholders(select_plural(key, count), &all),
        })
    }

    /// Replace the current table with `entries`.
    ///
    /// # Errors
    /// `InvalidArgument` if no locale is set.
    pub fn set_texts<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> TextResult<()>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let locale = self
            .locale
            .clone()
            .ok_or_else(|| TextError::invalid_argument("no locale set"))?;

        let entries = entries.into_iter().map(|(k, v)| TextEntry::new(k, v));
        self.table = Some(TranslationTable::new(locale, self.scope.clone(), entries));
        self.phase = SessionPhase::TextsLoaded;
        Ok(())
    }

    /// Register queued missing keys with the repository.
    ///
    /// Returns `false` without touching storage when nothing is queued.
    /// Scopes saved before a failure are not retried.
    pub async fn save_texts(&mut self) -> TextResult<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }

        let mut written = false;
        while let Some((scope, keys)) = self.pending.pop_first() {
            match self.repository.save(&keys, &scope).await {
                Ok(saved) => {
                    info!("Flushed {} missing keys in scope '{}'", keys.len(), scope);
                    written |= saved;
                }
                Err(e) => {
                    self.pending.insert(scope, keys);
                    return Err(e);
                }
            }
        }

        self.phase = SessionPhase::Flushed;
        Ok(written)
    }

    /// Whether missing keys should be registered at the end of a request.
    pub fn autosave_allowed(&self) -> bool {
        self.env.is_local() && self.config.db.autosave
    }

    /// `path` prefixed with `lang`, the current locale, or the default.
    pub fn get_url(&self, path: &str, lang: Option<&str>) -> String {
        let locale = lang
            .filter(|l| !l.is_empty())
            .or(self.locale.as_deref())
            .unwrap_or(self.config.default_locale.as_str());
        self.router.url(path, locale)
    }

    /// Route name qualified by the current locale.
    pub fn get_route(&self, name: &str) -> String {
        self.router.route(name, self.locale.as_deref())
    }
}
