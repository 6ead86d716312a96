//! Text repository.
//!
//! Loads translation tables per (locale, scope) from the text store and the
//! table cache, and registers untranslated keys.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::TextCache;
use crate::config::TextsConfig;
use crate::database::models::{TextEntry, TextRow};
use crate::database::store::{TextFilter, TextStore};
use crate::error::{TextError, TextResult};

/// Repository for translation texts.
///
/// Backend failures are returned as `StorageUnavailable`; deciding whether
/// to degrade is left to the caller.
pub struct TextRepository {
    store: Arc<dyn TextStore>,
    cache: Option<Arc<dyn TextCache>>,
    ttl: Duration,
    locales: Vec<String>,
}

/// Cache key of one (locale, scope) table.
///
/// NUL separators keep `("en", "a\0b")` and `("en\0a", "b")` apart.
pub fn cache_key(locale: &str, scope: &str) -> String {
    format!("texts\0{}\0{}", locale, scope)
}

impl TextRepository {
    pub fn new(
        store: Arc<dyn TextStore>,
        cache: Option<Arc<dyn TextCache>>,
        config: &TextsConfig,
    ) -> Self {
        Self {
            store,
            cache,
            ttl: config.cache.ttl(),
            locales: config.locale_codes().map(str::to_string).collect(),
        }
    }

    /// Cache entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub async fn exists_in_cache(&self, locale: &str, scope: &str) -> TextResult<bool> {
        match &self.cache {
            Some(cache) => cache.has(&cache_key(locale, scope)).await,
            None => Ok(false),
        }
    }

    /// Cached entries of a table; empty when nothing is cached.
    pub async fn load_from_cache(&self, locale: &str, scope: &str) -> TextResult<Vec<TextEntry>> {
        Ok(self.cached(locale, scope).await?.unwrap_or_default())
    }

    /// Cached entries of a table, telling an absent entry apart from an
    /// empty table.
    pub async fn cached(&self, locale: &str, scope: &str) -> TextResult<Option<Vec<TextEntry>>> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };

        let Some(body) = cache.get(&cache_key(locale, scope)).await? else {
            return Ok(None);
        };

        let entries: Vec<TextEntry> = serde_json::from_str(&body).map_err(|e| {
            TextError::storage(format!("corrupt cache entry for {}/{}: {}", locale, scope, e))
        })?;
        debug!("Loaded {} texts for {}/{} from cache", entries.len(), locale, scope);
        Ok(Some(entries))
    }

    pub async fn store_in_cache(
        &self,
        locale: &str,
        entries: &[TextEntry],
        scope: &str,
    ) -> TextResult<()> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };

        let body = serde_json::to_string(entries)
            .map_err(|e| TextError::storage(format!("cannot serialize texts: {}", e)))?;
        cache.put(&cache_key(locale, scope), body, self.ttl).await?;
        debug!("Cached {} texts for {}/{}", entries.len(), locale, scope);
        Ok(())
    }

    /// Drop the cached table of one (locale, scope).
    pub async fn forget_cache(&self, locale: &str, scope: &str) -> TextResult<()> {
        match &self.cache {
            Some(cache) => cache.forget(&cache_key(locale, scope)).await,
            None => Ok(()),
        }
    }

    pub async fn load_from_database(
        &self,
        locale: &str,
        scope: &str,
    ) -> TextResult<Vec<TextEntry>> {
        let rows = self.store.select(&TextFilter::table(locale, scope)).await?;
        debug!("Loaded {} texts for {}/{} from database", rows.len(), locale, scope);
        Ok(rows.into_iter().map(TextEntry::from).collect())
    }

    /// Rows across tables, optionally narrowed by locale and/or scope.
    pub async fn load_all_from_database(
        &self,
        locale: Option<&str>,
        scope: Option<&str>,
    ) -> TextResult<Vec<TextRow>> {
        let filter = TextFilter {
            locale: locale.map(str::to_string),
            scope: scope.map(str::to_string),
        };
        self.store.select(&filter).await
    }

    /// Register untranslated keys under `scope` for every configured locale.
    ///
    /// Keys already stored are skipped. Returns whether any row was written.
    pub async fn save(&self, new_keys: &BTreeSet<String>, scope: &str) -> TextResult<bool> {
        if new_keys.is_empty() {
            return Ok(false);
        }

        let rows: Vec<TextRow> = self
            .locales
            .iter()
            .flat_map(|locale| {
                new_keys
                    .iter()
                    .map(move |key| TextRow::placeholder(locale, scope, key))
            })
            .collect();

        let inserted = self.store.insert_missing(rows).await?;
        if inserted > 0 {
            info!("Registered {} new text rows in scope '{}'", inserted, scope);
        }
        Ok(inserted > 0)
    }
}

impl std::fmt::Debug for TextRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRepository")
            .field("cached", &self.cache.is_some())
            .field("ttl", &self.ttl)
            .field("locales", &self.locales)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheRegistry, MemoryTextCache};
    use crate::config::{Settings, TextsConfig};
    use crate::database::MemoryTextStore;
    use serde_json::json;

    fn config() -> TextsConfig {
        let settings = Settings::new(json!({
            "locales": { "en": { "native": "English" }, "ka": { "native": "ქართული" } },
            "default_locale": "en",
            "cache": { "lifetime": 5 }
        }))
        .unwrap();
        TextsConfig::from_settings(&settings).unwrap()
    }

    fn repository(store: Arc<MemoryTextStore>) -> TextRepository {
        let cache = MemoryTextCache::new(&CacheRegistry::new());
        TextRepository::new(store, Some(Arc::new(cache)), &config())
    }

    #[test]
    fn test_cache_key_separates_scopes() {
        assert_ne!(cache_key("en", "a\0b"), cache_key("en\0a", "b"));
        assert_ne!(cache_key("en", "global"), cache_key("ka", "global"));
        assert_eq!(cache_key("en", "global"), cache_key("en", "global"));
    }

    #[tokio::test]
    async fn test_cache_round_trip_is_scoped() {
        let repo = repository(Arc::new(MemoryTextStore::new()));
        let entries = vec![TextEntry::new("hello", "Hello")];

        assert!(!repo.exists_in_cache("en", "global").await.unwrap());
        repo.store_in_cache("en", &entries, "global").await.unwrap();

        assert!(repo.exists_in_cache("en", "global").await.unwrap());
        assert!(!repo.exists_in_cache("en", "admin").await.unwrap());
        assert_eq!(repo.load_from_cache("en", "global").await.unwrap(), entries);
        assert!(repo.load_from_cache("en", "admin").await.unwrap().is_empty());

        repo.store_in_cache("en", &[], "empty").await.unwrap();
        assert_eq!(repo.cached("en", "empty").await.unwrap(), Some(Vec::new()));
        assert_eq!(repo.cached("en", "admin").await.unwrap(), None);

        repo.forget_cache("en", "global").await.unwrap();
        assert!(!repo.exists_in_cache("en", "global").await.unwrap());
        assert_eq!(repo.ttl(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_load_from_database() {
        let store = Arc::new(MemoryTextStore::with_rows([
            TextRow::new("en", "global", "hello", "Hello"),
            TextRow::new("en", "admin", "hello", "Hello admin"),
            TextRow::new("ka", "global", "hello", "გამარჯობა"),
        ]));
        let repo = repository(store);

        let entries = repo.load_from_database("en", "global").await.unwrap();
        assert_eq!(entries, vec![TextEntry::new("hello", "Hello")]);

        assert_eq!(repo.load_all_from_database(None, None).await.unwrap().len(), 3);
        assert_eq!(repo.load_all_from_database(Some("en"), None).await.unwrap().len(), 2);
        assert_eq!(repo.load_all_from_database(None, Some("global")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_registers_for_every_locale() {
        let store = Arc::new(MemoryTextStore::with_rows([TextRow::new(
            "en", "global", "known", "Known",
        )]));
        let repo = repository(store.clone());

        let keys: BTreeSet<String> = ["known", "fresh"].iter().map(|k| k.to_string()).collect();
        assert!(repo.save(&keys, "global").await.unwrap());

        // en/known existed; en/fresh, ka/known, ka/fresh are new
        assert_eq!(store.len(), 4);
        let ka = repo.load_from_database("ka", "global").await.unwrap();
        assert_eq!(ka, vec![TextEntry::new("fresh", "fresh"), TextEntry::new("known", "known")]);

        // Second save is a no-op rather than a duplicate-key failure
        assert!(!repo.save(&keys, "global").await.unwrap());
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_save_empty_set_skips_store() {
        let store = Arc::new(MemoryTextStore::new());
        let repo = repository(store.clone());

        assert!(!repo.save(&BTreeSet::new(), "global").await.unwrap());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_without_cache() {
        let repo = TextRepository::new(Arc::new(MemoryTextStore::new()), None, &config());
        repo.store_in_cache("en", &[TextEntry::new("a", "b")], "global").await.unwrap();
        assert!(!repo.exists_in_cache("en", "global").await.unwrap());
        assert!(repo.load_from_cache("en", "global").await.unwrap().is_empty());
        assert!(!repo.has_cache());
    }

    #[tokio::test]
    async fn test_backend_failures_are_storage_errors() {
        use crate::testing::{FailingCache, FailingStore};

        let repo = TextRepository::new(
            Arc::new(FailingStore::offline()),
            Some(Arc::new(FailingCache)),
            &config(),
        );

        let err = repo.load_from_database("en", "global").await.unwrap_err();
        assert!(matches!(err, TextError::StorageUnavailable(_)));
        assert!(matches!(
            repo.load_all_from_database(None, None).await,
            Err(TextError::StorageUnavailable(_))
        ));

        // the repository reports cache failures instead of hiding them
        assert!(matches!(
            repo.cached("en", "global").await,
            Err(TextError::StorageUnavailable(_))
        ));
        assert!(repo.exists_in_cache("en", "global").await.is_err());
        assert!(repo.store_in_cache("en", &[], "global").await.is_err());
    }

    #[tokio::test]
    async fn test_save_failure_is_storage_error() {
        use crate::testing::FailingStore;

        let repo = TextRepository::new(
            Arc::new(FailingStore::rejecting_writes_in("global", [])),
            None,
            &config(),
        );
        let keys: BTreeSet<String> = ["fresh".to_string()].into();
        assert!(matches!(
            repo.save(&keys, "global").await,
            Err(TextError::StorageUnavailable(_))
        ));
        assert!(repo.save(&keys, "admin").await.unwrap());
    }
}
