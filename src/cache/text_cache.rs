//! Cache capability for translation tables.

use std::time::Duration;

use async_trait::async_trait;

use super::typed::Expiring;
use super::{CacheConfig, CacheRegistry, TypedCache};
use crate::error::TextResult;

/// Key-value cache consumed by the text repository.
///
/// Values are serialized entry lists; keys are derived from
/// (locale, scope) by the repository.
#[async_trait]
pub trait TextCache: Send + Sync {
    async fn has(&self, key: &str) -> TextResult<bool>;

    async fn get(&self, key: &str) -> TextResult<Option<String>>;

    async fn put(&self, key: &str, value: String, ttl: Duration) -> TextResult<()>;

    async fn forget(&self, key: &str) -> TextResult<()>;
}

#[derive(Debug, Clone)]
struct Payload {
    body: String,
    ttl: Duration,
}

impl Expiring for Payload {
    fn ttl(&self) -> Option<Duration> {
        Some(self.ttl)
    }
}

/// In-process [`TextCache`] backed by Moka.
#[derive(Debug, Clone)]
pub struct MemoryTextCache {
    cache: TypedCache<String, Payload>,
}

impl MemoryTextCache {
    /// Registry name of the translation table cache.
    pub const NAME: &'static str = "text_tables";

    pub fn new(registry: &CacheRegistry) -> Self {
        let cache = registry.get_or_insert_with(Self::NAME, || {
            TypedCache::with_entry_ttl(Self::NAME, CacheConfig::text_tables())
        });
        Self { cache }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl TextCache for MemoryTextCache {
    async fn has(&self, key: &str) -> TextResult<bool> {
        Ok(self.cache.contains(&key.to_string()))
    }

    async fn get(&self, key: &str) -> TextResult<Option<String>> {
        Ok(self.cache.get(&key.to_string()).map(|p| p.body))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> TextResult<()> {
        self.cache.insert(key.to_string(), Payload { body: value, ttl });
        Ok(())
    }

    async fn forget(&self, key: &str) -> TextResult<()> {
        self.cache.invalidate(&key.to_string());
        Ok(())
    }
}
