//! Cache configuration.

/// Configuration for a cache instance.
///
/// Lifetimes are carried by the entries themselves (see [`super::Expiring`]).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Config for translation tables.
    /// One entry per (locale, scope), so capacity stays small.
    pub fn text_tables() -> Self {
        Self { max_capacity: 1_000 }
    }
}
