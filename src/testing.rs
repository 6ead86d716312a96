//! Backends that fail on demand, for exercising error paths in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::TextCache;
use crate::database::{MemoryTextStore, TextFilter, TextRow, TextStore};
use crate::error::{TextError, TextResult};

/// Cache whose every call fails.
#[derive(Debug, Default)]
pub(crate) struct FailingCache;

#[async_trait]
impl TextCache for FailingCache {
    async fn has(&self, _key: &str) -> TextResult<bool> {
        Err(TextError::storage("cache offline"))
    }

    async fn get(&self, _key: &str) -> TextResult<Option<String>> {
        Err(TextError::storage("cache offline"))
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> TextResult<()> {
        Err(TextError::storage("cache offline"))
    }

    async fn forget(&self, _key: &str) -> TextResult<()> {
        Err(TextError::storage("cache offline"))
    }
}

/// Memory store that can refuse reads, or writes into one scope.
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub inner: MemoryTextStore,
    fail_reads: bool,
    fail_writes_in: Option<String>,
}

impl FailingStore {
    /// Every `select` fails.
    pub fn offline() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Reads from `rows`; inserts touching `scope` fail.
    pub fn rejecting_writes_in(scope: &str, rows: impl IntoIterator<Item = TextRow>) -> Self {
        Self {
            inner: MemoryTextStore::with_rows(rows),
            fail_reads: false,
            fail_writes_in: Some(scope.to_string()),
        }
    }
}

#[async_trait]
impl TextStore for FailingStore {
    async fn select(&self, filter: &TextFilter) -> TextResult<Vec<TextRow>> {
        if self.fail_reads {
            return Err(TextError::storage("database offline"));
        }
        self.inner.select(filter).await
    }

    async fn insert_missing(&self, rows: Vec<TextRow>) -> TextResult<u64> {
        if let Some(scope) = &self.fail_writes_in
            && rows.iter().any(|r| &r.scope == scope)
        {
            return Err(TextError::storage("database offline"));
        }
        self.inner.insert_missing(rows).await
    }
}
