//! In-memory text store.
//!
//! Used when no MongoDB URI is configured, and by tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::models::TextRow;
use super::store::{TextFilter, TextStore};
use crate::error::TextResult;

type RowKey = (String, String, String);

/// [`TextStore`] keeping rows in a concurrent map keyed by
/// `(locale, scope, key)`.
#[derive(Debug, Default)]
pub struct MemoryTextStore {
    rows: DashMap<RowKey, TextRow>,
    selects: AtomicU64,
    writes: AtomicU64,
}

impl MemoryTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `rows`; later duplicates are ignored.
    pub fn with_rows(rows: impl IntoIterator<Item = TextRow>) -> Self {
        let store = Self::new();
        for row in rows {
            store.put_if_absent(row);
        }
        store
    }

    fn put_if_absent(&self, row: TextRow) -> bool {
        let key = (row.locale.clone(), row.scope.clone(), row.key.clone());
        match self.rows.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(row);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of `select` calls served.
    pub fn select_count(&self) -> u64 {
        self.selects.load(Ordering::Relaxed)
    }

    /// Number of `insert_missing` calls served.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextStore for MemoryTextStore {
    async fn select(&self, filter: &TextFilter) -> TextResult<Vec<TextRow>> {
        self.selects.fetch_add(1, Ordering::Relaxed);

        let mut rows: Vec<TextRow> = self
            .rows
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    async fn insert_missing(&self, rows: Vec<TextRow>) -> TextResult<u64> {
        self.writes.fetch_add(1, Ordering::Relaxed);

        let mut inserted = 0;
        for row in rows {
            if self.put_if_absent(row) {
                inserted += 1;
            }
        }
        debug!("Memory store inserted {} rows", inserted);
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let store = MemoryTextStore::with_rows([
            TextRow::new("en", "global", "b", "B"),
            TextRow::new("en", "global", "a", "A"),
            TextRow::new("en", "admin", "a", "Admin A"),
            TextRow::new("ka", "global", "a", "ა"),
        ]);

        let rows = store.select(&TextFilter::table("en", "global")).await.unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);

        let all = store.select(&TextFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(store.select_count(), 2);
    }

    #[tokio::test]
    async fn test_insert_missing_skips_existing() {
        let store = MemoryTextStore::with_rows([TextRow::new("en", "global", "a", "A")]);

        let inserted = store
            .insert_missing(vec![
                TextRow::placeholder("en", "global", "a"),
                TextRow::placeholder("en", "global", "b"),
            ])
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.len(), 2);
        let rows = store.select(&TextFilter::table("en", "global")).await.unwrap();
        assert_eq!(rows[0].value, "A");
    }
}
