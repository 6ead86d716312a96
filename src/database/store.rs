//! Storage capability for text rows.

use async_trait::async_trait;

use super::models::TextRow;
use crate::error::TextResult;

/// Row filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    pub locale: Option<String>,
    pub scope: Option<String>,
}

impl TextFilter {
    /// Rows of one (locale, scope) table.
    pub fn table(locale: &str, scope: &str) -> Self {
        Self {
            locale: Some(locale.to_string()),
            scope: Some(scope.to_string()),
        }
    }

    pub fn matches(&self, row: &TextRow) -> bool {
        self.locale.as_ref().is_none_or(|l| *l == row.locale)
            && self.scope.as_ref().is_none_or(|s| *s == row.scope)
    }
}

/// Persistent store consumed by the text repository.
#[async_trait]
pub trait TextStore: Send + Sync {
    /// Rows matching `filter`, ordered by key.
    async fn select(&self, filter: &TextFilter) -> TextResult<Vec<TextRow>>;

    /// Insert rows whose `(locale, scope, key)` is not stored yet.
    ///
    /// Existing rows are left untouched and never cause an error.
    /// Returns the number of rows written.
    async fn insert_missing(&self, rows: Vec<TextRow>) -> TextResult<u64>;
}
