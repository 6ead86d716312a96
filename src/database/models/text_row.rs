//! Translation text models.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A key/value pair inside one (locale, scope) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub key: String,
    pub value: String,
}

impl TextEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single text document (stored in the configured texts collection).
///
/// Unique on `(locale, scope, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRow {
    /// MongoDB document ID
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub locale: String,
    pub scope: String,
    pub key: String,
    pub value: String,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created_at: i64,

    /// Unix timestamp of last update.
    #[serde(default)]
    pub updated_at: i64,
}

impl TextRow {
    /// Create a new row stamped with the current time.
    pub fn new(
        locale: impl Into<String>,
        scope: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            locale: locale.into(),
            scope: scope.into(),
            key: key.into(),
            value: value.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Row registering an untranslated key; the key doubles as its value.
    pub fn placeholder(locale: &str, scope: &str, key: &str) -> Self {
        Self::new(locale, scope, key, key)
    }
}

impl From<TextRow> for TextEntry {
    fn from(row: TextRow) -> Self {
        Self {
            key: row.key,
            value: row.value,
        }
    }
}
