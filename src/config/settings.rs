//! Dotted-path accessor over a nested configuration mapping.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{TextError, TextResult};

/// Read-only view over a JSON configuration mapping.
///
/// Paths such as `"cache.lifetime"` walk nested objects. A top-level key
/// that literally contains dots wins over the nested walk.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    root: Value,
}

impl Settings {
    /// Wrap a configuration mapping.
    ///
    /// # Errors
    /// Returns `ConfigurationInvalid` if the root is not an object.
    pub fn new(root: Value) -> TextResult<Self> {
        if !root.is_object() {
            return Err(TextError::config("configuration root must be a mapping"));
        }
        Ok(Self { root })
    }

    /// Parse a configuration mapping from JSON text.
    pub fn from_json(text: &str) -> TextResult<Self> {
        let root = serde_json::from_str(text)
            .map_err(|e| TextError::config(format!("malformed configuration: {}", e)))?;
        Self::new(root)
    }

    /// The entire configuration mapping.
    pub fn all(&self) -> &Value {
        &self.root
    }

    /// Look up a value by path. `None` or an empty path returns the root.
    pub fn get(&self, path: Option<&str>) -> Option<&Value> {
        let path = match path {
            None | Some("") => return Some(&self.root),
            Some(p) => p,
        };

        if let Some(direct) = self.root.get(path) {
            return Some(direct);
        }

        let mut current = &self.root;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a value by path, returning `default` when it is missing.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(Some(path)).cloned().unwrap_or(default)
    }

    /// Look up and deserialize a value.
    ///
    /// Missing paths yield `Ok(None)`; a present value of the wrong shape
    /// is a configuration error.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> TextResult<Option<T>> {
        match self.get(Some(path)) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| TextError::config(format!("'{}': {}", path, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> Settings {
        Settings::new(json!({
            "default_locale": "en",
            "cache": { "enabled": true, "lifetime": 60 },
            "db.autosave": false,
            "db": { "autosave": true }
        }))
        .unwrap()
    }

    #[test]
    fn test_nested_path() {
        let s = settings();
        assert_eq!(s.get(Some("cache.lifetime")), Some(&json!(60)));
        assert_eq!(s.get(Some("default_locale")), Some(&json!("en")));
    }

    #[test]
    fn test_direct_key_wins() {
        let s = settings();
        assert_eq!(s.get(Some("db.autosave")), Some(&json!(false)));
    }

    #[test]
    fn test_missing_path_returns_default() {
        let s = settings();
        assert_eq!(s.get(Some("cache.store")), None);
        assert_eq!(s.get(Some("default_locale.code")), None);
        assert_eq!(s.get_or("nope.deeper", json!("fallback")), json!("fallback"));
    }

    #[test]
    fn test_no_path_returns_root() {
        let s = settings();
        assert_eq!(s.get(None), Some(s.all()));
        assert_eq!(s.get(Some("")), Some(s.all()));
    }

    #[test]
    fn test_get_as() {
        let s = settings();
        assert_eq!(s.get_as::<u64>("cache.lifetime").unwrap(), Some(60));
        assert_eq!(s.get_as::<u64>("cache.missing").unwrap(), None);
        assert!(matches!(
            s.get_as::<u64>("default_locale"),
            Err(TextError::ConfigurationInvalid(_))
        ));
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(Settings::new(json!([1, 2])).is_err());
        assert!(Settings::from_json("{not json").is_err());
    }
}
