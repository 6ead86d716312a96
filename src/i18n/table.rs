//! Translation table and placeholder formatting.

use std::collections::HashMap;

use crate::database::TextEntry;

/// Key to value lookup for one (locale, scope).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    locale: String,
    scope: String,
    texts: HashMap<String, String>,
}

impl TranslationTable {
    /// Build a table. A later entry with the same key wins.
    pub fn new(
        locale: impl Into<String>,
        scope: impl Into<String>,
        entries: impl IntoIterator<Item = TextEntry>,
    ) -> Self {
        Self {
            locale: locale.into(),
            scope: scope.into(),
            texts: entries.into_iter().map(|e| (e.key, e.value)).collect(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn belongs_to(&self, locale: &str, scope: &str) -> bool {
        self.locale == locale && self.scope == scope
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.texts.contains_key(key)
    }

    /// Raw value without substitution.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Value with `:name` placeholders substituted.
    pub fn translate(&self, key: &str, replacements: &[(&str, &str)]) -> Option<String> {
        self.get(key).map(|value| replace_placeholders(value, replacements))
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<TextEntry> {
        let mut entries: Vec<TextEntry> = self
            .texts
            .iter()
            .map(|(k, v)| TextEntry::new(k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Substitute `:name` tokens in `text`.
///
/// For a replacement `name -> bob`, `:name` becomes `bob`, `:Name` becomes
/// `Bob` and `:NAME` becomes `BOB`. Longer tokens are tried first and
/// substituted values are never rescanned.
pub fn replace_placeholders(text: &str, replacements: &[(&str, &str)]) -> String {
    if replacements.is_empty() || !text.contains(':') {
        return text.to_string();
    }

    let mut tokens: Vec<(String, String)> = Vec::with_capacity(replacements.len() * 3);
    for (name, value) in replacements {
        if name.is_empty() {
            continue;
        }
        let exact = format!(":{}", name);
        let upper = format!(":{}", name.to_uppercase());
        let capital = format!(":{}", capitalize(name));

        if capital != exact && capital != upper {
            tokens.push((capital, capitalize(value)));
        }
        if upper != exact {
            tokens.push((upper, value.to_uppercase()));
        }
        tokens.push((exact, value.to_string()));
    }
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match tokens.iter().find(|(token, _)| tail.starts_with(token.as_str())) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push(':');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Pick the singular or plural form of a `singular|plural` message.
///
/// Messages without a `|` are returned as-is.
pub fn select_plural(text: &str, count: i64) -> &str {
    match text.split_once('|') {
        Some((one, _)) if count == 1 => one.trim(),
        Some((_, many)) => many.split('|').next().unwrap_or(many).trim(),
        None => text,
    }
}
