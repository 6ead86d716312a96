//! Locale resolution from request paths.
//!
//! Paths are plain strings (`"ka/page"`, `"/en/"`); leading and trailing
//! slashes are ignored. Results carry no leading slash.

use std::sync::Arc;

use crate::config::TextsConfig;

/// Locale-prefix policy over the configured locales.
#[derive(Debug, Clone)]
pub struct LocaleRouter {
    config: Arc<TextsConfig>,
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether a path segment looks like a locale code.
fn is_locale_code(segment: &str) -> bool {
    segment.chars().count() == 2
}

/// Glob match where `*` spans any run of characters, slashes included.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

impl LocaleRouter {
    pub fn new(config: Arc<TextsConfig>) -> Self {
        Self { config }
    }

    pub fn default_locale(&self) -> &str {
        &self.config.default_locale
    }

    /// Locale of a request path.
    ///
    /// A configured first segment resolves to its canonical locale (or
    /// itself); anything else resolves to the default locale.
    pub fn detect_locale(&self, path: &str) -> String {
        segments(path)
            .first()
            .and_then(|first| self.config.locale(first))
            .map(|l| l.canonical_locale.clone().unwrap_or_else(|| l.code.clone()))
            .unwrap_or_else(|| self.config.default_locale.clone())
    }

    /// Whether `path` matches one of the configured exclusion patterns.
    pub fn is_excluded(&self, path: &str) -> bool {
        let path = path.trim_matches('/');
        self.config
            .exclude_segments
            .iter()
            .any(|pattern| wildcard_match(pattern.trim_matches('/'), path))
    }

    /// Target of the locale-prefix redirect, or an empty string when the
    /// path needs none.
    pub fn redirect_url(&self, path: &str, query: Option<&str>) -> String {
        if self.is_excluded(path) {
            return String::new();
        }

        let mut parts = segments(path);
        let default = self.config.default_locale.as_str();
        match parts.first().copied() {
            Some(first) if self.config.has_locale(first) => return String::new(),
            Some(first) if is_locale_code(first) => parts[0] = default,
            _ => parts.insert(0, default),
        }

        let mut url = parts.join("/");
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// `path` re-prefixed with `locale`, replacing any existing code.
    pub fn url(&self, path: &str, locale: &str) -> String {
        let mut parts = segments(path);
        if parts.first().is_some_and(|first| is_locale_code(first)) {
            parts.remove(0);
        }
        parts.insert(0, locale);
        parts.join("/")
    }

    /// Route name qualified by locale.
    pub fn route(&self, name: &str, locale: Option<&str>) -> String {
        match locale.filter(|l| !l.is_empty()) {
            Some(locale) => format!("{}.{}", locale, name),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;

    fn router() -> LocaleRouter {
        let settings = Settings::new(json!({
            "locales": {
                "en": { "native": "English" },
                "ka": { "native": "ქართული", "canonical": "ka" },
                "ge": { "native": "ქართული", "canonical": "ka" }
            },
            "default_locale": "en",
            "exclude_segments": ["admin/*", "api/*", "robots.txt"]
        }))
        .unwrap();
        LocaleRouter::new(Arc::new(TextsConfig::from_settings(&settings).unwrap()))
    }

    #[test]
    fn test_detect_locale() {
        let r = router();
        assert_eq!(r.detect_locale("ka/x"), "ka");
        assert_eq!(r.detect_locale("/ge/x"), "ka");
        assert_eq!(r.detect_locale("en"), "en");
        assert_eq!(r.detect_locale("fr/x"), "en");
        assert_eq!(r.detect_locale(""), "en");
    }

    #[test]
    fn test_redirect_unknown_code_replaced() {
        assert_eq!(router().redirect_url("fr/page", None), "en/page");
        assert_eq!(router().redirect_url("/fr/page/", Some("a=1")), "en/page?a=1");
    }

    #[test]
    fn test_redirect_known_locale_is_empty() {
        assert_eq!(router().redirect_url("ka/page", None), "");
        assert_eq!(router().redirect_url("en", Some("a=1")), "");
    }

    #[test]
    fn test_redirect_prepends_default() {
        assert_eq!(router().redirect_url("about/us", None), "en/about/us");
        assert_eq!(router().redirect_url("", Some("")), "en");
        assert_eq!(router().redirect_url("/", Some("q=x")), "en?q=x");
    }

    #[test]
    fn test_redirect_excluded() {
        let r = router();
        assert_eq!(r.redirect_url("admin/users", None), "");
        assert_eq!(r.redirect_url("/api/v1/texts", None), "");
        assert_eq!(r.redirect_url("robots.txt", None), "");
        assert_eq!(r.redirect_url("administrator", None), "en/administrator");
    }

    #[test]
    fn test_url_and_route() {
        let r = router();
        assert_eq!(r.url("en/page", "ka"), "ka/page");
        assert_eq!(r.url("/page/sub", "ka"), "ka/page/sub");
        assert_eq!(r.url("", "en"), "en");
        assert_eq!(r.route("home", Some("ka")), "ka.home");
        assert_eq!(r.route("home", None), "home");
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("admin/*", "admin/a/b"));
        assert!(wildcard_match("*.txt", "robots.txt"));
        assert!(wildcard_match("a*c*e", "abcde"));
        assert!(!wildcard_match("admin/*", "admins"));
        assert!(!wildcard_match("robots.txt", "robots.txt2"));
    }
}
