//! Internationalization (i18n) module.
//!
//! [`TextService`] holds what requests share (configuration, repository,
//! environment) and opens one [`Translator`] per request. The translator
//! resolves keys against a table loaded from cache or database and queues
//! keys it could not find.

mod router;
mod session;
mod table;

use std::sync::Arc;

use crate::config::{AppEnv, TextsConfig};
use crate::database::TextRepository;

pub use router::LocaleRouter;
pub use session::{LoadStrategy, SessionPhase, Translator};
pub use table::{replace_placeholders, select_plural, TranslationTable};

/// Shared entry point for per-request translators.
#[derive(Debug, Clone)]
pub struct TextService {
    config: Arc<TextsConfig>,
    repository: Arc<TextRepository>,
    router: LocaleRouter,
    env: AppEnv,
}

impl TextService {
    pub fn new(config: Arc<TextsConfig>, repository: Arc<TextRepository>, env: AppEnv) -> Self {
        Self {
            router: LocaleRouter::new(Arc::clone(&config)),
            config,
            repository,
            env,
        }
    }

    pub fn config(&self) -> &TextsConfig {
        &self.config
    }

    pub fn repository(&self) -> &TextRepository {
        &self.repository
    }

    pub fn router(&self) -> &LocaleRouter {
        &self.router
    }

    /// Fresh session for one request.
    pub fn translator(&self) -> Translator {
        Translator::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.config),
            self.env,
        )
    }

    /// Session with the locale of `path` already selected.
    pub fn translator_for_path(&self, path: &str) -> Translator {
        let mut translator = self.translator();
        let locale = self.router.detect_locale(path);
        // detect_locale never yields an empty code for a validated config
        if let Err(e) = translator.set_locale(&locale) {
            tracing::warn!("Could not select locale for '{}': {}", path, e);
        }
        translator
    }
}
