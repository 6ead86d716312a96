//! Transline - locale-aware text resolution.
//!
//! Resolves a request's locale, loads translated strings for an
//! application scope (cache first, database as fallback), and registers
//! keys that have no translation yet.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration and the translation mapping
//! - `cache` - LRU-based caching with Moka
//! - `database` - Text store (MongoDB or in-memory) and repository
//! - `i18n` - Translation tables, per-request sessions, locale routing
//! - `error` - Error taxonomy

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod i18n;

#[cfg(test)]
mod testing;

pub use error::{TextError, TextResult};
pub use i18n::{TextService, Translator};
