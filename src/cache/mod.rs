//! Cache module - Modular caching system using Moka.
//!
//! ## Architecture
//!
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Typed Moka wrapper, optionally with per-entry TTL
//! - `TextCache` - Capability the text repository consumes, with
//!   `MemoryTextCache` as the in-process implementation
//!
//! ## Usage
//!
//! ```rust
//! use transline::cache::{CacheRegistry, MemoryTextCache};
//!
//! let registry = CacheRegistry::new();
//! let tables = MemoryTextCache::new(&registry);
//! assert_eq!(tables.entry_count(), 0);
//! ```

mod config;
mod registry;
mod text_cache;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use text_cache::{MemoryTextCache, TextCache};
pub use typed::{Expiring, TypedCache};
