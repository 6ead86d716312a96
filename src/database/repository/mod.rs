//! Repository module - data access layer.

mod text_repository;

pub use text_repository::{TextRepository, cache_key};
