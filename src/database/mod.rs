//! Database module exports.

mod memory;
mod models;
mod mongo;
mod repository;
mod store;

pub use memory::MemoryTextStore;
pub use models::*;
pub use mongo::{Database, MongoTextStore};
pub use repository::{TextRepository, cache_key};
pub use store::{TextFilter, TextStore};
