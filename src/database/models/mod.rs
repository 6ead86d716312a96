//! Database model exports.

pub mod text_row;

pub use text_row::{TextEntry, TextRow};
