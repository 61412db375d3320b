//! Tabstash Storage Layer
//!
//! Key-value persistence for engine state. Every value is a JSON document
//! stored under a string key; a single `set` replaces the whole document,
//! so readers never observe a partial write.

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

pub type Result<T> = std::result::Result<T, StorageError>;
