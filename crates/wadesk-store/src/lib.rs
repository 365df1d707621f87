//! Contact and message persistence for wadesk.
//!
//! This crate provides:
//! - The [`Store`] trait the services are written against
//! - [`SqliteStore`], backed by sqlx
//! - [`MemoryStore`], for tests and ephemeral runs

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::Store;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
