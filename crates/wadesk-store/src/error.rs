//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database driver error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A contact with the same normalized phone already exists.
    #[error("Contact already exists for phone {0}")]
    DuplicatePhone(String),

    /// A message referenced a contact that does not exist.
    #[error("Contact not found: {0}")]
    MissingContact(String),

    /// A stored row could not be decoded into a domain value.
    #[error("Corrupt row: {0}")]
    Decode(String),

    /// The store is not reachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this error means the contact already exists.
    pub fn is_duplicate_phone(&self) -> bool {
        matches!(self, Self::DuplicatePhone(_))
    }
}
