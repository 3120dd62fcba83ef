//! Error types for the store layer.
//!
//! [`StoreError`] separates the two outcomes callers branch on
//! ([`NotFound`](StoreError::NotFound) and
//! [`DuplicateKey`](StoreError::DuplicateKey)) from every other backend
//! failure, which is surfaced generically.

use audit_types::EventId;

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No event exists with the given identifier.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// An event with the given identifier already exists.
    #[error("duplicate event id: {0}")]
    DuplicateKey(EventId),

    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Backend(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
