//! Error types for the data layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the
//! underlying [`sqlx`] errors with additional context about which
//! operation failed. The in-memory store uses the same type so callers
//! are store-agnostic.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization or deserialization error (JSONB columns, enums).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
