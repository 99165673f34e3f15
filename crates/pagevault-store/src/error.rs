//! Error types for the store module.

use pagevault_core::{ResourceId, RoleName};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user record exists for the given username.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// No role record exists for the given role.
    #[error("role not found: {0}")]
    RoleNotFound(RoleName),

    /// No ACL record exists for the given resource.
    #[error("acl entry not found: {0}")]
    AclNotFound(ResourceId),

    /// A resource blob could not be retrieved from the backend.
    #[error("failed to fetch resource {id}: {detail}")]
    Network { id: ResourceId, detail: String },

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored document could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
