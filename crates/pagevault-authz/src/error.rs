//! Error types for the authorization resolver.

use pagevault_store::StoreError;
use thiserror::Error;

/// Errors that can occur while resolving authorization.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A record lookup failed for a reason other than a missing record.
    /// Missing records are policy decisions, not errors, and are handled
    /// in the resolver.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
