//! Error types for the engine.

use pagevault_core::ResourceId;
use thiserror::Error;
use tracing::debug;

/// Login failure, deliberately opaque.
///
/// Every login failure collapses to this one variant before reaching the
/// caller: a wrong password, an unknown user, a tampered record, and an
/// unsupported credential type must be indistinguishable to an attacker
/// driving the login API. The underlying cause is logged at `debug`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credentials did not unlock the account.
    #[error("login failed")]
    LoginFailed,
}

/// Collapse any error into the opaque login failure, keeping the cause in
/// the debug log.
pub(crate) fn login_failed<E: std::fmt::Display>(err: E) -> AuthError {
    debug!(cause = %err, "login failed");
    AuthError::LoginFailed
}

/// Errors from the non-login engine operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// An authorized fragment had no plaintext in the cache. The cache
    /// and the session are out of step, usually a partial logout that
    /// did not complete.
    #[error("no cached content for authorized resource {0}")]
    MissingCacheEntry(ResourceId),

    /// Authorization resolution failed.
    #[error(transparent)]
    Authz(#[from] pagevault_authz::AuthzError),

    /// A storage operation failed.
    #[error(transparent)]
    Store(#[from] pagevault_store::StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
