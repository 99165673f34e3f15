//! Error types for the cascade resolver.
//!
//! Every variant names the cascade stage and the identifier being
//! processed when the failure occurred, so a single log line locates the
//! broken record in the provisioned documents.

use std::fmt;

use pagevault_core::CryptoError;
use thiserror::Error;

/// Which level of the key cascade an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    /// Decrypting role secrets with the user's role keys.
    Role,
    /// Decrypting ACL secrets with the recovered ACL keys.
    Acl,
    /// Fetching and decrypting resource blobs with the content keys.
    Resource,
}

impl fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Role => "role",
            Self::Acl => "acl",
            Self::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while walking the key cascade.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// A record needed by the cascade is missing from its document.
    #[error("{stage} record not found: {id}")]
    NotFound { stage: CascadeStage, id: String },

    /// A record names an algorithm this build does not implement.
    #[error("{stage} record {id} uses unsupported algorithm {name}")]
    UnsupportedAlgorithm {
        stage: CascadeStage,
        id: String,
        name: String,
    },

    /// Decryption failed at some level. Wrong key material or a tampered
    /// record.
    #[error("{stage} record {id} failed to decrypt")]
    AuthenticationFailed { stage: CascadeStage, id: String },

    /// A decrypted payload was not the expected JSON shape.
    #[error("{stage} record {id} has a malformed payload: {detail}")]
    MalformedPayload {
        stage: CascadeStage,
        id: String,
        detail: String,
    },

    /// A resource blob could not be fetched.
    #[error("failed to fetch resource {id}: {detail}")]
    Network { id: String, detail: String },

    /// A store lookup failed for a reason other than a missing record.
    #[error("{stage} lookup for {id} failed: {detail}")]
    StoreFailure {
        stage: CascadeStage,
        id: String,
        detail: String,
    },
}

impl CascadeError {
    /// Map a crypto failure onto the stage and record where it happened.
    pub(crate) fn from_crypto(stage: CascadeStage, id: &str, err: CryptoError) -> Self {
        match err {
            CryptoError::UnsupportedAlgorithm(name) => Self::UnsupportedAlgorithm {
                stage,
                id: id.to_string(),
                name,
            },
            CryptoError::AuthenticationFailed => Self::AuthenticationFailed {
                stage,
                id: id.to_string(),
            },
            other => Self::MalformedPayload {
                stage,
                id: id.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

/// Result type for cascade operations.
pub type Result<T> = std::result::Result<T, CascadeError>;
