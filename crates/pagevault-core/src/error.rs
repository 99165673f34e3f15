//! Error types for the cryptographic provider.

use thiserror::Error;

/// Errors raised by key import and decryption.
///
/// `AuthenticationFailed` deliberately carries no detail: a failed GCM tag
/// check looks the same whether the key, the IV, or the ciphertext was
/// wrong.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The algorithm descriptor names something this provider does not
    /// implement.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material has the wrong length for the declared algorithm.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    /// The IV in the algorithm descriptor has the wrong length.
    #[error("invalid iv length: expected {expected} bytes, got {got}")]
    InvalidIv { expected: usize, got: usize },

    /// The authentication tag in the algorithm descriptor has the wrong
    /// length.
    #[error("invalid tag length: expected {expected} bytes, got {got}")]
    InvalidTag { expected: usize, got: usize },

    /// Decryption failed. Covers tag mismatch, wrong key, and corrupted
    /// ciphertext alike.
    #[error("decryption failed")]
    AuthenticationFailed,

    /// A PEM-encoded private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidPem(String),
}

/// Result alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
