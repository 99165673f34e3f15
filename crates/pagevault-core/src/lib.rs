//! # pagevault Core
//!
//! Pure primitives for pagevault: the protected-document data model and the
//! low-level cryptographic provider.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over record structures and byte buffers.
//!
//! ## Key Types
//!
//! - [`UserRecord`] / [`RoleRecord`] / [`AclRecord`] - the three document
//!   levels of the key cascade
//! - [`RoleCryptoKey`] / [`AclCryptoKey`] / [`ResourceCryptoKey`] - wrapped
//!   key material recovered at each cascade level
//! - [`SymmetricKey`] / [`PrivateKey`] - imported key handles
//! - [`Session`] - the authenticated-user record
//! - [`Fragment`] / [`OnDeniedAction`] - the rendering-layer inputs
//!
//! ## Wire shapes
//!
//! All records are JSON documents with the field names used on disk
//! (kebab-case record keys such as `key-type`, snake_case keys inside the
//! decrypted cascade payloads). Binary fields travel hex-encoded via
//! [`HexBytes`].

pub mod crypto;
pub mod error;
pub mod keys;
pub mod record;
pub mod session;
pub mod types;

pub use crypto::{
    sha256, sha256_hex, AsymmetricAlgorithm, PrivateKey, SymmetricAlgorithm, SymmetricKey,
    AES_GCM, IV_LEN, KEY_LEN, RSA_OAEP, TAG_LEN,
};
pub use error::CryptoError;
pub use keys::{AclCryptoKey, KeyWrap, ResourceCryptoKey, RoleCryptoKey};
pub use record::{
    AclDocument, AclRecord, DecryptedResource, EncryptedResource, KeyType, RoleRecord,
    RolesDocument, UserRecord, UsersDocument,
};
pub use session::Session;
pub use types::{Fragment, HexBytes, OnDeniedAction, ResourceId, RoleName};
