//! # pagevault Cascade
//!
//! The four-level key cascade resolver: from a user's role keys down to
//! decrypted fragment plaintext.
//!
//! Each level of the protected documents is encrypted under keys released
//! by the level above it: the user secret yields role keys, role secrets
//! yield ACL keys, ACL secrets yield content keys, and content keys
//! decrypt the fetched resource blobs. [`CascadeResolver`] walks those
//! levels as explicit stages with an all-or-nothing failure mode.

pub mod error;
pub mod resolver;

pub use error::{CascadeError, CascadeStage, Result};
pub use resolver::CascadeResolver;
