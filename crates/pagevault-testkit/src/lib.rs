//! # pagevault Testkit
//!
//! Testing utilities for pagevault.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Sealing helpers**: the encrypt-side inverse of the library's
//!   decrypt-only crypto, for provisioning test documents
//! - **Fixtures**: [`VaultBuilder`] seals a whole key cascade bottom-up
//!   from a declarative description
//! - **Generators**: proptest strategies for role graphs and fragment
//!   inputs
//! - **Vectors**: literal JSON samples pinning the wire format of each
//!   protected document
//!
//! End-to-end tests that need every crate live in this crate's `tests/`
//! directory.
//!
//! ## Fixtures
//!
//! ```rust
//! use pagevault_testkit::VaultBuilder;
//!
//! let vault = VaultBuilder::new()
//!     .resource("frag-1", "hello", &["viewer"])
//!     .role("viewer", &[])
//!     .password_user("alice", "hunter2", &["viewer"])
//!     .build();
//! let engine = vault.engine();
//! ```

pub mod fixtures;
pub mod generators;
pub mod seal;
pub mod vectors;

pub use fixtures::{VaultBuilder, VaultFixture};
pub use generators::RoleGraph;
pub use seal::{generate_rsa_keypair, random_key, seal, seal_with_password, wrap_key_rsa};
