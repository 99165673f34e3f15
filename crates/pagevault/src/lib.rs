//! # pagevault
//!
//! Encrypted page fragments, released only to principals whose roles
//! satisfy each fragment's ACL.
//!
//! Protected documents are provisioned as a four-level key cascade: a
//! user credential unlocks role keys, role keys unlock ACL keys, ACL keys
//! unlock per-resource content keys, and content keys decrypt the
//! fragment bodies. [`Engine`] drives login, the session lifecycle, and
//! the per-fragment policy pass; the embedding layer supplies a
//! [`Renderer`] to apply its decisions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pagevault::{Config, Engine};
//! use pagevault_store::{MemoryCache, MemoryFetcher, MemoryRecords, MemorySessions};
//!
//! async fn example() {
//!     let config = Config::from_json(r#"{
//!         "base-uri": "/vault/",
//!         "denied-info-page": "denied.html",
//!         "denied-info-element": "denied.part.html"
//!     }"#).unwrap();
//!
//!     let engine = Engine::new(
//!         Arc::new(MemoryRecords::new()),
//!         Arc::new(MemoryFetcher::new()),
//!         Arc::new(MemoryCache::new()),
//!         Arc::new(MemorySessions::new()),
//!         config,
//!     );
//!
//!     let session = engine.login_with_password("alice", "secret").await.unwrap();
//!     assert!(engine.logged_in().await.unwrap());
//!     let _ = session;
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod render;

pub use config::Config;
pub use engine::{Engine, VersionDecision};
pub use error::{AuthError, ProtocolError, Result};
pub use render::{PassOutcome, Renderer};

pub use pagevault_core::{Fragment, OnDeniedAction, ResourceId, RoleName, Session};
