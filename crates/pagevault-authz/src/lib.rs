//! # pagevault Authz
//!
//! Authorization over the role-inheritance graph.
//!
//! Authorization is decided from the *metadata* of the protected
//! documents alone (role assignments, inheritance edges, ACL permission
//! lists); it never touches key material. The cryptographic cascade is a
//! separate enforcement layer: a wrong authorization answer here can show
//! a placeholder or hide content, but it cannot conjure plaintext the
//! keys do not reach.

pub mod error;
pub mod resolver;

pub use error::{AuthzError, Result};
pub use resolver::RoleResolver;
