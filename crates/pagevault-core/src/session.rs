//! Authenticated-session record.

use serde::{Deserialize, Serialize};

use crate::types::RoleName;

/// The persisted record of an authenticated user.
///
/// A session never holds key material. Decrypted content lives in the
/// resource cache; the session only records who is logged in, the roles
/// they were granted, and the token needed to log them out remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The logged-in username.
    pub username: String,
    /// Roles directly assigned to the user at login time.
    pub roles: Vec<RoleName>,
    /// Day-stable token presented on logout.
    pub logout_token: String,
    /// The document-set version seen when the session was created, if any.
    #[serde(default)]
    pub cached_version: Option<String>,
}

impl Session {
    /// Create a session without a cached version.
    pub fn new(
        username: impl Into<String>,
        roles: Vec<RoleName>,
        logout_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            roles,
            logout_token: logout_token.into(),
            cached_version: None,
        }
    }

    /// Set the cached document-set version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.cached_version = Some(version.into());
        self
    }

    /// Whether the session directly carries the given role. Inherited
    /// roles need the authorization resolver.
    pub fn in_role(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_roundtrips_without_version() {
        let session = Session::new("alice", vec![RoleName::new("editor")], "token");
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
        assert!(back.cached_version.is_none());
    }

    #[test]
    fn test_session_version_defaults_on_old_records() {
        let json = r#"{"username":"alice","roles":[],"logout_token":"t"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.cached_version.is_none());
    }

    #[test]
    fn test_in_role_checks_direct_roles_only() {
        let session = Session::new("alice", vec![RoleName::new("editor")], "t");
        assert!(session.in_role(&RoleName::new("editor")));
        assert!(!session.in_role(&RoleName::new("viewer")));
    }
}
