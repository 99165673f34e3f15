//! Collaborator traits: the seams between the engine and its storage.
//!
//! Five narrow traits instead of one wide one, because the backends differ:
//! the record documents and resource blobs come from a remote origin, the
//! plaintext cache and session live locally, and tests swap each seam
//! independently.

use async_trait::async_trait;
use pagevault_core::{
    AclRecord, DecryptedResource, EncryptedResource, ResourceId, RoleName, RoleRecord, Session,
    UserRecord,
};

use crate::error::Result;

/// Read access to the provisioned protected documents (users, roles, ACL).
///
/// Lookups for missing entries are errors, not `None`: every caller treats
/// a missing record as a failure of its own operation, and the error
/// carries the identifier for logging.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get a user record by username.
    async fn get_user(&self, username: &str) -> Result<UserRecord>;

    /// Get a role record by role name.
    async fn get_role(&self, role: &RoleName) -> Result<RoleRecord>;

    /// Get the ACL entry for a resource.
    async fn get_acl(&self, resource_id: &ResourceId) -> Result<AclRecord>;
}

/// Retrieval of encrypted resource blobs from the origin.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the encrypted blob for one resource.
    async fn fetch_resource(&self, resource_id: &ResourceId) -> Result<EncryptedResource>;
}

/// The local plaintext cache filled at login and drained at render time.
#[async_trait]
pub trait ResourceCache: Send + Sync {
    /// Store a batch of decrypted resources.
    async fn put_all(&self, resources: Vec<DecryptedResource>) -> Result<()>;

    /// Look up one decrypted resource.
    async fn get(&self, resource_id: &ResourceId) -> Result<Option<DecryptedResource>>;

    /// Drop everything: plaintext and any cached documents.
    async fn clear_all(&self) -> Result<()>;

    /// Drop cached plaintext only, leaving other cached state intact.
    async fn clear_records_only(&self) -> Result<()>;
}

/// Persistence for the single active session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the active session, if any.
    async fn load(&self) -> Result<Option<Session>>;

    /// Save the active session, replacing any previous one.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the active session.
    async fn clear(&self) -> Result<()>;
}

/// Cache for raw protected documents (users, roles, ACL, config) keyed by
/// document name.
#[async_trait]
pub trait DocumentCache: Send + Sync {
    /// Look up a cached document body.
    async fn get_document(&self, name: &str) -> Result<Option<String>>;

    /// Cache a document body.
    async fn put_document(&self, name: &str, body: &str) -> Result<()>;

    /// Drop all cached documents.
    async fn clear(&self) -> Result<()>;
}
