//! Role-inheritance resolution and ACL checks.
//!
//! A user's effective roles are the transitive closure of their directly
//! assigned roles over the roles document's `inherits` edges. The closure
//! is computed iteratively with a visited set, so inheritance cycles in a
//! mis-provisioned document terminate instead of recursing forever.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use pagevault_core::{ResourceId, RoleName, Session};
use pagevault_store::{RecordStore, StoreError};

use crate::error::Result;

/// Resolves effective roles and answers ACL queries.
pub struct RoleResolver<R> {
    records: Arc<R>,
}

impl<R: RecordStore> RoleResolver<R> {
    /// Create a resolver over the given record store.
    pub fn new(records: Arc<R>) -> Self {
        Self { records }
    }

    /// Expand a set of directly assigned roles to the full inherited set.
    ///
    /// A role missing from the roles document is kept as a leaf: the
    /// assignment itself still counts, it just inherits nothing.
    pub async fn expand_roles(&self, direct: &[RoleName]) -> Result<BTreeSet<RoleName>> {
        let mut expanded = BTreeSet::new();
        let mut pending: Vec<RoleName> = direct.to_vec();

        while let Some(role) = pending.pop() {
            if !expanded.insert(role.clone()) {
                continue;
            }

            match self.records.get_role(&role).await {
                Ok(record) => pending.extend(record.inherits),
                Err(StoreError::RoleNotFound(_)) => {
                    warn!(role = %role, "role not in roles document, treating as leaf");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(expanded)
    }

    /// Whether the session's user may see the given resource.
    ///
    /// Anonymous callers are never authorized. A resource with no ACL
    /// entry, or with an empty permission list, denies everyone.
    pub async fn is_authorized(
        &self,
        resource_id: &ResourceId,
        session: Option<&Session>,
    ) -> Result<bool> {
        let Some(session) = session else {
            return Ok(false);
        };

        let acl = match self.records.get_acl(resource_id).await {
            Ok(acl) => acl,
            Err(StoreError::AclNotFound(_)) => {
                warn!(resource = %resource_id, "no acl entry, denying");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };

        if acl.permission.is_empty() {
            return Ok(false);
        }

        let effective = self.expand_roles(&session.roles).await?;
        Ok(acl.permission.iter().any(|role| effective.contains(role)))
    }
}
