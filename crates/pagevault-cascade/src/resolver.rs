//! The four-level key cascade.
//!
//! Login recovers the user's role keys; everything below that level is
//! resolved here as an explicit staged pipeline:
//!
//! 1. **Role stage**: decrypt each role record's secret into ACL keys.
//! 2. **ACL stage**: decrypt each ACL record's secret into content keys.
//! 3. **Dedup**: a resource reachable through several roles keeps the
//!    first content key found and is fetched once.
//! 4. **Fetch + resource stage**: fetch the encrypted blobs concurrently,
//!    then decrypt each into plaintext.
//!
//! The whole resolution is all-or-nothing: the first failure at any stage
//! aborts outstanding fetches and fails the resolve, leaving nothing
//! partially cached.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use pagevault_core::{
    AclCryptoKey, DecryptedResource, EncryptedResource, KeyWrap, ResourceCryptoKey, ResourceId,
    RoleCryptoKey, SymmetricKey,
};
use pagevault_store::{RecordStore, ResourceFetcher, StoreError};

use crate::error::{CascadeError, CascadeStage, Result};

/// Resolves the key cascade below the user level.
pub struct CascadeResolver<R, F> {
    records: Arc<R>,
    fetcher: Arc<F>,
}

impl<R, F> CascadeResolver<R, F>
where
    R: RecordStore,
    F: ResourceFetcher + 'static,
{
    /// Create a resolver over the given record store and fetcher.
    pub fn new(records: Arc<R>, fetcher: Arc<F>) -> Self {
        Self { records, fetcher }
    }

    /// Resolve role keys all the way down to decrypted resources.
    pub async fn resolve(&self, role_keys: &[RoleCryptoKey]) -> Result<Vec<DecryptedResource>> {
        let acl_keys = self.role_stage(role_keys).await?;
        debug!(acl_keys = acl_keys.len(), "role stage complete");

        let resource_keys = self.acl_stage(&acl_keys).await?;
        let resource_keys = dedup_by_resource(resource_keys);
        debug!(
            resource_keys = resource_keys.len(),
            "acl stage complete"
        );

        if resource_keys.is_empty() {
            return Ok(Vec::new());
        }

        let blobs = self.fetch_stage(&resource_keys).await?;
        let resources = resource_stage(&resource_keys, blobs)?;
        debug!(resources = resources.len(), "resource stage complete");
        Ok(resources)
    }

    /// Decrypt each reachable role record's secret into ACL keys.
    async fn role_stage(&self, role_keys: &[RoleCryptoKey]) -> Result<Vec<AclCryptoKey>> {
        let mut acl_keys = Vec::new();

        for role_key in role_keys {
            let id = role_key.role.as_str();
            let record = self
                .records
                .get_role(&role_key.role)
                .await
                .map_err(|err| store_error(CascadeStage::Role, id, err))?;

            let key = SymmetricKey::import(
                role_key.secret.key.as_slice(),
                &role_key.secret.algorithm.name,
            )
            .map_err(|err| CascadeError::from_crypto(CascadeStage::Role, id, err))?;

            let payload = key
                .decrypt(&role_key.secret.algorithm, record.secret.as_slice())
                .map_err(|err| CascadeError::from_crypto(CascadeStage::Role, id, err))?;

            let mut keys = AclCryptoKey::parse_list(&payload).map_err(|err| {
                CascadeError::MalformedPayload {
                    stage: CascadeStage::Role,
                    id: id.to_string(),
                    detail: err.to_string(),
                }
            })?;
            acl_keys.append(&mut keys);
        }

        Ok(acl_keys)
    }

    /// Decrypt each ACL record's secret into a content key.
    async fn acl_stage(&self, acl_keys: &[AclCryptoKey]) -> Result<Vec<ResourceCryptoKey>> {
        let mut resource_keys = Vec::new();

        for acl_key in acl_keys {
            let id = acl_key.resource_id.as_str();
            let record = self
                .records
                .get_acl(&acl_key.resource_id)
                .await
                .map_err(|err| store_error(CascadeStage::Acl, id, err))?;

            let key = SymmetricKey::import(
                acl_key.secret.key.as_slice(),
                &acl_key.secret.algorithm.name,
            )
            .map_err(|err| CascadeError::from_crypto(CascadeStage::Acl, id, err))?;

            let payload = key
                .decrypt(&acl_key.secret.algorithm, record.secret.as_slice())
                .map_err(|err| CascadeError::from_crypto(CascadeStage::Acl, id, err))?;

            let wrap = KeyWrap::parse(&payload).map_err(|err| CascadeError::MalformedPayload {
                stage: CascadeStage::Acl,
                id: id.to_string(),
                detail: err.to_string(),
            })?;

            resource_keys.push(ResourceCryptoKey::from_wrap(
                acl_key.resource_id.clone(),
                wrap,
            ));
        }

        Ok(resource_keys)
    }

    /// Fetch every deduplicated resource blob concurrently.
    ///
    /// The first fetch failure aborts the remaining tasks and fails the
    /// stage.
    async fn fetch_stage(
        &self,
        resource_keys: &[ResourceCryptoKey],
    ) -> Result<HashMap<ResourceId, EncryptedResource>> {
        let mut tasks = JoinSet::new();

        for key in resource_keys {
            let fetcher = Arc::clone(&self.fetcher);
            let resource_id = key.resource_id.clone();
            tasks.spawn(async move {
                let result = fetcher.fetch_resource(&resource_id).await;
                (resource_id, result)
            });
        }

        let mut blobs = HashMap::with_capacity(resource_keys.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(blob))) => {
                    blobs.insert(blob.resource_id.clone(), blob);
                }
                Ok((resource_id, Err(err))) => {
                    tasks.abort_all();
                    return Err(match err {
                        StoreError::Network { id, detail } => CascadeError::Network {
                            id: id.to_string(),
                            detail,
                        },
                        other => CascadeError::StoreFailure {
                            stage: CascadeStage::Resource,
                            id: resource_id.to_string(),
                            detail: other.to_string(),
                        },
                    });
                }
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => {
                    tasks.abort_all();
                    return Err(CascadeError::StoreFailure {
                        stage: CascadeStage::Resource,
                        id: String::new(),
                        detail: join_err.to_string(),
                    });
                }
            }
        }

        Ok(blobs)
    }
}

/// Keep the first content key seen for each resource.
fn dedup_by_resource(resource_keys: Vec<ResourceCryptoKey>) -> Vec<ResourceCryptoKey> {
    let mut seen = HashSet::new();
    resource_keys
        .into_iter()
        .filter(|key| seen.insert(key.resource_id.clone()))
        .collect()
}

/// Decrypt each fetched blob with its content key.
fn resource_stage(
    resource_keys: &[ResourceCryptoKey],
    blobs: HashMap<ResourceId, EncryptedResource>,
) -> Result<Vec<DecryptedResource>> {
    let mut resources = Vec::with_capacity(resource_keys.len());

    for resource_key in resource_keys {
        let id = resource_key.resource_id.as_str();
        let blob =
            blobs
                .get(&resource_key.resource_id)
                .ok_or_else(|| CascadeError::StoreFailure {
                    stage: CascadeStage::Resource,
                    id: id.to_string(),
                    detail: "fetch produced no blob".to_string(),
                })?;

        let key = SymmetricKey::import(
            resource_key.key.as_slice(),
            &resource_key.algorithm.name,
        )
        .map_err(|err| CascadeError::from_crypto(CascadeStage::Resource, id, err))?;

        let plaintext = key
            .decrypt(&resource_key.algorithm, blob.ciphertext.as_slice())
            .map_err(|err| CascadeError::from_crypto(CascadeStage::Resource, id, err))?;

        let content =
            String::from_utf8(plaintext).map_err(|_| CascadeError::MalformedPayload {
                stage: CascadeStage::Resource,
                id: id.to_string(),
                detail: "content is not valid UTF-8".to_string(),
            })?;

        resources.push(DecryptedResource {
            resource_id: resource_key.resource_id.clone(),
            content,
        });
    }

    Ok(resources)
}

fn store_error(stage: CascadeStage, id: &str, err: StoreError) -> CascadeError {
    match err {
        StoreError::RoleNotFound(_) | StoreError::AclNotFound(_) => CascadeError::NotFound {
            stage,
            id: id.to_string(),
        },
        other => CascadeError::StoreFailure {
            stage,
            id: id.to_string(),
            detail: other.to_string(),
        },
    }
}
