//! In-memory implementations of the storage seams.
//!
//! These are primarily for testing. They have the same semantics as the
//! SQLite backend but keep everything in memory with no persistence.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use pagevault_core::{
    AclDocument, AclRecord, DecryptedResource, EncryptedResource, HexBytes, ResourceId, RoleName,
    RoleRecord, RolesDocument, Session, UserRecord, UsersDocument,
};

use crate::error::{Result, StoreError};
use crate::traits::{
    DocumentCache, RecordStore, ResourceCache, ResourceFetcher, SessionStore,
};

/// In-memory record store holding the three protected documents.
#[derive(Default)]
pub struct MemoryRecords {
    inner: RwLock<MemoryRecordsInner>,
}

#[derive(Default)]
struct MemoryRecordsInner {
    users: HashMap<String, UserRecord>,
    roles: HashMap<RoleName, RoleRecord>,
    acl: HashMap<ResourceId, AclRecord>,
}

impl MemoryRecords {
    /// Create an empty record store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single user record.
    pub fn insert_user(&self, username: impl Into<String>, record: UserRecord) {
        let mut inner = self.inner.write().unwrap();
        inner.users.insert(username.into(), record);
    }

    /// Insert a single role record.
    pub fn insert_role(&self, role: RoleName, record: RoleRecord) {
        let mut inner = self.inner.write().unwrap();
        inner.roles.insert(role, record);
    }

    /// Insert a single ACL entry.
    pub fn insert_acl(&self, resource_id: ResourceId, record: AclRecord) {
        let mut inner = self.inner.write().unwrap();
        inner.acl.insert(resource_id, record);
    }

    /// Load a complete users document, replacing existing entries.
    pub fn load_users(&self, document: UsersDocument) {
        let mut inner = self.inner.write().unwrap();
        inner.users.extend(document);
    }

    /// Load a complete roles document, replacing existing entries.
    pub fn load_roles(&self, document: RolesDocument) {
        let mut inner = self.inner.write().unwrap();
        inner.roles.extend(document);
    }

    /// Load a complete ACL document, replacing existing entries.
    pub fn load_acl(&self, document: AclDocument) {
        let mut inner = self.inner.write().unwrap();
        inner.acl.extend(document);
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn get_user(&self, username: &str) -> Result<UserRecord> {
        let inner = self.inner.read().unwrap();
        inner
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    async fn get_role(&self, role: &RoleName) -> Result<RoleRecord> {
        let inner = self.inner.read().unwrap();
        inner
            .roles
            .get(role)
            .cloned()
            .ok_or_else(|| StoreError::RoleNotFound(role.clone()))
    }

    async fn get_acl(&self, resource_id: &ResourceId) -> Result<AclRecord> {
        let inner = self.inner.read().unwrap();
        inner
            .acl
            .get(resource_id)
            .cloned()
            .ok_or_else(|| StoreError::AclNotFound(resource_id.clone()))
    }
}

/// In-memory resource fetcher with per-id fetch counters and failure
/// injection, so tests can assert how many round trips a login cost.
#[derive(Default)]
pub struct MemoryFetcher {
    resources: RwLock<HashMap<ResourceId, HexBytes>>,
    fetch_counts: Mutex<HashMap<ResourceId, usize>>,
    failing: RwLock<HashSet<ResourceId>>,
    total_fetches: AtomicUsize,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an encrypted resource blob.
    pub fn insert(&self, resource_id: ResourceId, ciphertext: HexBytes) {
        let mut resources = self.resources.write().unwrap();
        resources.insert(resource_id, ciphertext);
    }

    /// Make fetches for the given resource fail.
    pub fn fail_on(&self, resource_id: ResourceId) {
        let mut failing = self.failing.write().unwrap();
        failing.insert(resource_id);
    }

    /// How many times the given resource has been fetched.
    pub fn fetch_count(&self, resource_id: &ResourceId) -> usize {
        let counts = self.fetch_counts.lock().unwrap();
        counts.get(resource_id).copied().unwrap_or(0)
    }

    /// Total fetches across all resources.
    pub fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch_resource(&self, resource_id: &ResourceId) -> Result<EncryptedResource> {
        {
            let mut counts = self.fetch_counts.lock().unwrap();
            *counts.entry(resource_id.clone()).or_insert(0) += 1;
        }
        self.total_fetches.fetch_add(1, Ordering::SeqCst);

        if self.failing.read().unwrap().contains(resource_id) {
            return Err(StoreError::Network {
                id: resource_id.clone(),
                detail: "injected failure".to_string(),
            });
        }

        let resources = self.resources.read().unwrap();
        match resources.get(resource_id) {
            Some(ciphertext) => Ok(EncryptedResource {
                resource_id: resource_id.clone(),
                ciphertext: ciphertext.clone(),
            }),
            None => Err(StoreError::Network {
                id: resource_id.clone(),
                detail: "no such resource".to_string(),
            }),
        }
    }
}

/// In-memory plaintext cache.
#[derive(Default)]
pub struct MemoryCache {
    resources: RwLock<HashMap<ResourceId, DecryptedResource>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.resources.read().unwrap().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.read().unwrap().is_empty()
    }
}

#[async_trait]
impl ResourceCache for MemoryCache {
    async fn put_all(&self, resources: Vec<DecryptedResource>) -> Result<()> {
        let mut cached = self.resources.write().unwrap();
        for resource in resources {
            cached.insert(resource.resource_id.clone(), resource);
        }
        Ok(())
    }

    async fn get(&self, resource_id: &ResourceId) -> Result<Option<DecryptedResource>> {
        let cached = self.resources.read().unwrap();
        Ok(cached.get(resource_id).cloned())
    }

    async fn clear_all(&self) -> Result<()> {
        self.resources.write().unwrap().clear();
        Ok(())
    }

    async fn clear_records_only(&self) -> Result<()> {
        self.resources.write().unwrap().clear();
        Ok(())
    }
}

/// In-memory session slot.
#[derive(Default)]
pub struct MemorySessions {
    session: RwLock<Option<Session>>,
}

impl MemorySessions {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.read().unwrap().clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.write().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.write().unwrap() = None;
        Ok(())
    }
}

/// In-memory document cache.
#[derive(Default)]
pub struct MemoryDocuments {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryDocuments {
    /// Create an empty document cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentCache for MemoryDocuments {
    async fn get_document(&self, name: &str) -> Result<Option<String>> {
        Ok(self.documents.read().unwrap().get(name).cloned())
    }

    async fn put_document(&self, name: &str, body: &str) -> Result<()> {
        self.documents
            .write()
            .unwrap()
            .insert(name.to_string(), body.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.documents.write().unwrap().clear();
        Ok(())
    }
}
