//! Vault fixtures: provision a complete set of protected documents in
//! memory.
//!
//! [`VaultBuilder`] takes a declarative description of resources, roles,
//! and users, and seals the whole key cascade bottom-up the way a
//! provisioning tool would: fresh content keys per resource, fresh ACL
//! and role keys, user secrets sealed under password-derived or
//! RSA-wrapped account keys.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use pagevault::{Config, Engine};
use pagevault_core::{
    AclCryptoKey, AclRecord, AsymmetricAlgorithm, KeyType, KeyWrap, ResourceId, RoleCryptoKey,
    RoleName, RoleRecord, UserRecord, RSA_OAEP,
};
use pagevault_store::{MemoryCache, MemoryFetcher, MemoryRecords, MemorySessions};

use crate::seal::{generate_rsa_keypair, random_key, seal, seal_with_password, wrap_key_rsa};

struct ResourceSpec {
    id: ResourceId,
    content: String,
    permission: Vec<RoleName>,
}

struct RoleSpec {
    name: RoleName,
    inherits: Vec<RoleName>,
}

enum Credential {
    Password(String),
    Certificate,
}

struct UserSpec {
    username: String,
    credential: Credential,
    roles: Vec<RoleName>,
}

/// Declarative builder for a provisioned vault.
#[derive(Default)]
pub struct VaultBuilder {
    resources: Vec<ResourceSpec>,
    roles: Vec<RoleSpec>,
    users: Vec<UserSpec>,
}

impl VaultBuilder {
    /// Start an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource with its plaintext and the roles permitted to see
    /// it.
    pub fn resource(
        mut self,
        id: impl Into<ResourceId>,
        content: impl Into<String>,
        permission: &[&str],
    ) -> Self {
        self.resources.push(ResourceSpec {
            id: id.into(),
            content: content.into(),
            permission: permission.iter().map(|r| RoleName::new(*r)).collect(),
        });
        self
    }

    /// Add a role and the roles it inherits from.
    pub fn role(mut self, name: impl Into<RoleName>, inherits: &[&str]) -> Self {
        self.roles.push(RoleSpec {
            name: name.into(),
            inherits: inherits.iter().map(|r| RoleName::new(*r)).collect(),
        });
        self
    }

    /// Add a password-credentialed user with their directly assigned
    /// roles.
    pub fn password_user(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        roles: &[&str],
    ) -> Self {
        self.users.push(UserSpec {
            username: username.into(),
            credential: Credential::Password(password.into()),
            roles: roles.iter().map(|r| RoleName::new(*r)).collect(),
        });
        self
    }

    /// Add a certificate-credentialed user. The generated private key PEM
    /// ends up in [`VaultFixture::certificates`].
    pub fn certificate_user(mut self, username: impl Into<String>, roles: &[&str]) -> Self {
        self.users.push(UserSpec {
            username: username.into(),
            credential: Credential::Certificate,
            roles: roles.iter().map(|r| RoleName::new(*r)).collect(),
        });
        self
    }

    /// Seal everything and produce the in-memory vault.
    pub fn build(self) -> VaultFixture {
        let records = MemoryRecords::new();
        let fetcher = MemoryFetcher::new();

        // Resource level: content keys and ACL keys.
        let mut acl_keys: Vec<AclCryptoKey> = Vec::new();
        for spec in &self.resources {
            let content_key = random_key();
            let (content_algo, ciphertext) = seal(&content_key, spec.content.as_bytes());
            fetcher.insert(spec.id.clone(), ciphertext);

            let acl_key = random_key();
            let content_wrap = KeyWrap {
                algorithm: content_algo,
                key: content_key.to_vec().into(),
            };
            let payload = serde_json::to_vec(&content_wrap).expect("serialize key wrap");
            let (acl_algo, acl_secret) = seal(&acl_key, &payload);
            records.insert_acl(
                spec.id.clone(),
                AclRecord {
                    permission: spec.permission.clone(),
                    secret: acl_secret,
                },
            );

            acl_keys.push(AclCryptoKey {
                resource_id: spec.id.clone(),
                secret: KeyWrap {
                    algorithm: acl_algo,
                    key: acl_key.to_vec().into(),
                },
            });
        }

        // Role level: each role's secret releases the ACL keys for the
        // resources that name it directly.
        let mut role_keys: HashMap<RoleName, RoleCryptoKey> = HashMap::new();
        let inherits_map: HashMap<RoleName, Vec<RoleName>> = self
            .roles
            .iter()
            .map(|spec| (spec.name.clone(), spec.inherits.clone()))
            .collect();

        for spec in &self.roles {
            let granted: Vec<&AclCryptoKey> = acl_keys
                .iter()
                .zip(&self.resources)
                .filter(|(_, resource)| resource.permission.contains(&spec.name))
                .map(|(key, _)| key)
                .collect();
            let payload = serde_json::to_vec(&granted).expect("serialize acl keys");

            let role_key = random_key();
            let (role_algo, role_secret) = seal(&role_key, &payload);
            records.insert_role(
                spec.name.clone(),
                RoleRecord {
                    inherits: spec.inherits.clone(),
                    secret: role_secret,
                },
            );

            role_keys.insert(
                spec.name.clone(),
                RoleCryptoKey {
                    role: spec.name.clone(),
                    secret: KeyWrap {
                        algorithm: role_algo,
                        key: role_key.to_vec().into(),
                    },
                },
            );
        }

        // User level: the secret carries role keys for the transitive
        // closure of the user's assignments, so inherited resources
        // decrypt too.
        let mut certificates = HashMap::new();
        for spec in &self.users {
            let closure = role_closure(&inherits_map, &spec.roles);
            let user_role_keys: Vec<&RoleCryptoKey> = closure
                .iter()
                .filter_map(|role| role_keys.get(role))
                .collect();
            let payload = serde_json::to_vec(&user_role_keys).expect("serialize role keys");

            let record = match &spec.credential {
                Credential::Password(password) => {
                    let (secret_algorithm, secret) = seal_with_password(password, &payload);
                    UserRecord {
                        key_type: KeyType::Password,
                        secret_algorithm,
                        secret,
                        roles: spec.roles.clone(),
                        key_secret: None,
                        key_algorithm: None,
                    }
                }
                Credential::Certificate => {
                    let account_key = random_key();
                    let (pem, public) = generate_rsa_keypair();
                    certificates.insert(spec.username.clone(), pem);

                    let (secret_algorithm, secret) = seal(&account_key, &payload);
                    UserRecord {
                        key_type: KeyType::Certificate,
                        secret_algorithm,
                        secret,
                        roles: spec.roles.clone(),
                        key_secret: Some(wrap_key_rsa(&public, &account_key)),
                        key_algorithm: Some(AsymmetricAlgorithm {
                            name: RSA_OAEP.to_string(),
                        }),
                    }
                }
            };
            records.insert_user(spec.username.clone(), record);
        }

        VaultFixture {
            records: Arc::new(records),
            fetcher: Arc::new(fetcher),
            cache: Arc::new(MemoryCache::new()),
            sessions: Arc::new(MemorySessions::new()),
            certificates,
        }
    }
}

/// Transitive closure of role assignments over the inheritance edges.
fn role_closure(
    inherits: &HashMap<RoleName, Vec<RoleName>>,
    direct: &[RoleName],
) -> BTreeSet<RoleName> {
    let mut closure = BTreeSet::new();
    let mut pending: Vec<RoleName> = direct.to_vec();
    while let Some(role) = pending.pop() {
        if closure.insert(role.clone()) {
            if let Some(parents) = inherits.get(&role) {
                pending.extend(parents.iter().cloned());
            }
        }
    }
    closure
}

/// A fully provisioned in-memory vault.
pub struct VaultFixture {
    pub records: Arc<MemoryRecords>,
    pub fetcher: Arc<MemoryFetcher>,
    pub cache: Arc<MemoryCache>,
    pub sessions: Arc<MemorySessions>,
    /// Private key PEMs for certificate users, by username.
    pub certificates: HashMap<String, String>,
}

impl VaultFixture {
    /// A default installation configuration for tests.
    pub fn config() -> Config {
        Config::from_json(
            r#"{
                "base-uri": "/vault/",
                "denied-info-page": "denied.html",
                "denied-info-element": "denied.part.html"
            }"#,
        )
        .expect("static config parses")
    }

    /// Build an engine over this fixture's stores.
    pub fn engine(&self) -> Engine<MemoryRecords, MemoryFetcher, MemoryCache, MemorySessions> {
        Engine::new(
            Arc::clone(&self.records),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.cache),
            Arc::clone(&self.sessions),
            Self::config(),
        )
    }
}
