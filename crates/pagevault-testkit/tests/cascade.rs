//! Cascade behavior end to end: deduplicated fetches, all-or-nothing
//! failure, and tamper detection at each level.

use pagevault_core::{HexBytes, ResourceId, RoleName};
use pagevault_store::{RecordStore, ResourceCache, ResourceFetcher};
use pagevault_testkit::VaultBuilder;

/// One resource reachable through two independent roles.
fn overlapping_vault() -> pagevault_testkit::VaultFixture {
    VaultBuilder::new()
        .resource("frag-shared", "shared body", &["viewer", "auditor"])
        .role("viewer", &[])
        .role("auditor", &[])
        .password_user("alice", "hunter2", &["viewer", "auditor"])
        .build()
}

#[tokio::test]
async fn test_shared_resource_is_fetched_once() {
    let vault = overlapping_vault();
    let engine = vault.engine();

    engine.login_with_password("alice", "hunter2").await.unwrap();

    assert_eq!(vault.fetcher.fetch_count(&ResourceId::new("frag-shared")), 1);
    let cached = vault
        .cache
        .get(&ResourceId::new("frag-shared"))
        .await
        .unwrap();
    assert_eq!(cached.unwrap().content, "shared body");
}

#[tokio::test]
async fn test_fetch_failure_fails_login_and_caches_nothing() {
    let vault = VaultBuilder::new()
        .resource("frag-1", "one", &["viewer"])
        .resource("frag-2", "two", &["viewer"])
        .role("viewer", &[])
        .password_user("alice", "hunter2", &["viewer"])
        .build();
    vault.fetcher.fail_on(ResourceId::new("frag-2"));

    let engine = vault.engine();
    assert!(engine.login_with_password("alice", "hunter2").await.is_err());
    assert!(!engine.logged_in().await.unwrap());
    // All-or-nothing: frag-1 decrypted fine but must not be cached.
    assert!(vault.cache.is_empty());
}

fn tamper(bytes: &HexBytes) -> HexBytes {
    let mut flipped = bytes.as_slice().to_vec();
    flipped[0] ^= 0x01;
    HexBytes::new(flipped)
}

#[tokio::test]
async fn test_tampered_role_secret_fails_login() {
    let vault = overlapping_vault();

    let role = RoleName::new("viewer");
    let mut record = vault.records.get_role(&role).await.unwrap();
    record.secret = tamper(&record.secret);
    vault.records.insert_role(role, record);

    let engine = vault.engine();
    assert!(engine.login_with_password("alice", "hunter2").await.is_err());
    assert!(vault.cache.is_empty());
}

#[tokio::test]
async fn test_tampered_acl_secret_fails_login() {
    let vault = overlapping_vault();

    let id = ResourceId::new("frag-shared");
    let mut record = vault.records.get_acl(&id).await.unwrap();
    record.secret = tamper(&record.secret);
    vault.records.insert_acl(id, record);

    let engine = vault.engine();
    assert!(engine.login_with_password("alice", "hunter2").await.is_err());
    assert!(vault.cache.is_empty());
}

#[tokio::test]
async fn test_tampered_resource_blob_fails_login() {
    let vault = overlapping_vault();

    let id = ResourceId::new("frag-shared");
    let blob = vault.fetcher.fetch_resource(&id).await.unwrap();
    vault.fetcher.insert(id, tamper(&blob.ciphertext));

    let engine = vault.engine();
    assert!(engine.login_with_password("alice", "hunter2").await.is_err());
    assert!(vault.cache.is_empty());
}

#[tokio::test]
async fn test_user_with_no_resources_logs_in_with_empty_cache() {
    let vault = VaultBuilder::new()
        .role("lonely", &[])
        .password_user("eve", "passphrase", &["lonely"])
        .build();

    let engine = vault.engine();
    let session = engine.login_with_password("eve", "passphrase").await.unwrap();
    assert_eq!(session.roles, vec![RoleName::new("lonely")]);
    assert!(vault.cache.is_empty());
    assert_eq!(vault.fetcher.total_fetches(), 0);
}
