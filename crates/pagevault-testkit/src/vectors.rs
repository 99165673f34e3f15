//! Wire-format vectors: canonical samples of each protected document.
//!
//! These pin the JSON field names and shapes the documents use on disk.
//! A change that breaks parsing one of these breaks every provisioned
//! installation, so the tests here are deliberately literal.

/// A users document with one password and one certificate account.
pub const USERS_DOCUMENT: &str = r#"{
    "alice": {
        "key-type": "password",
        "secret-algorithm": {
            "name": "AES-GCM",
            "iv": "a26b9ede304d06c98025b1a2",
            "tag": "70c01c6f0a789bcde2ba5b382d2ff1fd"
        },
        "secret": "8c1f22be0981",
        "roles": ["editor"]
    },
    "carol": {
        "key-type": "certificate",
        "secret-algorithm": {
            "name": "AES-GCM",
            "iv": "11d7c9a00e5bd2f1aa443c21",
            "tag": "9e2b41aa0cd0b5f8e3271c9a6d44e0b2"
        },
        "secret": "d41c0b77",
        "roles": ["viewer"],
        "key-secret": "0b7ad914ffe2",
        "key-algorithm": { "name": "RSA-OAEP" }
    }
}"#;

/// A roles document with an inheritance edge.
pub const ROLES_DOCUMENT: &str = r#"{
    "editor": {
        "inherits": ["viewer"],
        "secret": "77e1b2"
    },
    "viewer": {
        "secret": "aa10ff"
    }
}"#;

/// An ACL document keyed by resource id.
pub const ACL_DOCUMENT: &str = r#"{
    "5f2a91c3": {
        "permission": ["viewer", "editor"],
        "secret": "be44d1"
    },
    "8803ab1e": {
        "permission": [],
        "secret": "91c2e7"
    }
}"#;

/// An installation configuration document.
pub const CONFIG_DOCUMENT: &str = r#"{
    "base-uri": "https://example.org/protected/",
    "denied-info-page": "denied.html",
    "denied-info-element": "denied.part.html",
    "allow-cache": true,
    "namespace": "example"
}"#;

/// A decrypted user secret: the role-key list released at login.
pub const ROLE_KEYS_PAYLOAD: &str = r#"[
    {
        "role": "viewer",
        "secret": {
            "algorithm": {
                "name": "AES-GCM",
                "iv": "c1a2b3d4e5f60718293a4b5c",
                "tag": "00112233445566778899aabbccddeeff"
            },
            "key": "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
        }
    }
]"#;

#[cfg(test)]
mod tests {
    use pagevault::Config;
    use pagevault_core::{
        AclDocument, KeyType, ResourceId, RoleCryptoKey, RoleName, RolesDocument, UsersDocument,
        KEY_LEN,
    };

    use super::*;

    #[test]
    fn test_users_document_parses() {
        let users: UsersDocument = serde_json::from_str(USERS_DOCUMENT).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users["alice"].key_type, KeyType::Password);
        assert_eq!(users["carol"].key_type, KeyType::Certificate);
        assert_eq!(
            users["carol"].key_algorithm.as_ref().unwrap().name,
            "RSA-OAEP"
        );
    }

    #[test]
    fn test_roles_document_parses() {
        let roles: RolesDocument = serde_json::from_str(ROLES_DOCUMENT).unwrap();
        assert_eq!(
            roles[&RoleName::new("editor")].inherits,
            vec![RoleName::new("viewer")]
        );
        assert!(roles[&RoleName::new("viewer")].inherits.is_empty());
    }

    #[test]
    fn test_acl_document_parses() {
        let acl: AclDocument = serde_json::from_str(ACL_DOCUMENT).unwrap();
        assert_eq!(acl[&ResourceId::new("5f2a91c3")].permission.len(), 2);
        assert!(acl[&ResourceId::new("8803ab1e")].permission.is_empty());
    }

    #[test]
    fn test_config_document_parses() {
        let config = Config::from_json(CONFIG_DOCUMENT).unwrap();
        assert_eq!(config.namespace, "example");
        assert!(config.allow_cache);
    }

    #[test]
    fn test_role_keys_payload_parses() {
        let keys = RoleCryptoKey::parse_list(ROLE_KEYS_PAYLOAD.as_bytes()).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].role, RoleName::new("viewer"));
        assert_eq!(keys[0].secret.key.len(), KEY_LEN);
    }
}
