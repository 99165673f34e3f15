//! Protected-document record types.
//!
//! These are the JSON shapes stored in the users, roles, and ACL documents
//! and in the per-resource blobs. Field names match the provisioned
//! documents exactly: kebab-case in the user records, plain keys elsewhere.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::{AsymmetricAlgorithm, SymmetricAlgorithm};
use crate::types::{HexBytes, ResourceId, RoleName};

/// The credential type a user record carries.
///
/// Unknown values deserialize to [`KeyType::Unknown`] so that a document
/// provisioned by a newer tool fails login cleanly instead of failing to
/// parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Secret is unlocked by a password-derived key.
    Password,
    /// Secret is unlocked by a key wrapped to the user's RSA public key.
    Certificate,
    /// Unrecognized credential type.
    #[serde(other)]
    Unknown,
}

/// One entry of the users document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserRecord {
    /// How the secret is unlocked.
    pub key_type: KeyType,
    /// Descriptor for decrypting `secret`.
    pub secret_algorithm: SymmetricAlgorithm,
    /// Encrypted JSON list of the user's role keys.
    pub secret: HexBytes,
    /// Roles directly assigned to the user. Inherited roles are not listed
    /// here.
    pub roles: Vec<RoleName>,
    /// Certificate credentials only: the wrapped content-encryption key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<HexBytes>,
    /// Certificate credentials only: descriptor for unwrapping
    /// `key-secret`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<AsymmetricAlgorithm>,
}

/// One entry of the roles document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Roles this role inherits from.
    #[serde(default)]
    pub inherits: Vec<RoleName>,
    /// Encrypted JSON list of the ACL keys this role can reach.
    pub secret: HexBytes,
}

/// One entry of the ACL document, keyed by resource id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRecord {
    /// Roles permitted to see the resource.
    pub permission: Vec<RoleName>,
    /// Encrypted JSON key wrap for the resource's content key.
    pub secret: HexBytes,
}

/// The users document: username to record.
pub type UsersDocument = BTreeMap<String, UserRecord>;

/// The roles document: role name to record.
pub type RolesDocument = BTreeMap<RoleName, RoleRecord>;

/// The ACL document: resource id to record.
pub type AclDocument = BTreeMap<ResourceId, AclRecord>;

/// A fetched resource blob, still encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedResource {
    /// Which resource this blob belongs to.
    pub resource_id: ResourceId,
    /// The encrypted fragment body.
    pub ciphertext: HexBytes,
}

/// A fully decrypted fragment, ready for substitution into the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedResource {
    /// Which resource this content belongs to.
    pub resource_id: ResourceId,
    /// The plaintext fragment body.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_kebab_case_fields() {
        let json = r#"{
            "key-type": "password",
            "secret-algorithm": {
                "name": "AES-GCM",
                "iv": "000000000000000000000000",
                "tag": "00000000000000000000000000000000"
            },
            "secret": "ab",
            "roles": ["editor"]
        }"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key_type, KeyType::Password);
        assert_eq!(record.roles, vec![RoleName::new("editor")]);
        assert!(record.key_secret.is_none());
        assert!(record.key_algorithm.is_none());
    }

    #[test]
    fn test_user_record_certificate_fields() {
        let json = r#"{
            "key-type": "certificate",
            "secret-algorithm": {
                "name": "AES-GCM",
                "iv": "000000000000000000000000",
                "tag": "00000000000000000000000000000000"
            },
            "secret": "ab",
            "roles": [],
            "key-secret": "cd",
            "key-algorithm": { "name": "RSA-OAEP" }
        }"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key_type, KeyType::Certificate);
        assert_eq!(record.key_secret.unwrap().as_slice(), &[0xcd]);
        assert_eq!(record.key_algorithm.unwrap().name, "RSA-OAEP");
    }

    #[test]
    fn test_unknown_key_type_parses() {
        let json = r#"{
            "key-type": "fingerprint",
            "secret-algorithm": {
                "name": "AES-GCM",
                "iv": "000000000000000000000000",
                "tag": "00000000000000000000000000000000"
            },
            "secret": "ab",
            "roles": []
        }"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key_type, KeyType::Unknown);
    }

    #[test]
    fn test_role_record_inherits_defaults_empty() {
        let record: RoleRecord = serde_json::from_str(r#"{ "secret": "ab" }"#).unwrap();
        assert!(record.inherits.is_empty());
    }
}
