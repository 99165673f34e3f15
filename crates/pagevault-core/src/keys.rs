//! Wrapped key material recovered at each level of the key cascade.
//!
//! Each successful decryption at one level yields a JSON list of keys for
//! the next level. These payloads use snake_case field names, unlike the
//! outer records.

use serde::{Deserialize, Serialize};

use crate::crypto::SymmetricAlgorithm;
use crate::types::{HexBytes, ResourceId, RoleName};

/// A wrapped symmetric key with the descriptor needed to use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWrap {
    /// Descriptor for the material the key unlocks.
    pub algorithm: SymmetricAlgorithm,
    /// The raw key bytes.
    pub key: HexBytes,
}

impl KeyWrap {
    /// Parse a single key wrap from a decrypted JSON payload.
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// One role key, recovered from a decrypted user secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCryptoKey {
    /// The role this key unlocks.
    pub role: RoleName,
    /// Key for the role record's secret.
    pub secret: KeyWrap,
}

impl RoleCryptoKey {
    /// Parse a decrypted user secret as a list of role keys.
    pub fn parse_list(payload: &[u8]) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// One ACL key, recovered from a decrypted role secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclCryptoKey {
    /// The resource whose ACL entry this key unlocks.
    pub resource_id: ResourceId,
    /// Key for the ACL record's secret.
    pub secret: KeyWrap,
}

impl AclCryptoKey {
    /// Parse a decrypted role secret as a list of ACL keys.
    pub fn parse_list(payload: &[u8]) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// The content key for one resource, recovered from a decrypted ACL
/// secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCryptoKey {
    /// The resource this key decrypts.
    pub resource_id: ResourceId,
    /// Descriptor for the resource ciphertext.
    pub algorithm: SymmetricAlgorithm,
    /// The raw content key bytes.
    pub key: HexBytes,
}

impl ResourceCryptoKey {
    /// Pair a parsed key wrap with the resource it belongs to.
    pub fn from_wrap(resource_id: ResourceId, wrap: KeyWrap) -> Self {
        Self {
            resource_id,
            algorithm: wrap.algorithm,
            key: wrap.key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_key_list_parses() {
        let payload = br#"[
            {
                "role": "editor",
                "secret": {
                    "algorithm": {
                        "name": "AES-GCM",
                        "iv": "000000000000000000000000",
                        "tag": "00000000000000000000000000000000"
                    },
                    "key": "ab"
                }
            }
        ]"#;
        let keys = RoleCryptoKey::parse_list(payload).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].role, RoleName::new("editor"));
        assert_eq!(keys[0].secret.key.as_slice(), &[0xab]);
    }

    #[test]
    fn test_acl_key_list_parses() {
        let payload = br#"[
            {
                "resource_id": "frag-1",
                "secret": {
                    "algorithm": {
                        "name": "AES-GCM",
                        "iv": "000000000000000000000000",
                        "tag": "00000000000000000000000000000000"
                    },
                    "key": "cd"
                }
            }
        ]"#;
        let keys = AclCryptoKey::parse_list(payload).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].resource_id, ResourceId::new("frag-1"));
    }

    #[test]
    fn test_key_list_rejects_non_array() {
        assert!(RoleCryptoKey::parse_list(br#"{"role": "x"}"#).is_err());
    }
}
