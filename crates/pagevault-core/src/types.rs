//! Strong type definitions for the pagevault data model.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of one protected fragment and its backing resource.
///
/// Resource ids are opaque strings chosen at provisioning time (the original
/// documents use short hex strings). The same id keys the ACL record, the
/// encrypted resource blob, and the cache entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new resource id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Name of a role in the roles document.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Create a new role name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleName({})", self.0)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Binary data carried as a lowercase hex string in JSON documents.
///
/// Keys, IVs, tags, and ciphertexts all travel through this newtype. The
/// `Debug` output shows only the length, since the contents may be key
/// material.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HexBytes(Vec<u8>);

impl HexBytes {
    /// Wrap raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }

    /// Encode as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// View the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexBytes({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for HexBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Per-fragment policy applied when authorization fails.
///
/// The fragment markup carries a single-letter code; anything outside the
/// known set parses as [`OnDeniedAction::Unknown`], which the rendering pass
/// treats identically to `Redirect` (fail safe).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDeniedAction {
    /// Navigate the whole page to the configured denied location.
    Redirect,
    /// Substitute the configured denied placeholder for this fragment.
    Warn,
    /// Leave the fragment's existing placeholder untouched.
    Hide,
    /// Unrecognized code. Handled as a redirect.
    Unknown,
}

impl OnDeniedAction {
    /// Parse the single-letter code used in fragment markup.
    pub fn from_code(code: &str) -> Self {
        match code {
            "R" => Self::Redirect,
            "W" => Self::Warn,
            "H" => Self::Hide,
            _ => Self::Unknown,
        }
    }

    /// The canonical single-letter code, if the action has one.
    pub fn as_code(&self) -> Option<&'static str> {
        match self {
            Self::Redirect => Some("R"),
            Self::Warn => Some("W"),
            Self::Hide => Some("H"),
            Self::Unknown => None,
        }
    }
}

/// One protected fragment found on the page, as supplied by the external
/// markup layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// The resource backing this fragment.
    pub resource_id: ResourceId,
    /// Policy to apply if the current user is not authorized.
    pub on_denied_action: OnDeniedAction,
}

impl Fragment {
    /// Create a fragment with an explicit denied-action.
    pub fn new(resource_id: impl Into<ResourceId>, on_denied_action: OnDeniedAction) -> Self {
        Self {
            resource_id: resource_id.into(),
            on_denied_action,
        }
    }

    /// Create a fragment from the markup's single-letter denied-action code.
    pub fn from_code(resource_id: impl Into<ResourceId>, code: &str) -> Self {
        Self::new(resource_id, OnDeniedAction::from_code(code))
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for RoleName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
