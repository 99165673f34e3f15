//! Installation configuration.
//!
//! Loaded from a JSON config document provisioned alongside the protected
//! documents. Field names are kebab-case on the wire.

use serde::{Deserialize, Serialize};

/// Configuration for one pagevault installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Base URI the protected documents and resource blobs live under.
    pub base_uri: String,
    /// Location navigated to when a redirect-on-denied fragment is hit.
    pub denied_info_page: String,
    /// Placeholder substituted for warn-on-denied fragments.
    pub denied_info_element: String,
    /// Whether decrypted resources may be cached locally.
    #[serde(default = "default_allow_cache")]
    pub allow_cache: bool,
    /// Namespace prefix for locally cached state.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_allow_cache() -> bool {
    true
}

fn default_namespace() -> String {
    "pagevault".to_string()
}

impl Config {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses_with_defaults() {
        let config = Config::from_json(
            r#"{
                "base-uri": "https://example.org/protected/",
                "denied-info-page": "denied.html",
                "denied-info-element": "denied.part.html"
            }"#,
        )
        .unwrap();

        assert_eq!(config.base_uri, "https://example.org/protected/");
        assert!(config.allow_cache);
        assert_eq!(config.namespace, "pagevault");
    }

    #[test]
    fn test_config_explicit_fields() {
        let config = Config::from_json(
            r#"{
                "base-uri": "/vault/",
                "denied-info-page": "denied.html",
                "denied-info-element": "denied.part.html",
                "allow-cache": false,
                "namespace": "intranet"
            }"#,
        )
        .unwrap();

        assert!(!config.allow_cache);
        assert_eq!(config.namespace, "intranet");
    }
}
